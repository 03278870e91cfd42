use axum::{
    http::{self, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Chat, Course, Folder, MockOptions};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "Bearer test-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(format!("/api/v1{uri}"))
        .header(http::header::AUTHORIZATION, TOKEN)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.map(|b| b.to_string()).unwrap_or_default())
        .unwrap()
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> axum::response::Response {
    app.clone().oneshot(request(method, uri, body)).await.unwrap()
}

async fn create_chat(app: &Router, title: &str, context: Value) -> Chat {
    let mut body = json!({ "chat": { "title": title } });
    if let (Value::Object(body), Value::Object(context)) = (&mut body, context) {
        body.extend(context);
    }
    let resp = call(app, "POST", "/chats/new", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

async fn create_course(app: &Router, code: &str) -> Course {
    let resp = call(
        app,
        "POST",
        "/courses/create",
        Some(json!({ "code": code, "name": format!("{code} course") })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- auth ---

#[tokio::test]
async fn missing_token_is_401_with_detail() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/chats/")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({ "detail": "Not authenticated" }));
}

#[tokio::test]
async fn empty_bearer_is_rejected() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/folders/")
                .header(http::header::AUTHORIZATION, "Bearer ")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- chats ---

#[tokio::test]
async fn new_chat_is_listed() {
    let app = app();
    let chat = create_chat(&app, "Hello", json!({})).await;
    assert_eq!(chat.title, "Hello");
    assert_eq!(chat.context_type, "general");

    let resp = call(&app, "GET", "/chats/?page=1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let chats: Vec<Chat> = body_json(resp).await;
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].id, chat.id);
}

#[tokio::test]
async fn chat_list_filters_by_context() {
    let app = app();
    create_chat(&app, "General", json!({})).await;
    create_chat(
        &app,
        "Lab chat",
        json!({ "context_type": "lab", "course_id": "c1", "lab_id": "L1" }),
    )
    .await;

    let resp = call(&app, "GET", "/chats/?context_type=lab&lab_id=L1", None).await;
    let chats: Vec<Chat> = body_json(resp).await;
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].title, "Lab chat");
}

#[tokio::test]
async fn unknown_chat_is_404_with_detail() {
    let app = app();
    let resp = call(&app, "GET", "/chats/nope", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Chat not found");
}

#[tokio::test]
async fn pin_toggles_and_reports_status() {
    let app = app();
    let chat = create_chat(&app, "Pin me", json!({})).await;

    let resp = call(&app, "POST", &format!("/chats/{}/pin", chat.id), None).await;
    let pinned: Chat = body_json(resp).await;
    assert!(pinned.is_pinned);

    let resp = call(&app, "GET", &format!("/chats/{}/pinned", chat.id), None).await;
    let status: bool = body_json(resp).await;
    assert!(status);

    let resp = call(&app, "GET", "/chats/pinned", None).await;
    let chats: Vec<Chat> = body_json(resp).await;
    assert_eq!(chats.len(), 1);
}

#[tokio::test]
async fn archived_chats_leave_the_main_list() {
    let app = app();
    let chat = create_chat(&app, "Old", json!({})).await;
    call(&app, "POST", &format!("/chats/{}/archive", chat.id), None).await;

    let chats: Vec<Chat> = body_json(call(&app, "GET", "/chats/", None).await).await;
    assert!(chats.is_empty());
    let archived: Vec<Chat> = body_json(call(&app, "GET", "/chats/archived", None).await).await;
    assert_eq!(archived.len(), 1);

    call(&app, "POST", "/chats/unarchive/all", None).await;
    let chats: Vec<Chat> = body_json(call(&app, "GET", "/chats/", None).await).await;
    assert_eq!(chats.len(), 1);
}

#[tokio::test]
async fn tags_round_through_chat() {
    let app = app();
    let chat = create_chat(&app, "Tagged", json!({})).await;
    let uri = format!("/chats/{}/tags", chat.id);

    call(&app, "POST", &uri, Some(json!({ "name": "exam" }))).await;
    let tags: Vec<Value> = body_json(call(&app, "GET", &uri, None).await).await;
    assert_eq!(tags, vec![json!({ "id": "exam", "name": "exam" })]);

    let by_tag: Vec<Chat> = body_json(call(&app, "POST", "/chats/tags", Some(json!({ "name": "exam" }))).await).await;
    assert_eq!(by_tag.len(), 1);

    let resp = call(&app, "DELETE", &format!("{uri}/all"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let tags: Vec<Value> = body_json(call(&app, "GET", &uri, None).await).await;
    assert!(tags.is_empty());
}

#[tokio::test]
async fn clone_defaults_title() {
    let app = app();
    let chat = create_chat(&app, "Source", json!({})).await;
    let resp = call(&app, "POST", &format!("/chats/{}/clone", chat.id), Some(json!({}))).await;
    let clone: Chat = body_json(resp).await;
    assert_ne!(clone.id, chat.id);
    assert_eq!(clone.title, "Clone of Source");
}

#[tokio::test]
async fn search_matches_title_case_insensitively() {
    let app = app();
    create_chat(&app, "Binary Trees", json!({})).await;
    create_chat(&app, "Graphs", json!({})).await;
    let chats: Vec<Chat> = body_json(call(&app, "GET", "/chats/search?text=tree", None).await).await;
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].title, "Binary Trees");
}

// --- folders ---

#[tokio::test]
async fn folder_lifecycle() {
    let app = app();
    let resp = call(&app, "POST", "/folders/", Some(json!({ "name": "Week 1" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let folder: Folder = body_json(resp).await;

    let resp = call(
        &app,
        "POST",
        &format!("/folders/{}/update/expanded", folder.id),
        Some(json!({ "is_expanded": true })),
    )
    .await;
    let updated: Folder = body_json(resp).await;
    assert!(updated.is_expanded);

    let resp = call(&app, "DELETE", &format!("/folders/{}", folder.id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call(&app, "GET", &format!("/folders/{}", folder.id), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_folder_is_400() {
    let app = app();
    call(&app, "POST", "/folders/", Some(json!({ "name": "Dup" }))).await;
    let resp = call(&app, "POST", "/folders/", Some(json!({ "name": "Dup" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Folder already exists");
}

#[tokio::test]
async fn folder_cannot_parent_itself() {
    let app = app();
    let folder: Folder = body_json(call(&app, "POST", "/folders/", Some(json!({ "name": "Loop" }))).await).await;
    let resp = call(
        &app,
        "POST",
        &format!("/folders/{}/update/parent", folder.id),
        Some(json!({ "parent_id": folder.id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- courses and labs ---

#[tokio::test]
async fn course_update_rejects_put() {
    let app = app();
    let course = create_course(&app, "CS101").await;

    let resp = call(
        &app,
        "PUT",
        &format!("/courses/id/{}/update", course.id),
        Some(json!({ "enabled": false })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = call(
        &app,
        "POST",
        &format!("/courses/id/{}/update/", course.id),
        Some(json!({ "enabled": false })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Course = body_json(resp).await;
    assert!(!updated.enabled);
}

#[tokio::test]
async fn course_listing_is_bare_by_default() {
    let app = app();
    create_course(&app, "CS101").await;
    let body: Value = body_json(call(&app, "GET", "/courses/", None).await).await;
    assert!(body.is_array());
}

#[tokio::test]
async fn course_listing_can_be_enveloped() {
    let app = app_with(MockOptions { envelope_lists: true });
    let course = create_course(&app, "CS101").await;
    call(
        &app,
        "POST",
        "/labs/create",
        Some(json!({ "course_id": course.id, "name": "Lab 1" })),
    )
    .await;

    let body: Value = body_json(call(&app, "GET", "/courses/", None).await).await;
    assert_eq!(body["courses"].as_array().map(Vec::len), Some(1));
    let body: Value = body_json(call(&app, "GET", &format!("/courses/id/{}/labs", course.id), None).await).await;
    assert_eq!(body["labs"][0]["name"], "Lab 1");
}

#[tokio::test]
async fn deleting_course_removes_its_labs() {
    let app = app();
    let course = create_course(&app, "CS101").await;
    let lab: Value = body_json(
        call(
            &app,
            "POST",
            "/labs/create",
            Some(json!({ "course_id": course.id, "name": "Lab 1" })),
        )
        .await,
    )
    .await;

    let resp = call(&app, "DELETE", &format!("/courses/id/{}/delete", course.id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call(&app, "GET", &format!("/labs/id/{}", lab["id"].as_str().unwrap()), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lab_for_unknown_course_is_404() {
    let app = app();
    let resp = call(
        &app,
        "POST",
        "/labs/create",
        Some(json!({ "course_id": "missing", "name": "Lab" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
