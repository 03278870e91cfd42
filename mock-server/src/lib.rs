use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const API_PREFIX: &str = "/api/v1";
pub const PAGE_SIZE: usize = 60;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub chat: Value,
    pub folder_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_pinned: bool,
    pub archived: bool,
    pub share_id: Option<String>,
    pub tags: Vec<String>,
    pub context_type: String,
    pub course_id: Option<String>,
    pub lab_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FolderItems {
    #[serde(default)]
    pub chat_ids: Vec<String>,
    #[serde(default)]
    pub file_ids: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub data: Option<Value>,
    pub meta: Option<Value>,
    pub items: FolderItems,
    pub is_expanded: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub context_type: String,
    pub course_id: Option<String>,
    pub lab_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub meta: Option<Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lab {
    pub id: String,
    pub course_id: String,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Default)]
pub struct Store {
    pub chats: HashMap<String, Chat>,
    pub folders: HashMap<String, Folder>,
    pub courses: HashMap<String, Course>,
    pub labs: HashMap<String, Lab>,
}

pub type Db = Arc<RwLock<Store>>;

/// Knobs for mimicking different backend deployments.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockOptions {
    /// Wrap course and lab listings in `{"courses": [...]}` / `{"labs": [...]}`.
    pub envelope_lists: bool,
}

#[derive(Clone)]
struct AppState {
    db: Db,
    options: MockOptions,
}

type Failure = (StatusCode, Json<Value>);
type Reply<T> = Result<Json<T>, Failure>;

pub fn app() -> Router {
    app_with(MockOptions::default())
}

pub fn app_with(options: MockOptions) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        options,
    };
    let routes = Router::new()
        .route("/chats/", get(list_chats).delete(delete_all_chats))
        .route("/chats/new", post(create_chat))
        .route("/chats/pinned", get(list_pinned))
        .route("/chats/archived", get(list_archived))
        .route("/chats/search", get(search_chats))
        .route("/chats/tags", post(list_by_tag))
        .route("/chats/folder/{folder_id}", get(list_folder_chats))
        .route("/chats/archive/all", post(archive_all))
        .route("/chats/unarchive/all", post(unarchive_all))
        .route("/chats/{id}", get(get_chat).post(update_chat).delete(delete_chat))
        .route("/chats/{id}/pin", post(toggle_pin))
        .route("/chats/{id}/pinned", get(pinned_status))
        .route("/chats/{id}/archive", post(archive_chat))
        .route("/chats/{id}/clone", post(clone_chat))
        .route("/chats/{id}/folder", post(move_chat))
        .route("/chats/{id}/tags", get(get_tags).post(add_tag).delete(remove_tag))
        .route("/chats/{id}/tags/all", delete(remove_all_tags))
        .route("/folders/", get(list_folders).post(create_folder))
        .route("/folders/{id}", get(get_folder).delete(delete_folder))
        .route("/folders/{id}/update", post(update_folder))
        .route("/folders/{id}/update/expanded", post(update_folder_expanded))
        .route("/folders/{id}/update/parent", post(update_folder_parent))
        .route("/folders/{id}/update/items", post(update_folder_items))
        .route("/courses/", get(list_courses))
        .route("/courses/create", post(create_course))
        .route("/courses/id/{id}", get(get_course))
        .route("/courses/id/{id}/labs", get(list_course_labs))
        .route("/courses/id/{id}/update", post(update_course))
        .route("/courses/id/{id}/update/", post(update_course))
        .route("/courses/id/{id}/delete", delete(delete_course))
        .route("/labs/create", post(create_lab))
        .route("/labs/id/{id}", get(get_lab))
        .route("/labs/id/{id}/update", post(update_lab))
        .route("/labs/id/{id}/delete", delete(delete_lab))
        .with_state(state);
    Router::new().nest(API_PREFIX, routes)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockOptions::default()).await
}

pub async fn run_with(listener: TcpListener, options: MockOptions) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, envelope_lists = options.envelope_lists, "mock backend listening");
    }
    axum::serve(listener, app_with(options)).await
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn failure(status: StatusCode, detail: &str) -> Failure {
    (status, Json(json!({ "detail": detail })))
}

fn not_found(what: &str) -> Failure {
    failure(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

/// Reject requests without a non-empty bearer token.
fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or("");
    if token.trim().is_empty() {
        debug!("rejecting request without bearer token");
        return Err(failure(StatusCode::UNAUTHORIZED, "Not authenticated"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Chats
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub text: Option<String>,
    pub context_type: Option<String>,
    pub course_id: Option<String>,
    pub lab_id: Option<String>,
}

impl ListQuery {
    fn matches(&self, chat: &Chat) -> bool {
        self.context_type.as_ref().map_or(true, |ct| *ct == chat.context_type)
            && self.course_id.as_ref().map_or(true, |id| chat.course_id.as_ref() == Some(id))
            && self.lab_id.as_ref().map_or(true, |id| chat.lab_id.as_ref() == Some(id))
    }

    fn paginate(&self, mut chats: Vec<Chat>) -> Vec<Chat> {
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        match self.page {
            Some(page) => chats
                .into_iter()
                .skip(page.saturating_sub(1) * PAGE_SIZE)
                .take(PAGE_SIZE)
                .collect(),
            None => chats,
        }
    }
}

#[derive(Deserialize)]
pub struct NewChatForm {
    pub chat: Value,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub context_type: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub lab_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatUpdateForm {
    pub chat: Value,
}

#[derive(Deserialize)]
pub struct TagForm {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CloneForm {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct MoveForm {
    #[serde(default)]
    pub folder_id: Option<String>,
}

fn title_of(chat: &Value) -> String {
    chat.get("title")
        .and_then(Value::as_str)
        .unwrap_or("New Chat")
        .to_string()
}

async fn create_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<NewChatForm>,
) -> Reply<Chat> {
    authorize(&headers)?;
    let ts = now();
    let chat = Chat {
        id: new_id(),
        title: title_of(&input.chat),
        chat: input.chat,
        folder_id: input.folder_id,
        created_at: ts,
        updated_at: ts,
        is_pinned: false,
        archived: false,
        share_id: None,
        tags: Vec::new(),
        context_type: input.context_type.unwrap_or_else(|| "general".to_string()),
        course_id: input.course_id,
        lab_id: input.lab_id,
    };
    state.db.write().await.chats.insert(chat.id.clone(), chat.clone());
    Ok(Json(chat))
}

async fn list_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply<Vec<Chat>> {
    authorize(&headers)?;
    let db = state.db.read().await;
    let chats = db
        .chats
        .values()
        .filter(|chat| !chat.archived && query.matches(chat))
        .cloned()
        .collect();
    Ok(Json(query.paginate(chats)))
}

async fn list_pinned(State(state): State<AppState>, headers: HeaderMap) -> Reply<Vec<Chat>> {
    authorize(&headers)?;
    let db = state.db.read().await;
    let chats = db.chats.values().filter(|chat| chat.is_pinned).cloned().collect();
    Ok(Json(ListQuery::default().paginate(chats)))
}

async fn list_archived(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply<Vec<Chat>> {
    authorize(&headers)?;
    let db = state.db.read().await;
    let chats = db
        .chats
        .values()
        .filter(|chat| chat.archived && query.matches(chat))
        .cloned()
        .collect();
    Ok(Json(query.paginate(chats)))
}

async fn search_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply<Vec<Chat>> {
    authorize(&headers)?;
    let needle = query.text.clone().unwrap_or_default().to_lowercase();
    let db = state.db.read().await;
    let chats = db
        .chats
        .values()
        .filter(|chat| chat.title.to_lowercase().contains(&needle) && query.matches(chat))
        .cloned()
        .collect();
    Ok(Json(query.paginate(chats)))
}

async fn list_by_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<TagForm>,
) -> Reply<Vec<Chat>> {
    authorize(&headers)?;
    let db = state.db.read().await;
    let chats = db
        .chats
        .values()
        .filter(|chat| chat.tags.contains(&input.name))
        .cloned()
        .collect();
    Ok(Json(ListQuery::default().paginate(chats)))
}

async fn list_folder_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(folder_id): Path<String>,
) -> Reply<Vec<Chat>> {
    authorize(&headers)?;
    let db = state.db.read().await;
    let chats = db
        .chats
        .values()
        .filter(|chat| chat.folder_id.as_deref() == Some(folder_id.as_str()))
        .cloned()
        .collect();
    Ok(Json(ListQuery::default().paginate(chats)))
}

async fn set_archived_all(state: &AppState, headers: &HeaderMap, archived: bool) -> Reply<bool> {
    authorize(headers)?;
    for chat in state.db.write().await.chats.values_mut() {
        chat.archived = archived;
    }
    Ok(Json(true))
}

async fn archive_all(State(state): State<AppState>, headers: HeaderMap) -> Reply<bool> {
    set_archived_all(&state, &headers, true).await
}

async fn unarchive_all(State(state): State<AppState>, headers: HeaderMap) -> Reply<bool> {
    set_archived_all(&state, &headers, false).await
}

async fn delete_all_chats(State(state): State<AppState>, headers: HeaderMap) -> Reply<bool> {
    authorize(&headers)?;
    state.db.write().await.chats.clear();
    Ok(Json(true))
}

async fn get_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Chat> {
    authorize(&headers)?;
    let db = state.db.read().await;
    db.chats.get(&id).cloned().map(Json).ok_or_else(|| not_found("Chat"))
}

/// Apply `change` to the chat with `id` and return the updated copy.
async fn modify_chat(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
    change: impl FnOnce(&mut Chat),
) -> Reply<Chat> {
    authorize(headers)?;
    let mut db = state.db.write().await;
    let chat = db.chats.get_mut(id).ok_or_else(|| not_found("Chat"))?;
    change(chat);
    chat.updated_at = now();
    Ok(Json(chat.clone()))
}

async fn update_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ChatUpdateForm>,
) -> Reply<Chat> {
    modify_chat(&state, &headers, &id, |chat| {
        if let (Value::Object(current), Value::Object(update)) = (&mut chat.chat, input.chat) {
            current.extend(update);
        }
        chat.title = title_of(&chat.chat);
    })
    .await
}

async fn delete_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<bool> {
    authorize(&headers)?;
    let removed = state.db.write().await.chats.remove(&id);
    removed.map(|_| Json(true)).ok_or_else(|| not_found("Chat"))
}

async fn toggle_pin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Chat> {
    modify_chat(&state, &headers, &id, |chat| chat.is_pinned = !chat.is_pinned).await
}

async fn pinned_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<bool> {
    authorize(&headers)?;
    let db = state.db.read().await;
    db.chats
        .get(&id)
        .map(|chat| Json(chat.is_pinned))
        .ok_or_else(|| not_found("Chat"))
}

async fn archive_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Chat> {
    modify_chat(&state, &headers, &id, |chat| chat.archived = !chat.archived).await
}

async fn clone_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<CloneForm>,
) -> Reply<Chat> {
    authorize(&headers)?;
    let mut db = state.db.write().await;
    let original = db.chats.get(&id).cloned().ok_or_else(|| not_found("Chat"))?;
    let ts = now();
    let title = input
        .title
        .unwrap_or_else(|| format!("Clone of {}", original.title));
    let clone = Chat {
        id: new_id(),
        title,
        created_at: ts,
        updated_at: ts,
        is_pinned: false,
        archived: false,
        share_id: None,
        ..original
    };
    db.chats.insert(clone.id.clone(), clone.clone());
    Ok(Json(clone))
}

async fn move_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<MoveForm>,
) -> Reply<Chat> {
    modify_chat(&state, &headers, &id, |chat| chat.folder_id = input.folder_id).await
}

async fn get_tags(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Vec<Value>> {
    authorize(&headers)?;
    let db = state.db.read().await;
    let chat = db.chats.get(&id).ok_or_else(|| not_found("Chat"))?;
    Ok(Json(
        chat.tags
            .iter()
            .map(|name| json!({ "id": name.to_lowercase(), "name": name }))
            .collect(),
    ))
}

async fn add_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<TagForm>,
) -> Reply<Chat> {
    if input.name.trim().is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Tag name cannot be empty"));
    }
    modify_chat(&state, &headers, &id, |chat| {
        if !chat.tags.contains(&input.name) {
            chat.tags.push(input.name);
        }
    })
    .await
}

async fn remove_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<TagForm>,
) -> Reply<Chat> {
    modify_chat(&state, &headers, &id, |chat| chat.tags.retain(|tag| *tag != input.name)).await
}

async fn remove_all_tags(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<bool> {
    modify_chat(&state, &headers, &id, |chat| chat.tags.clear())
        .await
        .map(|_| Json(true))
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

#[derive(Default, Deserialize)]
pub struct FolderForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub context_type: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub lab_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ExpandedForm {
    pub is_expanded: bool,
}

#[derive(Deserialize)]
pub struct ParentForm {
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ItemsForm {
    pub items: FolderItems,
}

async fn create_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<FolderForm>,
) -> Reply<Folder> {
    authorize(&headers)?;
    let name = input
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Folder name cannot be empty"))?;

    let mut db = state.db.write().await;
    if db.folders.values().any(|f| f.parent_id.is_none() && f.name == name) {
        return Err(failure(StatusCode::BAD_REQUEST, "Folder already exists"));
    }
    let ts = now();
    let folder = Folder {
        id: new_id(),
        name,
        parent_id: None,
        data: input.data,
        meta: input.meta,
        items: FolderItems::default(),
        is_expanded: false,
        created_at: ts,
        updated_at: ts,
        context_type: input.context_type.unwrap_or_else(|| "general".to_string()),
        course_id: input.course_id,
        lab_id: input.lab_id,
    };
    db.folders.insert(folder.id.clone(), folder.clone());
    Ok(Json(folder))
}

async fn list_folders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply<Vec<Folder>> {
    authorize(&headers)?;
    let db = state.db.read().await;
    let mut folders: Vec<Folder> = db
        .folders
        .values()
        .filter(|f| {
            query.context_type.as_ref().map_or(true, |ct| *ct == f.context_type)
                && query.course_id.as_ref().map_or(true, |id| f.course_id.as_ref() == Some(id))
                && query.lab_id.as_ref().map_or(true, |id| f.lab_id.as_ref() == Some(id))
        })
        .cloned()
        .collect();
    folders.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(folders))
}

async fn get_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Folder> {
    authorize(&headers)?;
    let db = state.db.read().await;
    db.folders.get(&id).cloned().map(Json).ok_or_else(|| not_found("Folder"))
}

async fn modify_folder(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
    change: impl FnOnce(&mut Folder),
) -> Reply<Folder> {
    authorize(headers)?;
    let mut db = state.db.write().await;
    let folder = db.folders.get_mut(id).ok_or_else(|| not_found("Folder"))?;
    change(folder);
    folder.updated_at = now();
    Ok(Json(folder.clone()))
}

async fn update_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<FolderForm>,
) -> Reply<Folder> {
    modify_folder(&state, &headers, &id, |folder| {
        if let Some(name) = input.name {
            folder.name = name;
        }
        if input.data.is_some() {
            folder.data = input.data;
        }
        if input.meta.is_some() {
            folder.meta = input.meta;
        }
        if let Some(context_type) = input.context_type {
            folder.context_type = context_type;
        }
        if input.course_id.is_some() {
            folder.course_id = input.course_id;
        }
        if input.lab_id.is_some() {
            folder.lab_id = input.lab_id;
        }
    })
    .await
}

async fn update_folder_expanded(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ExpandedForm>,
) -> Reply<Folder> {
    modify_folder(&state, &headers, &id, |folder| folder.is_expanded = input.is_expanded).await
}

async fn update_folder_parent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ParentForm>,
) -> Reply<Folder> {
    if input.parent_id.as_deref() == Some(id.as_str()) {
        return Err(failure(StatusCode::BAD_REQUEST, "Folder cannot be its own parent"));
    }
    modify_folder(&state, &headers, &id, |folder| folder.parent_id = input.parent_id).await
}

async fn update_folder_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ItemsForm>,
) -> Reply<Folder> {
    modify_folder(&state, &headers, &id, |folder| folder.items = input.items).await
}

async fn delete_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<bool> {
    authorize(&headers)?;
    let mut db = state.db.write().await;
    db.folders.remove(&id).ok_or_else(|| not_found("Folder"))?;
    for chat in db.chats.values_mut() {
        if chat.folder_id.as_deref() == Some(id.as_str()) {
            chat.folder_id = None;
        }
    }
    Ok(Json(true))
}

// ---------------------------------------------------------------------------
// Courses and labs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CourseForm {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub meta: Option<Value>,
}

#[derive(Deserialize)]
pub struct CourseUpdateForm {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub meta: Option<Value>,
}

#[derive(Deserialize)]
pub struct LabForm {
    pub course_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct LabUpdateForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

fn listing<T: Serialize>(options: MockOptions, key: &str, items: Vec<T>) -> Json<Value> {
    let items = json!(items);
    if options.envelope_lists {
        Json(json!({ key: items }))
    } else {
        Json(items)
    }
}

async fn list_courses(State(state): State<AppState>, headers: HeaderMap) -> Reply<Value> {
    authorize(&headers)?;
    let db = state.db.read().await;
    let mut courses: Vec<Course> = db.courses.values().cloned().collect();
    courses.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(listing(state.options, "courses", courses))
}

async fn get_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Course> {
    authorize(&headers)?;
    let db = state.db.read().await;
    db.courses.get(&id).cloned().map(Json).ok_or_else(|| not_found("Course"))
}

async fn list_course_labs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    authorize(&headers)?;
    let db = state.db.read().await;
    if !db.courses.contains_key(&id) {
        return Err(not_found("Course"));
    }
    let mut labs: Vec<Lab> = db.labs.values().filter(|lab| lab.course_id == id).cloned().collect();
    labs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing(state.options, "labs", labs))
}

async fn create_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CourseForm>,
) -> Reply<Course> {
    authorize(&headers)?;
    let mut db = state.db.write().await;
    if db.courses.values().any(|c| c.code == input.code) {
        return Err(failure(StatusCode::BAD_REQUEST, "Course code already exists"));
    }
    let ts = now();
    let course = Course {
        id: new_id(),
        code: input.code,
        name: input.name,
        description: input.description,
        enabled: input.enabled.unwrap_or(true),
        meta: input.meta,
        created_at: ts,
        updated_at: ts,
    };
    db.courses.insert(course.id.clone(), course.clone());
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<CourseUpdateForm>,
) -> Reply<Course> {
    authorize(&headers)?;
    let mut db = state.db.write().await;
    let course = db.courses.get_mut(&id).ok_or_else(|| not_found("Course"))?;
    if let Some(code) = input.code {
        course.code = code;
    }
    if let Some(name) = input.name {
        course.name = name;
    }
    if input.description.is_some() {
        course.description = input.description;
    }
    if let Some(enabled) = input.enabled {
        course.enabled = enabled;
    }
    if input.meta.is_some() {
        course.meta = input.meta;
    }
    course.updated_at = now();
    Ok(Json(course.clone()))
}

async fn delete_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<bool> {
    authorize(&headers)?;
    let mut db = state.db.write().await;
    db.courses.remove(&id).ok_or_else(|| not_found("Course"))?;
    db.labs.retain(|_, lab| lab.course_id != id);
    Ok(Json(true))
}

async fn create_lab(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LabForm>,
) -> Reply<Lab> {
    authorize(&headers)?;
    let mut db = state.db.write().await;
    if !db.courses.contains_key(&input.course_id) {
        return Err(not_found("Course"));
    }
    let ts = now();
    let lab = Lab {
        id: new_id(),
        course_id: input.course_id,
        name: input.name,
        description: input.description,
        enabled: input.enabled.unwrap_or(true),
        created_at: ts,
        updated_at: ts,
    };
    db.labs.insert(lab.id.clone(), lab.clone());
    Ok(Json(lab))
}

async fn get_lab(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Lab> {
    authorize(&headers)?;
    let db = state.db.read().await;
    db.labs.get(&id).cloned().map(Json).ok_or_else(|| not_found("Lab"))
}

async fn update_lab(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<LabUpdateForm>,
) -> Reply<Lab> {
    authorize(&headers)?;
    let mut db = state.db.write().await;
    let lab = db.labs.get_mut(&id).ok_or_else(|| not_found("Lab"))?;
    if let Some(name) = input.name {
        lab.name = name;
    }
    if input.description.is_some() {
        lab.description = input.description;
    }
    if let Some(enabled) = input.enabled {
        lab.enabled = enabled;
    }
    lab.updated_at = now();
    Ok(Json(lab.clone()))
}

async fn delete_lab(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<bool> {
    authorize(&headers)?;
    let removed = state.db.write().await.labs.remove(&id);
    removed.map(|_| Json(true)).ok_or_else(|| not_found("Lab"))
}
