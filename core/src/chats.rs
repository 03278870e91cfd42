//! `/chats` endpoints.
//!
//! Every chat endpoint decodes success bodies strictly. Error extraction
//! varies per endpoint (see the `ErrorValue` passed to each `parse_*`), and
//! most endpoints only send `Authorization` when a token is configured; the
//! create, import and paged-list endpoints always send it.

use serde_json::{json, Map, Value};

use crate::client::{ApiClient, AuthPolicy, BodyPolicy, ErrorValue};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::query::QueryParams;
use crate::types::{ChatContext, ChatListItem, ImportChat};

impl<T: Transport> ApiClient<T> {
    fn chat_json(&self, response: HttpResponse, errors: ErrorValue) -> Result<Value, ApiError> {
        self.read_json(response, errors, BodyPolicy::Strict)
    }

    fn chat_get(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Get, path, AuthPolicy::IfPresent)
    }

    fn chat_post(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Post, path, AuthPolicy::IfPresent)
    }

    fn chat_delete(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, path, AuthPolicy::IfPresent)
    }

    // -----------------------------------------------------------------------
    // Create / import
    // -----------------------------------------------------------------------

    /// `POST /chats/new`. Context fields are merged into the body.
    pub fn build_create_new_chat(
        &self,
        chat: &Value,
        folder_id: Option<&str>,
        context: Option<&ChatContext>,
    ) -> Result<HttpRequest, ApiError> {
        let mut body = Map::new();
        body.insert("chat".to_string(), chat.clone());
        body.insert("folder_id".to_string(), json!(folder_id));
        if let Some(context) = context {
            context.merge_into(&mut body);
        }
        self.json_request(HttpMethod::Post, "/chats/new", AuthPolicy::Always, &body)
    }

    pub fn parse_create_new_chat(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn create_new_chat(
        &self,
        chat: &Value,
        folder_id: Option<&str>,
        context: Option<&ChatContext>,
    ) -> Result<Value, ApiError> {
        let response = self.send(self.build_create_new_chat(chat, folder_id, context)?).await?;
        self.parse_create_new_chat(response)
    }

    /// `POST /chats/import`. A missing `meta` is sent as `{}`; missing
    /// timestamps are sent as `null`.
    pub fn build_import_chat(
        &self,
        import: &ImportChat,
        context: Option<&ChatContext>,
    ) -> Result<HttpRequest, ApiError> {
        let mut body = Map::new();
        body.insert("chat".to_string(), import.chat.clone());
        body.insert(
            "meta".to_string(),
            import.meta.clone().unwrap_or_else(|| json!({})),
        );
        if let Some(pinned) = import.pinned {
            body.insert("pinned".to_string(), json!(pinned));
        }
        if let Some(folder_id) = &import.folder_id {
            body.insert("folder_id".to_string(), json!(folder_id));
        }
        body.insert("created_at".to_string(), json!(import.created_at));
        body.insert("updated_at".to_string(), json!(import.updated_at));
        if let Some(context) = context {
            context.merge_into(&mut body);
        }
        self.json_request(HttpMethod::Post, "/chats/import", AuthPolicy::Always, &body)
    }

    pub fn parse_import_chat(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn import_chat(
        &self,
        import: &ImportChat,
        context: Option<&ChatContext>,
    ) -> Result<Value, ApiError> {
        let response = self.send(self.build_import_chat(import, context)?).await?;
        self.parse_import_chat(response)
    }

    // -----------------------------------------------------------------------
    // Listings
    // -----------------------------------------------------------------------

    /// `GET /chats/?page&include_folders&context…`. Unlike the other chat
    /// endpoints this one sends no `accept` header.
    pub fn build_get_chat_list(
        &self,
        page: Option<u32>,
        include_folders: bool,
        context: Option<&ChatContext>,
    ) -> HttpRequest {
        let mut params = QueryParams::new();
        params.push_opt("page", page);
        if include_folders {
            params.push("include_folders", "true");
        }
        params.push_context(context);

        let mut request = self.request(HttpMethod::Get, &params.append_to("/chats/"), AuthPolicy::Always);
        request.headers.retain(|(name, _)| name != "accept");
        request
    }

    /// Narrow each chat to `ChatListItem`, defaulting `is_pinned` to false.
    pub fn parse_get_chat_list(&self, response: HttpResponse) -> Result<Vec<ChatListItem>, ApiError> {
        let items = self.expect_array(self.chat_json(response, ErrorValue::Body)?)?;
        items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| {
                    tracing::error!(error = %e, "chat list entry has an unexpected shape");
                    ApiError::Decode(e.to_string())
                })
            })
            .collect()
    }

    pub async fn get_chat_list(
        &self,
        page: Option<u32>,
        include_folders: bool,
        context: Option<&ChatContext>,
    ) -> Result<Vec<ChatListItem>, ApiError> {
        let response = self.send(self.build_get_chat_list(page, include_folders, context)).await?;
        self.parse_get_chat_list(response)
    }

    pub fn build_get_chat_list_by_user_id(
        &self,
        user_id: &str,
        page: u32,
        filter: Option<&ChatContext>,
    ) -> HttpRequest {
        let mut params = QueryParams::new();
        params.push("page", page).push_context(filter);
        self.chat_get(&params.append_to(&format!("/chats/list/user/{user_id}")))
    }

    pub fn parse_get_chat_list_by_user_id(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        self.with_time_ranges(self.chat_json(response, ErrorValue::Body)?)
    }

    pub async fn get_chat_list_by_user_id(
        &self,
        user_id: &str,
        page: u32,
        filter: Option<&ChatContext>,
    ) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.build_get_chat_list_by_user_id(user_id, page, filter)).await?;
        self.parse_get_chat_list_by_user_id(response)
    }

    pub fn build_get_archived_chat_list(&self, page: u32, filter: Option<&ChatContext>) -> HttpRequest {
        let mut params = QueryParams::new();
        params.push("page", page).push_context(filter);
        self.chat_get(&params.append_to("/chats/archived"))
    }

    pub fn parse_get_archived_chat_list(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        self.with_time_ranges(self.chat_json(response, ErrorValue::Body)?)
    }

    pub async fn get_archived_chat_list(
        &self,
        page: u32,
        filter: Option<&ChatContext>,
    ) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.build_get_archived_chat_list(page, filter)).await?;
        self.parse_get_archived_chat_list(response)
    }

    pub fn build_get_all_chats(&self) -> HttpRequest {
        self.chat_get("/chats/all")
    }

    pub fn parse_get_all_chats(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn get_all_chats(&self) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_all_chats()).await?;
        self.parse_get_all_chats(response)
    }

    /// `GET /chats/search?text&page&context…`
    pub fn build_get_chat_list_by_search_text(
        &self,
        text: &str,
        page: u32,
        context: Option<&ChatContext>,
    ) -> HttpRequest {
        let mut params = QueryParams::new();
        params.push("text", text).push("page", page).push_context(context);
        self.chat_get(&params.append_to("/chats/search"))
    }

    pub fn parse_get_chat_list_by_search_text(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        self.with_time_ranges(self.chat_json(response, ErrorValue::Body)?)
    }

    pub async fn get_chat_list_by_search_text(
        &self,
        text: &str,
        page: u32,
        context: Option<&ChatContext>,
    ) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.build_get_chat_list_by_search_text(text, page, context)).await?;
        self.parse_get_chat_list_by_search_text(response)
    }

    pub fn build_get_chats_by_folder_id(&self, folder_id: &str) -> HttpRequest {
        self.chat_get(&format!("/chats/folder/{folder_id}"))
    }

    pub fn parse_get_chats_by_folder_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn get_chats_by_folder_id(&self, folder_id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_chats_by_folder_id(folder_id)).await?;
        self.parse_get_chats_by_folder_id(response)
    }

    pub fn build_get_chat_list_by_folder_id(&self, folder_id: &str, page: u32) -> HttpRequest {
        let mut params = QueryParams::new();
        params.push("page", page);
        self.chat_get(&params.append_to(&format!("/chats/folder/{folder_id}/list")))
    }

    pub fn parse_get_chat_list_by_folder_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn get_chat_list_by_folder_id(&self, folder_id: &str, page: u32) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_chat_list_by_folder_id(folder_id, page)).await?;
        self.parse_get_chat_list_by_folder_id(response)
    }

    pub fn build_get_all_archived_chats(&self) -> HttpRequest {
        self.chat_get("/chats/all/archived")
    }

    pub fn parse_get_all_archived_chats(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn get_all_archived_chats(&self) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_all_archived_chats()).await?;
        self.parse_get_all_archived_chats(response)
    }

    pub fn build_get_all_user_chats(&self) -> HttpRequest {
        self.chat_get("/chats/all/db")
    }

    pub fn parse_get_all_user_chats(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn get_all_user_chats(&self) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_all_user_chats()).await?;
        self.parse_get_all_user_chats(response)
    }

    pub fn build_get_all_tags(&self) -> HttpRequest {
        self.chat_get("/chats/all/tags")
    }

    pub fn parse_get_all_tags(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn get_all_tags(&self) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_all_tags()).await?;
        self.parse_get_all_tags(response)
    }

    pub fn build_get_pinned_chat_list(&self) -> HttpRequest {
        self.chat_get("/chats/pinned")
    }

    pub fn parse_get_pinned_chat_list(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        self.with_time_ranges(self.chat_json(response, ErrorValue::Body)?)
    }

    pub async fn get_pinned_chat_list(&self) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.build_get_pinned_chat_list()).await?;
        self.parse_get_pinned_chat_list(response)
    }

    /// `POST /chats/tags` with `{name}`; the server filters by tag.
    pub fn build_get_chat_list_by_tag_name(&self, tag_name: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            "/chats/tags",
            AuthPolicy::IfPresent,
            &json!({ "name": tag_name }),
        )
    }

    pub fn parse_get_chat_list_by_tag_name(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        self.with_time_ranges(self.chat_json(response, ErrorValue::Body)?)
    }

    pub async fn get_chat_list_by_tag_name(&self, tag_name: &str) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.build_get_chat_list_by_tag_name(tag_name)?).await?;
        self.parse_get_chat_list_by_tag_name(response)
    }

    // -----------------------------------------------------------------------
    // Single chat
    // -----------------------------------------------------------------------

    pub fn build_get_chat_by_id(&self, id: &str) -> HttpRequest {
        self.chat_get(&format!("/chats/{id}"))
    }

    pub fn parse_get_chat_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Detail)
    }

    pub async fn get_chat_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_chat_by_id(id)).await?;
        self.parse_get_chat_by_id(response)
    }

    pub fn build_get_chat_by_share_id(&self, share_id: &str) -> HttpRequest {
        self.chat_get(&format!("/chats/share/{share_id}"))
    }

    pub fn parse_get_chat_by_share_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn get_chat_by_share_id(&self, share_id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_chat_by_share_id(share_id)).await?;
        self.parse_get_chat_by_share_id(response)
    }

    pub fn build_get_chat_pinned_status_by_id(&self, id: &str) -> HttpRequest {
        self.chat_get(&format!("/chats/{id}/pinned"))
    }

    pub fn parse_get_chat_pinned_status_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::DetailOrBody)
    }

    pub async fn get_chat_pinned_status_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_chat_pinned_status_by_id(id)).await?;
        self.parse_get_chat_pinned_status_by_id(response)
    }

    pub fn build_toggle_chat_pinned_status_by_id(&self, id: &str) -> HttpRequest {
        self.chat_post(&format!("/chats/{id}/pin"))
    }

    pub fn parse_toggle_chat_pinned_status_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::DetailOrBody)
    }

    pub async fn toggle_chat_pinned_status_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_toggle_chat_pinned_status_by_id(id)).await?;
        self.parse_toggle_chat_pinned_status_by_id(response)
    }

    /// `POST /chats/{id}/clone`. The title is only sent when non-empty.
    pub fn build_clone_chat_by_id(&self, id: &str, title: Option<&str>) -> Result<HttpRequest, ApiError> {
        let mut body = Map::new();
        if let Some(title) = title.filter(|title| !title.is_empty()) {
            body.insert("title".to_string(), json!(title));
        }
        self.json_request(
            HttpMethod::Post,
            &format!("/chats/{id}/clone"),
            AuthPolicy::IfPresent,
            &body,
        )
    }

    pub fn parse_clone_chat_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::DetailOrBody)
    }

    pub async fn clone_chat_by_id(&self, id: &str, title: Option<&str>) -> Result<Value, ApiError> {
        let response = self.send(self.build_clone_chat_by_id(id, title)?).await?;
        self.parse_clone_chat_by_id(response)
    }

    pub fn build_clone_shared_chat_by_id(&self, id: &str) -> HttpRequest {
        self.chat_post(&format!("/chats/{id}/clone/shared"))
    }

    pub fn parse_clone_shared_chat_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::DetailOrBody)
    }

    pub async fn clone_shared_chat_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_clone_shared_chat_by_id(id)).await?;
        self.parse_clone_shared_chat_by_id(response)
    }

    pub fn build_share_chat_by_id(&self, id: &str) -> HttpRequest {
        self.chat_post(&format!("/chats/{id}/share"))
    }

    pub fn parse_share_chat_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn share_chat_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_share_chat_by_id(id)).await?;
        self.parse_share_chat_by_id(response)
    }

    /// `POST /chats/{id}/folder`. `None` sends `{}`, which moves the chat out
    /// of its folder.
    pub fn build_update_chat_folder_id_by_id(
        &self,
        id: &str,
        folder_id: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let mut body = Map::new();
        if let Some(folder_id) = folder_id {
            body.insert("folder_id".to_string(), json!(folder_id));
        }
        self.json_request(
            HttpMethod::Post,
            &format!("/chats/{id}/folder"),
            AuthPolicy::IfPresent,
            &body,
        )
    }

    pub fn parse_update_chat_folder_id_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn update_chat_folder_id_by_id(
        &self,
        id: &str,
        folder_id: Option<&str>,
    ) -> Result<Value, ApiError> {
        let response = self.send(self.build_update_chat_folder_id_by_id(id, folder_id)?).await?;
        self.parse_update_chat_folder_id_by_id(response)
    }

    pub fn build_archive_chat_by_id(&self, id: &str) -> HttpRequest {
        self.chat_post(&format!("/chats/{id}/archive"))
    }

    pub fn parse_archive_chat_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn archive_chat_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_archive_chat_by_id(id)).await?;
        self.parse_archive_chat_by_id(response)
    }

    pub fn build_delete_shared_chat_by_id(&self, id: &str) -> HttpRequest {
        self.chat_delete(&format!("/chats/{id}/share"))
    }

    pub fn parse_delete_shared_chat_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn delete_shared_chat_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_delete_shared_chat_by_id(id)).await?;
        self.parse_delete_shared_chat_by_id(response)
    }

    /// `POST /chats/{id}` with `{chat}`.
    pub fn build_update_chat_by_id(&self, id: &str, chat: &Value) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            &format!("/chats/{id}"),
            AuthPolicy::IfPresent,
            &json!({ "chat": chat }),
        )
    }

    pub fn parse_update_chat_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn update_chat_by_id(&self, id: &str, chat: &Value) -> Result<Value, ApiError> {
        let response = self.send(self.build_update_chat_by_id(id, chat)?).await?;
        self.parse_update_chat_by_id(response)
    }

    pub fn build_delete_chat_by_id(&self, id: &str) -> HttpRequest {
        self.chat_delete(&format!("/chats/{id}"))
    }

    pub fn parse_delete_chat_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Detail)
    }

    pub async fn delete_chat_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_delete_chat_by_id(id)).await?;
        self.parse_delete_chat_by_id(response)
    }

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    pub fn build_get_tags_by_id(&self, id: &str) -> HttpRequest {
        self.chat_get(&format!("/chats/{id}/tags"))
    }

    pub fn parse_get_tags_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn get_tags_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_tags_by_id(id)).await?;
        self.parse_get_tags_by_id(response)
    }

    pub fn build_add_tag_by_id(&self, id: &str, tag_name: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            &format!("/chats/{id}/tags"),
            AuthPolicy::IfPresent,
            &json!({ "name": tag_name }),
        )
    }

    pub fn parse_add_tag_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Detail)
    }

    pub async fn add_tag_by_id(&self, id: &str, tag_name: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_add_tag_by_id(id, tag_name)?).await?;
        self.parse_add_tag_by_id(response)
    }

    pub fn build_delete_tag_by_id(&self, id: &str, tag_name: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Delete,
            &format!("/chats/{id}/tags"),
            AuthPolicy::IfPresent,
            &json!({ "name": tag_name }),
        )
    }

    pub fn parse_delete_tag_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn delete_tag_by_id(&self, id: &str, tag_name: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_delete_tag_by_id(id, tag_name)?).await?;
        self.parse_delete_tag_by_id(response)
    }

    pub fn build_delete_tags_by_id(&self, id: &str) -> HttpRequest {
        self.chat_delete(&format!("/chats/{id}/tags/all"))
    }

    pub fn parse_delete_tags_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Body)
    }

    pub async fn delete_tags_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_delete_tags_by_id(id)).await?;
        self.parse_delete_tags_by_id(response)
    }

    // -----------------------------------------------------------------------
    // Bulk
    // -----------------------------------------------------------------------

    pub fn build_delete_all_chats(&self) -> HttpRequest {
        self.chat_delete("/chats/")
    }

    pub fn parse_delete_all_chats(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Detail)
    }

    pub async fn delete_all_chats(&self) -> Result<Value, ApiError> {
        let response = self.send(self.build_delete_all_chats()).await?;
        self.parse_delete_all_chats(response)
    }

    pub fn build_archive_all_chats(&self) -> HttpRequest {
        self.chat_post("/chats/archive/all")
    }

    pub fn parse_archive_all_chats(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Detail)
    }

    pub async fn archive_all_chats(&self) -> Result<Value, ApiError> {
        let response = self.send(self.build_archive_all_chats()).await?;
        self.parse_archive_all_chats(response)
    }

    pub fn build_unarchive_all_chats(&self) -> HttpRequest {
        self.chat_post("/chats/unarchive/all")
    }

    pub fn parse_unarchive_all_chats(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.chat_json(response, ErrorValue::Detail)
    }

    pub async fn unarchive_all_chats(&self) -> Result<Value, ApiError> {
        let response = self.send(self.build_unarchive_all_chats()).await?;
        self.parse_unarchive_all_chats(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContextType;

    const BASE: &str = "http://localhost:8080/api/v1";

    fn client() -> ApiClient {
        ApiClient::new(BASE).with_token("tok")
    }

    fn body(request: &HttpRequest) -> Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn create_new_chat_merges_context_into_body() {
        let ctx = ChatContext::lab(Some("c1".to_string()), "L1");
        let req = client()
            .build_create_new_chat(&json!({"title": "New"}), None, Some(&ctx))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, format!("{BASE}/chats/new"));
        assert_eq!(
            body(&req),
            json!({
                "chat": {"title": "New"},
                "folder_id": null,
                "context_type": "lab",
                "course_id": "c1",
                "lab_id": "L1"
            })
        );
    }

    #[test]
    fn create_new_chat_always_authorizes() {
        let req = ApiClient::new(BASE)
            .build_create_new_chat(&json!({}), Some("f1"), None)
            .unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer "));
        assert_eq!(body(&req)["folder_id"], "f1");
    }

    #[test]
    fn import_chat_fills_defaults() {
        let import = ImportChat {
            chat: json!({"title": "Imported"}),
            pinned: Some(true),
            ..ImportChat::default()
        };
        let req = client().build_import_chat(&import, None).unwrap();
        assert_eq!(
            body(&req),
            json!({
                "chat": {"title": "Imported"},
                "meta": {},
                "pinned": true,
                "created_at": null,
                "updated_at": null
            })
        );
    }

    #[test]
    fn chat_list_query_and_headers() {
        let ctx = ChatContext {
            context_type: Some(ContextType::Lab),
            course_id: None,
            lab_id: Some("L1".to_string()),
        };
        let req = client().build_get_chat_list(Some(2), true, Some(&ctx));
        assert_eq!(
            req.path,
            format!("{BASE}/chats/?page=2&include_folders=true&context_type=lab&lab_id=L1")
        );
        assert_eq!(req.header("accept"), None);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
    }

    #[test]
    fn chat_list_without_params_has_no_query() {
        let req = client().build_get_chat_list(None, false, None);
        assert_eq!(req.path, format!("{BASE}/chats/"));
    }

    #[test]
    fn chat_list_projection() {
        let response = HttpResponse::new(
            200,
            r#"[{"id":"1","title":"T","chat_folder_id":"f","created_at":1,"updated_at":2,"meta":{}}]"#,
        );
        let items = client().parse_get_chat_list(response).unwrap();
        assert_eq!(
            serde_json::to_value(&items).unwrap(),
            json!([{"id":"1","title":"T","chat_folder_id":"f","created_at":1,"updated_at":2,"is_pinned":false}])
        );
    }

    #[test]
    fn chat_list_keeps_null_titles_and_float_timestamps() {
        let response = HttpResponse::new(
            200,
            r#"[{"id":"1","title":null,"created_at":1,"updated_at":1700000000.5},{"id":"2","title":"B","created_at":3,"updated_at":4}]"#,
        );
        let items = client().parse_get_chat_list(response).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            serde_json::to_value(&items[0]).unwrap(),
            json!({"id":"1","title":null,"created_at":1,"updated_at":1700000000.5,"is_pinned":false})
        );
        assert_eq!(items[1].title_str(), Some("B"));
        assert!(items[1].chat_folder_id.is_none());
    }

    #[test]
    fn chat_list_error_is_whole_body() {
        let response = HttpResponse::new(401, r#"{"detail":"Not authenticated"}"#);
        let err = client().parse_get_chat_list(response).unwrap_err();
        assert_eq!(err.error_value(), json!({"detail": "Not authenticated"}));
    }

    #[test]
    fn pinned_list_adds_time_range() {
        let client = client().with_time_range(|ts: i64| if ts == 1000 { "Long ago".into() } else { String::new() });
        let chats = client
            .parse_get_pinned_chat_list(HttpResponse::new(200, r#"[{"id":"1","updated_at":1000}]"#))
            .unwrap();
        assert_eq!(chats, vec![json!({"id": "1", "updated_at": 1000, "time_range": "Long ago"})]);
    }

    #[test]
    fn search_query_order() {
        let req = client().build_get_chat_list_by_search_text("hello world", 1, Some(&ChatContext::course("c1")));
        assert_eq!(
            req.path,
            format!("{BASE}/chats/search?text=hello+world&page=1&context_type=channel&course_id=c1")
        );
    }

    #[test]
    fn user_listing_omits_auth_without_token() {
        let req = ApiClient::new(BASE).build_get_chat_list_by_user_id("u1", 3, None);
        assert_eq!(req.path, format!("{BASE}/chats/list/user/u1?page=3"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn get_chat_by_id_extracts_detail() {
        let response = HttpResponse::new(404, r#"{"detail":"Chat not found"}"#);
        let err = client().parse_get_chat_by_id(response).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.error_value(), json!("Chat not found"));
    }

    #[test]
    fn toggle_pin_falls_back_to_body_without_detail() {
        let response = HttpResponse::new(500, r#"{"message":"boom"}"#);
        let err = client().parse_toggle_chat_pinned_status_by_id(response).unwrap_err();
        assert_eq!(err.error_value(), json!({"message": "boom"}));
    }

    #[test]
    fn clone_skips_empty_title() {
        let req = client().build_clone_chat_by_id("c1", Some("")).unwrap();
        assert_eq!(body(&req), json!({}));
        let req = client().build_clone_chat_by_id("c1", Some("Copy")).unwrap();
        assert_eq!(req.path, format!("{BASE}/chats/c1/clone"));
        assert_eq!(body(&req), json!({"title": "Copy"}));
    }

    #[test]
    fn moving_out_of_folder_sends_empty_body() {
        let req = client().build_update_chat_folder_id_by_id("c1", None).unwrap();
        assert_eq!(body(&req), json!({}));
    }

    #[test]
    fn delete_tag_carries_body() {
        let req = client().build_delete_tag_by_id("c1", "rust").unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, format!("{BASE}/chats/c1/tags"));
        assert_eq!(body(&req), json!({"name": "rust"}));
    }

    #[test]
    fn delete_returns_raw_body() {
        let value = client().parse_delete_chat_by_id(HttpResponse::new(200, "true")).unwrap();
        assert_eq!(value, json!(true));
    }

    #[test]
    fn empty_listing_is_success() {
        let chats = client().parse_get_archived_chat_list(HttpResponse::new(200, "[]")).unwrap();
        assert!(chats.is_empty());
    }

    #[test]
    fn bulk_endpoints() {
        let c = client();
        assert_eq!(c.build_delete_all_chats().method, HttpMethod::Delete);
        assert_eq!(c.build_delete_all_chats().path, format!("{BASE}/chats/"));
        assert_eq!(c.build_archive_all_chats().path, format!("{BASE}/chats/archive/all"));
        assert_eq!(c.build_unarchive_all_chats().path, format!("{BASE}/chats/unarchive/all"));
    }
}
