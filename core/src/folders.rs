//! `/folders` endpoints. All of them authorize unconditionally, decode
//! strictly, and surface the `detail` field of an error body.

use serde_json::{json, Value};

use crate::client::{ApiClient, AuthPolicy, BodyPolicy, ErrorValue};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::query::QueryParams;
use crate::types::{ChatContext, FolderForm, FolderItems};

impl<T: Transport> ApiClient<T> {
    fn folder_json(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.read_json(response, ErrorValue::Detail, BodyPolicy::Strict)
    }

    fn folder_update(&self, path: &str, body: &Value) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, path, AuthPolicy::Always, body)
    }

    pub fn build_create_new_folder(&self, form: &FolderForm) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/folders/", AuthPolicy::Always, form)
    }

    pub fn parse_create_new_folder(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.folder_json(response)
    }

    pub async fn create_new_folder(&self, form: &FolderForm) -> Result<Value, ApiError> {
        let response = self.send(self.build_create_new_folder(form)?).await?;
        self.parse_create_new_folder(response)
    }

    /// `GET /folders/`, with the context as a query string only when at least
    /// one field is present.
    pub fn build_get_folders(&self, context: Option<&ChatContext>) -> HttpRequest {
        let mut params = QueryParams::new();
        params.push_context(context);
        self.request(HttpMethod::Get, &params.append_to("/folders/"), AuthPolicy::Always)
    }

    pub fn parse_get_folders(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.folder_json(response)
    }

    pub async fn get_folders(&self, context: Option<&ChatContext>) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_folders(context)).await?;
        self.parse_get_folders(response)
    }

    pub fn build_get_folder_by_id(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/folders/{id}"), AuthPolicy::Always)
    }

    pub fn parse_get_folder_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.folder_json(response)
    }

    pub async fn get_folder_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_folder_by_id(id)).await?;
        self.parse_get_folder_by_id(response)
    }

    pub fn build_update_folder_by_id(&self, id: &str, form: &FolderForm) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            &format!("/folders/{id}/update"),
            AuthPolicy::Always,
            form,
        )
    }

    pub fn parse_update_folder_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.folder_json(response)
    }

    pub async fn update_folder_by_id(&self, id: &str, form: &FolderForm) -> Result<Value, ApiError> {
        let response = self.send(self.build_update_folder_by_id(id, form)?).await?;
        self.parse_update_folder_by_id(response)
    }

    pub fn build_update_folder_is_expanded_by_id(
        &self,
        id: &str,
        is_expanded: bool,
    ) -> Result<HttpRequest, ApiError> {
        self.folder_update(
            &format!("/folders/{id}/update/expanded"),
            &json!({ "is_expanded": is_expanded }),
        )
    }

    pub fn parse_update_folder_is_expanded_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.folder_json(response)
    }

    pub async fn update_folder_is_expanded_by_id(&self, id: &str, is_expanded: bool) -> Result<Value, ApiError> {
        let response = self.send(self.build_update_folder_is_expanded_by_id(id, is_expanded)?).await?;
        self.parse_update_folder_is_expanded_by_id(response)
    }

    /// `None` sends `{}`, which moves the folder to the top level.
    pub fn build_update_folder_parent_id_by_id(
        &self,
        id: &str,
        parent_id: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = match parent_id {
            Some(parent_id) => json!({ "parent_id": parent_id }),
            None => json!({}),
        };
        self.folder_update(&format!("/folders/{id}/update/parent"), &body)
    }

    pub fn parse_update_folder_parent_id_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.folder_json(response)
    }

    pub async fn update_folder_parent_id_by_id(
        &self,
        id: &str,
        parent_id: Option<&str>,
    ) -> Result<Value, ApiError> {
        let response = self.send(self.build_update_folder_parent_id_by_id(id, parent_id)?).await?;
        self.parse_update_folder_parent_id_by_id(response)
    }

    pub fn build_update_folder_items_by_id(&self, id: &str, items: &FolderItems) -> Result<HttpRequest, ApiError> {
        self.folder_update(&format!("/folders/{id}/update/items"), &json!({ "items": items }))
    }

    pub fn parse_update_folder_items_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.folder_json(response)
    }

    pub async fn update_folder_items_by_id(&self, id: &str, items: &FolderItems) -> Result<Value, ApiError> {
        let response = self.send(self.build_update_folder_items_by_id(id, items)?).await?;
        self.parse_update_folder_items_by_id(response)
    }

    pub fn build_delete_folder_by_id(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/folders/{id}"), AuthPolicy::Always)
    }

    pub fn parse_delete_folder_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.folder_json(response)
    }

    pub async fn delete_folder_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_delete_folder_by_id(id)).await?;
        self.parse_delete_folder_by_id(response)
    }
}
