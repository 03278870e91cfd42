//! `/labs` endpoints. Same contract as the course endpoints: unconditional
//! authorization, lenient bodies, `detail`/`error`/status-line errors.

use serde_json::Value;

use crate::client::{ApiClient, AuthPolicy};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{LabForm, LabUpdate};

impl<T: Transport> ApiClient<T> {
    pub fn build_get_lab_by_id(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/labs/id/{id}"), AuthPolicy::Always)
    }

    pub fn parse_get_lab_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.admin_json(response)
    }

    pub async fn get_lab_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_lab_by_id(id)).await?;
        self.parse_get_lab_by_id(response)
    }

    pub fn build_create_lab(&self, lab: &LabForm) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/labs/create", AuthPolicy::Always, lab)
    }

    pub fn parse_create_lab(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.admin_json(response)
    }

    pub async fn create_lab(&self, lab: &LabForm) -> Result<Value, ApiError> {
        let response = self.send(self.build_create_lab(lab)?).await?;
        self.parse_create_lab(response)
    }

    pub fn build_update_lab(&self, id: &str, update: &LabUpdate) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            &format!("/labs/id/{id}/update"),
            AuthPolicy::Always,
            update,
        )
    }

    pub fn parse_update_lab(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.admin_json(response)
    }

    pub async fn update_lab(&self, id: &str, update: &LabUpdate) -> Result<Value, ApiError> {
        let response = self.send(self.build_update_lab(id, update)?).await?;
        self.parse_update_lab(response)
    }

    pub fn build_delete_lab(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/labs/id/{id}/delete"), AuthPolicy::Always)
    }

    pub fn parse_delete_lab(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.admin_json(response)
    }

    pub async fn delete_lab(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_delete_lab(id)).await?;
        self.parse_delete_lab(response)
    }
}
