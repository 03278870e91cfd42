//! `/courses` endpoints.
//!
//! # Design
//! Deployments disagree on two things: whether listings arrive as a bare
//! array or wrapped in an envelope object, and which method/path pair
//! accepts a course update. `CourseApi` selects between the two known
//! variants. In the tolerant variant the update is discovered at runtime by
//! walking `COURSE_UPDATE_ROUTES` in order until some route answers with
//! anything other than `405 Method Not Allowed`. Attempts are sequential so a
//! mutating request is never in flight twice.

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::client::{ApiClient, AuthPolicy, BodyPolicy, ErrorValue};
use crate::config::CourseApi;
use crate::envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
use crate::types::{CourseForm, CourseUpdate};

pub const METHOD_NOT_ALLOWED: u16 = 405;

/// Candidate (method, suffix) pairs appended to `/courses/id/{id}`, in the
/// order they are tried.
pub const COURSE_UPDATE_ROUTES: [(HttpMethod, &str); 6] = [
    (HttpMethod::Put, "/update"),
    (HttpMethod::Put, "/update/"),
    (HttpMethod::Post, "/update"),
    (HttpMethod::Post, "/update/"),
    (HttpMethod::Put, ""),
    (HttpMethod::Post, ""),
];

impl<T: Transport> ApiClient<T> {
    pub(crate) fn admin_json(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.read_json(response, ErrorValue::Message, BodyPolicy::Lenient)
    }

    /// Decode a course or lab listing according to the configured variant.
    pub(crate) fn admin_list(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        let value = self.admin_json(response)?;
        match self.course_api() {
            CourseApi::Tolerant => Ok(envelope::list_items(value)),
            CourseApi::Legacy => self.expect_array(value),
        }
    }

    pub fn build_get_courses(&self) -> HttpRequest {
        let path = match self.course_api() {
            CourseApi::Tolerant => "/courses/",
            CourseApi::Legacy => "/courses",
        };
        self.request(HttpMethod::Get, path, AuthPolicy::Always)
    }

    pub fn parse_get_courses(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        self.admin_list(response)
    }

    pub async fn get_courses(&self) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.build_get_courses()).await?;
        self.parse_get_courses(response)
    }

    pub fn build_get_course_by_id(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/courses/id/{id}"), AuthPolicy::Always)
    }

    pub fn parse_get_course_by_id(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.admin_json(response)
    }

    pub async fn get_course_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_get_course_by_id(id)).await?;
        self.parse_get_course_by_id(response)
    }

    pub fn build_get_labs_for_course(&self, course_id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/courses/id/{course_id}/labs"),
            AuthPolicy::Always,
        )
    }

    pub fn parse_get_labs_for_course(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        self.admin_list(response)
    }

    pub async fn get_labs_for_course(&self, course_id: &str) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.build_get_labs_for_course(course_id)).await?;
        self.parse_get_labs_for_course(response)
    }

    pub fn build_create_course(&self, course: &CourseForm) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/courses/create", AuthPolicy::Always, course)
    }

    pub fn parse_create_course(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.admin_json(response)
    }

    pub async fn create_course(&self, course: &CourseForm) -> Result<Value, ApiError> {
        let response = self.send(self.build_create_course(course)?).await?;
        self.parse_create_course(response)
    }

    /// Candidate update requests in the order they are tried. The legacy
    /// variant has exactly one.
    pub fn build_update_course_attempts(
        &self,
        id: &str,
        update: &CourseUpdate,
    ) -> Result<Vec<HttpRequest>, ApiError> {
        match self.course_api() {
            CourseApi::Tolerant => COURSE_UPDATE_ROUTES
                .iter()
                .map(|(method, suffix)| {
                    self.json_request(
                        *method,
                        &format!("/courses/id/{id}{suffix}"),
                        AuthPolicy::Always,
                        update,
                    )
                })
                .collect(),
            CourseApi::Legacy => Ok(vec![self.json_request(
                HttpMethod::Post,
                &format!("/courses/id/{id}/update"),
                AuthPolicy::Always,
                update,
            )?]),
        }
    }

    pub fn parse_update_course(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.admin_json(response)
    }

    pub async fn update_course(&self, id: &str, update: &CourseUpdate) -> Result<Value, ApiError> {
        let attempts = self.build_update_course_attempts(id, update)?;
        let response = match self.course_api() {
            CourseApi::Tolerant => self.probe(attempts).await?,
            CourseApi::Legacy => {
                let mut attempts = attempts.into_iter();
                let request = attempts
                    .next()
                    .ok_or_else(|| ApiError::Transport(TransportError::network()))?;
                self.send(request).await?
            }
        };
        self.parse_update_course(response)
    }

    /// Issue `candidates` one at a time and return the first response that is
    /// not a 405. Transport failures are remembered and skipped; when every
    /// candidate is used up the last one (or the network sentinel) is the
    /// error.
    pub(crate) async fn probe(&self, candidates: Vec<HttpRequest>) -> Result<HttpResponse, ApiError> {
        let mut last_failure: Option<TransportError> = None;

        for (attempt, request) in candidates.into_iter().enumerate() {
            let method = request.method;
            let path = request.path.clone();

            match self.transport().execute(request).await {
                Ok(response) if response.status == METHOD_NOT_ALLOWED => {
                    debug!(attempt, %method, path, "route rejected method, trying next candidate");
                }
                Ok(response) => {
                    debug!(attempt, %method, path, status = response.status, "route accepted request");
                    return Ok(response);
                }
                Err(err) => {
                    warn!(attempt, %method, path, error = %err, "candidate route failed to respond");
                    last_failure = Some(err);
                }
            }
        }

        let err = last_failure.unwrap_or_else(TransportError::network);
        error!(error = %err, "no candidate route accepted the request");
        Err(ApiError::Transport(err))
    }

    pub fn build_delete_course(&self, id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            &format!("/courses/id/{id}/delete"),
            AuthPolicy::Always,
        )
    }

    pub fn parse_delete_course(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.admin_json(response)
    }

    pub async fn delete_course(&self, id: &str) -> Result<Value, ApiError> {
        let response = self.send(self.build_delete_course(id)).await?;
        self.parse_delete_course(response)
    }
}
