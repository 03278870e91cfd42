//! The client handle plus the request/response contract every endpoint shares.
//!
//! # Design
//! `ApiClient` holds its configuration (base URL, token, Courses variant),
//! the time-range labeller and a `Transport`, and carries no mutable state
//! between calls. Each endpoint is split into a `build_*` method producing an
//! `HttpRequest`, a `parse_*` method consuming an `HttpResponse`, and an async
//! method that runs one through the transport into the other. The resource
//! modules (`chats`, `folders`, `courses`, `labs`) add those methods in their
//! own `impl` blocks on top of the helpers defined here.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::{ClientConfig, CourseApi};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::time_range::{CalendarTimeRange, TimeRangeLabeler};

/// Whether an endpoint sends `Authorization` unconditionally or only when a
/// token is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthPolicy {
    Always,
    IfPresent,
}

/// How a success body that is not valid JSON is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyPolicy {
    /// Surface `ApiError::Decode`.
    Strict,
    /// Treat it as `{}`.
    Lenient,
}

/// Which part of a non-success body becomes the error value.
///
/// Endpoints disagree on this and callers depend on each endpoint's choice,
/// so it is fixed per endpoint rather than unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorValue {
    /// The `detail` field, falling back to `Message` when it is absent.
    Detail,
    /// The `detail` field if the body has one, else the whole body.
    DetailOrBody,
    /// The whole parsed body.
    Body,
    /// A non-empty `detail`, else a non-empty `error`, else the status line.
    Message,
}

impl ErrorValue {
    pub fn extract(self, body: &Value, response: &HttpResponse) -> Value {
        match self {
            ErrorValue::Body => body.clone(),
            ErrorValue::DetailOrBody => body.get("detail").cloned().unwrap_or_else(|| body.clone()),
            ErrorValue::Detail => match body.get("detail") {
                Some(detail) if !detail.is_null() => detail.clone(),
                _ => message(body, response),
            },
            ErrorValue::Message => message(body, response),
        }
    }
}

fn message(body: &Value, response: &HttpResponse) -> Value {
    ["detail", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find(|value| is_truthy(value))
        .cloned()
        .unwrap_or_else(|| Value::String(response.status_text()))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Async client for the chats, folders, courses and labs API.
#[derive(Clone)]
pub struct ApiClient<T = HttpTransport> {
    base_url: String,
    token: Option<String>,
    course_api: CourseApi,
    time_range: Arc<dyn TimeRangeLabeler>,
    transport: T,
}

impl ApiClient<HttpTransport> {
    /// Client with default configuration pointed at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self::from_config(ClientConfig::new(base_url))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            course_api: config.course_api,
            time_range: Arc::new(CalendarTimeRange),
            transport,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_course_api(mut self, course_api: CourseApi) -> Self {
        self.course_api = course_api;
        self
    }

    /// Replace the labeller used for `time_range` enrichment.
    pub fn with_time_range(mut self, labeler: impl TimeRangeLabeler + 'static) -> Self {
        self.time_range = Arc::new(labeler);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn course_api(&self) -> CourseApi {
        self.course_api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn headers(&self, auth: AuthPolicy) -> Vec<(String, String)> {
        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ];
        let token = self.token.as_deref().unwrap_or("");
        if auth == AuthPolicy::Always || !token.is_empty() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }

    /// Bodiless request. `path` already carries any query string.
    pub(crate) fn request(&self, method: HttpMethod, path: &str, auth: AuthPolicy) -> HttpRequest {
        HttpRequest {
            method,
            path: self.url(path),
            headers: self.headers(auth),
            body: None,
        }
    }

    pub(crate) fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        auth: AuthPolicy,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut request = self.request(method, path, auth);
        request.body = Some(body);
        Ok(request)
    }

    /// Execute one request. Transport failures are logged and surfaced as
    /// `ApiError::Transport` without looking for a body.
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        self.transport.execute(request).await.map_err(|err| {
            error!(error = %err, "request did not complete");
            ApiError::Transport(err)
        })
    }

    /// Apply the shared status contract and decode the body as JSON.
    pub(crate) fn read_json(
        &self,
        response: HttpResponse,
        errors: ErrorValue,
        body: BodyPolicy,
    ) -> Result<Value, ApiError> {
        if !response.is_success() {
            let parsed = serde_json::from_str(&response.body).unwrap_or_else(|_| json!({}));
            let value = errors.extract(&parsed, &response);
            error!(status = response.status, error = %value, "request failed");
            return Err(ApiError::Status {
                status: response.status,
                error: value,
            });
        }

        match serde_json::from_str(&response.body) {
            Ok(value) => Ok(value),
            Err(_) if body == BodyPolicy::Lenient => Ok(json!({})),
            Err(e) => {
                error!(status = response.status, error = %e, "response body is not valid JSON");
                Err(ApiError::Decode(e.to_string()))
            }
        }
    }

    /// Decode a JSON array, keeping each element as-is.
    pub(crate) fn expect_array(&self, value: Value) -> Result<Vec<Value>, ApiError> {
        match value {
            Value::Array(items) => Ok(items),
            other => {
                let err = ApiError::Decode(format!("expected a JSON array, got {}", kind(&other)));
                error!(error = %err, "unexpected response shape");
                Err(err)
            }
        }
    }

    /// Copy of each chat with a `time_range` label derived from `updated_at`.
    pub(crate) fn with_time_ranges(&self, value: Value) -> Result<Vec<Value>, ApiError> {
        let chats = self.expect_array(value)?;
        Ok(chats
            .into_iter()
            .map(|mut chat| {
                if let Value::Object(fields) = &mut chat {
                    let label = fields
                        .get("updated_at")
                        .and_then(|ts| ts.as_i64().or_else(|| ts.as_f64().map(|f| f as i64)))
                        .map(|ts| Value::String(self.time_range.label(ts)))
                        .unwrap_or(Value::Null);
                    fields.insert("time_range".to_string(), label);
                }
                chat
            })
            .collect())
    }
}

impl<T> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("course_api", &self.course_api)
            .finish_non_exhaustive()
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
