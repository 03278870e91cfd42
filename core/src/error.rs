//! Error types for the API client.
//!
//! # Design
//! Three failure kinds reach callers: the request never completed
//! (`Transport`), the server answered with a non-success status (`Status`),
//! or a success body could not be decoded (`Decode`). `Status` carries the
//! error value extracted from the body, which differs per endpoint (see
//! `ErrorValue`), so it is kept as raw JSON rather than a string.

use serde_json::Value;
use thiserror::Error;

use crate::http::TransportError;

/// Errors returned by `ApiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("{0}")]
    Transport(TransportError),

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {}", display_value(.error))]
    Status { status: u16, error: Value },

    /// The response body could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The normalized failure value: the extracted status error, or the
    /// transport message as a JSON string.
    pub fn error_value(&self) -> Value {
        match self {
            ApiError::Transport(err) => Value::String(err.message.clone()),
            ApiError::Status { error, .. } => error.clone(),
            ApiError::Decode(msg) | ApiError::Serialization(msg) => Value::String(msg.clone()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
