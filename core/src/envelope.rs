//! Decoding for list responses that may or may not be wrapped in an object.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Wrapper keys probed, in priority order, when a list arrives inside an
/// object.
pub const ENVELOPE_KEYS: [&str; 5] = ["courses", "labs", "items", "data", "results"];

/// A list body as the server may send it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListBody {
    Bare(Vec<Value>),
    Envelope(Map<String, Value>),
    Other(Value),
}

impl ListBody {
    /// The bare array, the first array-valued wrapper key, or an empty list.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            ListBody::Bare(items) => items,
            ListBody::Envelope(mut fields) => ENVELOPE_KEYS
                .iter()
                .find(|key| fields.get(**key).is_some_and(Value::is_array))
                .and_then(|key| fields.remove(*key))
                .and_then(|value| match value {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .unwrap_or_default(),
            ListBody::Other(_) => Vec::new(),
        }
    }
}

impl From<Value> for ListBody {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ListBody::Bare(items),
            Value::Object(fields) => ListBody::Envelope(fields),
            other => ListBody::Other(other),
        }
    }
}

/// Envelope-tolerant list decode.
pub fn list_items(value: Value) -> Vec<Value> {
    ListBody::from(value).into_items()
}
