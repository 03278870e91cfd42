//! Wire DTOs for the chats, folders, courses and labs API.
//!
//! # Design
//! The server owns every entity; these types only describe what travels on
//! the wire. Field names are the server's snake_case names. Optional request
//! fields are skipped when unset so partial updates only carry what changed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Scope a chat or folder lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    General,
    Lab,
    Channel,
}

impl ContextType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextType::General => "general",
            ContextType::Lab => "lab",
            ContextType::Channel => "channel",
        }
    }
}

/// Scoping parameters narrowing a query to a course, a lab or the general
/// scope. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_type: Option<ContextType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
}

impl ChatContext {
    pub fn general() -> Self {
        Self {
            context_type: Some(ContextType::General),
            ..Self::default()
        }
    }

    pub fn course(course_id: impl Into<String>) -> Self {
        Self {
            context_type: Some(ContextType::Channel),
            course_id: Some(course_id.into()),
            lab_id: None,
        }
    }

    pub fn lab(course_id: Option<String>, lab_id: impl Into<String>) -> Self {
        Self {
            context_type: Some(ContextType::Lab),
            course_id,
            lab_id: Some(lab_id.into()),
        }
    }

    /// Present fields in wire order: `context_type`, `course_id`, `lab_id`.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(3);
        if let Some(context_type) = self.context_type {
            fields.push(("context_type", context_type.as_str().to_string()));
        }
        if let Some(course_id) = &self.course_id {
            fields.push(("course_id", course_id.clone()));
        }
        if let Some(lab_id) = &self.lab_id {
            fields.push(("lab_id", lab_id.clone()));
        }
        fields
    }

    /// Merge the present fields into a JSON object body.
    pub fn merge_into(&self, body: &mut Map<String, Value>) {
        for (key, value) in self.fields() {
            body.insert(key.to_string(), Value::String(value));
        }
    }
}

/// A chat as returned by the chat endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_type: Option<ContextType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
}

/// Narrowed projection returned by `ApiClient::get_chat_list`. Decoding
/// ignores every other field the server sends. The five copied fields keep
/// whatever JSON the server put there, `null` included, and are left out on
/// re-encoding when the server omitted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatListItem {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub chat_folder_id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Value>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_pinned: bool,
}

impl ChatListItem {
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_ref().and_then(Value::as_str)
    }

    pub fn title_str(&self) -> Option<&str> {
        self.title.as_ref().and_then(Value::as_str)
    }
}

/// Payload for `ApiClient::import_chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportChat {
    pub chat: Value,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Chat and file ids held by a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderItems {
    #[serde(default)]
    pub chat_ids: Vec<String>,
    #[serde(default)]
    pub file_ids: Vec<String>,
}

/// A folder as returned by the folder endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub items: Option<FolderItems>,
    #[serde(default)]
    pub context_type: Option<ContextType>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub lab_id: Option<String>,
}

/// Create or update payload for a folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_type: Option<ContextType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseForm {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Partial course update. Only the fields present are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub id: String,
    pub course_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabForm {
    pub course_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

fn enabled_by_default() -> bool {
    true
}

// A field that appears on the wire, even as `null`, is `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
