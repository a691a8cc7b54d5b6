//! Box Content API payloads
//!
//! Request bodies and the subset of response fields the connector reads.

use serde::{Deserialize, Serialize};

/// Reference to a parent folder
#[derive(Debug, Clone, Serialize)]
pub struct ParentRef<'a> {
    pub id: &'a str,
}

/// Body of `POST /folders`, also the `attributes` part of a new upload
#[derive(Debug, Clone, Serialize)]
pub struct NewItemRequest<'a> {
    pub name: &'a str,
    pub parent: ParentRef<'a>,
}

/// `attributes` part of a content replacement upload
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceAttributes<'a> {
    pub name: &'a str,
}

/// Folder or file object as returned by Box
#[derive(Debug, Clone, Deserialize)]
pub struct BoxItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of the upload endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub total_count: Option<u64>,
    pub entries: Vec<BoxItem>,
}

/// Box error object
///
/// See: https://developer.box.com/reference/resources/client-error/
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub context_info: Option<ContextInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextInfo {
    #[serde(default)]
    pub conflicts: Option<Conflicts>,
}

/// Uploads report a single conflicting item, folder creation an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Conflicts {
    Single(ConflictItem),
    Many(Vec<ConflictItem>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConflictItem {
    pub id: String,
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ApiErrorBody {
    /// Identifier of the first conflicting item, if the body names one
    pub fn conflicting_id(&self) -> Option<&str> {
        match self.context_info.as_ref()?.conflicts.as_ref()? {
            Conflicts::Single(item) => Some(item.id.as_str()),
            Conflicts::Many(items) => items.first().map(|item| item.id.as_str()),
        }
    }
}
