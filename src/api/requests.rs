//! Request payloads
//!
//! Query strings and JSON bodies accepted by the API.

use serde::Deserialize;

/// `?path=` query. A missing parameter is the empty string.
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct MkdirRequest {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    #[serde(default)]
    pub old_path: String,
    #[serde(default)]
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: String,
}

/// Multipart field carrying the target directory
pub const UPLOAD_PATH_FIELD: &str = "path";

/// Multipart field names carrying files
pub const UPLOAD_FILE_FIELDS: &[&str] = &["files", "files[]"];
