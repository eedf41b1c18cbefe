//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    /// Relative to the served root, `/`-separated
    pub path: String,
    pub size: u64,
    pub is_dir: bool,
    /// Unix seconds, 0 when the platform has no modification time
    pub mod_time: i64,
}

/// Result of streaming a request body into a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub relative_path: String,
    pub bytes_written: u64,
}
