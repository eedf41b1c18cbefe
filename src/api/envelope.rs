//! JSON response envelope
//!
//! Every API response is `{"success": true, ...payload}` or
//! `{"success": false, "error": "..."}`, sent with status 200.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::{Serialize, Serializer};

use crate::error::StorageError;
use crate::error::handlers::handle_error;
use crate::storage::FileEntry;

/// Outcome of one API operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure(String),
}

impl<T> Envelope<T> {
    /// Convert an operation result, logging the failure under `operation`.
    pub fn from_result(operation: &str, result: Result<T, StorageError>) -> Self {
        match result {
            Ok(payload) => Envelope::Success(payload),
            Err(err) => {
                handle_error(operation, &err);
                Envelope::Failure(err.to_string())
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }
}

#[derive(Serialize)]
struct SuccessBody<'a, T> {
    success: bool,
    #[serde(flatten)]
    payload: &'a T,
}

#[derive(Serialize)]
struct FailureBody<'a> {
    success: bool,
    error: &'a str,
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Envelope::Success(payload) => SuccessBody {
                success: true,
                payload,
            }
            .serialize(serializer),
            Envelope::Failure(error) => FailureBody {
                success: false,
                error,
            }
            .serialize(serializer),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Payload for operations that only report success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Done {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileList {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub content: String,
}

/// Multipart upload result. `path` is the last file stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Uploaded {
    pub path: String,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutDone {
    pub path: String,
    pub message: &'static str,
}
