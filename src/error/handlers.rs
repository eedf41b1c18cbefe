//! Error handlers
//!
//! Logs operation failures and maps them to HTTP status codes.

use axum::http::StatusCode;
use log::{error, warn};

use crate::error::types::StorageError;

/// Log a failed file operation at a level matching its cause.
pub fn handle_error(operation: &str, err: &StorageError) {
    if err.is_confinement() {
        warn!("{} rejected: path escapes served root", operation);
    } else if err.is_validation() {
        warn!("{} rejected: {}", operation, err);
    } else {
        error!("{} failed: {}", operation, err);
    }
}

/// Status code used when an error is reported outside the JSON envelope.
pub fn error_to_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::InvalidPath | StorageError::InvalidNewName => StatusCode::BAD_REQUEST,
        StorageError::MissingParameter(_)
        | StorageError::MalformedRequest(_)
        | StorageError::NoFilesUploaded
        | StorageError::NotText(_)
        | StorageError::BodyRead(_) => StatusCode::BAD_REQUEST,
        StorageError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        StorageError::IoError(e) => match e.kind() {
            std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            std::io::ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}
