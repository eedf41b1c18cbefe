//! File system helpers
//!
//! Low-level async helpers shared by the file operations.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::StorageError;

/// Create every missing directory above `path`.
pub async fn ensure_parent_dir(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Stream `body` into `file` chunk by chunk.
///
/// Returns the number of bytes written. When `limit` is set and the body
/// grows past it, writing stops with `StorageError::TooLarge`; the caller
/// decides what to do with the partial file.
pub async fn write_stream<S, E>(
    file: &mut File,
    body: S,
    limit: Option<u64>,
) -> Result<u64, StorageError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let mut body = std::pin::pin!(body);
    let mut total_bytes = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| StorageError::BodyRead(e.to_string()))?;
        if chunk.is_empty() {
            continue;
        }

        // Check the limit before writing (fail fast)
        total_bytes += chunk.len() as u64;
        if let Some(max) = limit {
            if total_bytes > max {
                return Err(StorageError::TooLarge(max));
            }
        }

        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(total_bytes)
}
