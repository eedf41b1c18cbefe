//! Storage operations
//!
//! File operations exposed to clients: list, create directory, rename, read,
//! save and raw-body put. Every path argument is confined to the served root
//! before the filesystem is touched.

use bytes::Bytes;
use futures_util::Stream;
use log::{error, info, warn};
use std::fmt::Display;
use std::time::UNIX_EPOCH;
use tokio::fs::{self, File};

use crate::error::StorageError;
use crate::storage::filesystem::{ensure_parent_dir, write_stream};
use crate::storage::results::{FileEntry, StoredFile};
use crate::storage::validation::ServedRoot;

/// Lists the immediate children of a directory, in platform order.
pub async fn list_directory(
    root: &ServedRoot,
    relative: &str,
) -> Result<Vec<FileEntry>, StorageError> {
    let dir = root.resolve(relative)?;
    let base = root.relative_of(&dir);

    let mut entries = fs::read_dir(&dir).await.map_err(|e| {
        error!("Failed to list directory {} (real: {}): {}", relative, dir.display(), e);
        e
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();

        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping {} in {}: {}", name, dir.display(), e);
                continue;
            }
        };

        let mod_time = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|dur| dur.as_secs() as i64)
            .unwrap_or(0);

        let path = if base.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", base, name)
        };

        files.push(FileEntry {
            name,
            path,
            size: metadata.len(),
            is_dir: metadata.is_dir(),
            mod_time,
        });
    }

    info!(
        "Listed directory {} (real: {}) - {} entries",
        relative,
        dir.display(),
        files.len()
    );

    Ok(files)
}

/// Creates `name` under `parent`, including any missing ancestors.
///
/// Succeeds if the directory already exists.
pub async fn create_directory(
    root: &ServedRoot,
    parent: &str,
    name: &str,
) -> Result<(), StorageError> {
    let target = root.resolve(&join_relative(parent, name))?;
    fs::create_dir_all(&target).await?;

    info!("Created directory {}", target.display());
    Ok(())
}

/// Renames an entry in place, keeping it in its current parent directory.
pub async fn rename_entry(
    root: &ServedRoot,
    old_relative: &str,
    new_name: &str,
) -> Result<(), StorageError> {
    let old_path = root.resolve(old_relative)?;
    let new_path = root
        .resolve_sibling(&old_path, new_name)
        .map_err(|_| StorageError::InvalidNewName)?;

    fs::rename(&old_path, &new_path).await?;

    info!("Renamed {} -> {}", old_path.display(), new_path.display());
    Ok(())
}

/// Reads a whole file as UTF-8 text.
pub async fn read_text_file(root: &ServedRoot, relative: &str) -> Result<String, StorageError> {
    let path = root.resolve(relative)?;
    let bytes = fs::read(&path).await?;
    let content =
        String::from_utf8(bytes).map_err(|_| StorageError::NotText(relative.to_string()))?;

    info!("Read {} ({} bytes)", path.display(), content.len());
    Ok(content)
}

/// Overwrites a file with `content`, creating parent directories first.
pub async fn save_text_file(
    root: &ServedRoot,
    relative: &str,
    content: &str,
) -> Result<(), StorageError> {
    let path = root.resolve(relative)?;
    ensure_parent_dir(&path).await?;
    fs::write(&path, content).await?;

    info!("Saved {} ({} bytes)", path.display(), content.len());
    Ok(())
}

/// Streams a raw request body into `relative`, truncating any existing file.
///
/// A body larger than `limit` is rejected and the partial file removed. A
/// body that fails mid-stream leaves whatever was written in place.
pub async fn put_file<S, E>(
    root: &ServedRoot,
    relative: &str,
    body: S,
    limit: Option<u64>,
) -> Result<StoredFile, StorageError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    if relative.is_empty() {
        return Err(StorageError::MissingParameter("path"));
    }

    let path = root.resolve(relative)?;
    ensure_parent_dir(&path).await?;
    let mut file = File::create(&path).await?;

    let bytes_written = match write_stream(&mut file, body, limit).await {
        Ok(n) => n,
        Err(StorageError::TooLarge(max)) => {
            drop(file);
            if let Err(e) = fs::remove_file(&path).await {
                warn!("Failed to remove oversized upload {}: {}", path.display(), e);
            }
            return Err(StorageError::TooLarge(max));
        }
        Err(e) => return Err(e),
    };

    info!("Stored {} ({} bytes)", path.display(), bytes_written);

    Ok(StoredFile {
        relative_path: relative.to_string(),
        bytes_written,
    })
}

fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}
