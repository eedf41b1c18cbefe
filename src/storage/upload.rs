//! Upload placement
//!
//! Decides where each uploaded file lands. Two policies exist and they are
//! not interchangeable: `VerbatimTargetDirectory` honours the requested
//! directory and file name, `TimestampedAssetBucket` diverts images into a
//! fixed bucket under a time-derived name.

use bytes::Bytes;
use chrono::{DateTime, Local};
use futures_util::Stream;
use log::info;
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;

use crate::error::StorageError;
use crate::storage::filesystem::{ensure_parent_dir, write_stream};
use crate::storage::results::StoredFile;
use crate::storage::validation::ServedRoot;

/// Extensions treated as images by the asset bucket, lowercase with dot.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg"];

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Configured upload placement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UploadPolicy {
    /// Every file goes to the requested directory under its own name
    #[default]
    Verbatim,
    /// Images go to the asset bucket with a timestamp name
    Timestamped,
}

impl UploadPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadPolicy::Verbatim => "verbatim",
            UploadPolicy::Timestamped => "timestamped",
        }
    }

    /// Build the placement strategy for this policy.
    pub fn placement(self, asset_dir: &str) -> Arc<dyn UploadPlacement> {
        match self {
            UploadPolicy::Verbatim => Arc::new(VerbatimTargetDirectory),
            UploadPolicy::Timestamped => Arc::new(TimestampedAssetBucket::new(asset_dir)),
        }
    }
}

/// Where a single uploaded file will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub absolute: PathBuf,
    pub relative: String,
    /// Create missing parent directories before writing
    pub create_parent: bool,
}

/// Maps a requested directory and client file name to a destination.
pub trait UploadPlacement: Send + Sync {
    fn place(
        &self,
        root: &ServedRoot,
        target_dir: &str,
        file_name: &str,
    ) -> Result<Placement, StorageError>;
}

/// All files land in the requested directory under the client's file name.
///
/// The directory must already exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerbatimTargetDirectory;

impl UploadPlacement for VerbatimTargetDirectory {
    fn place(
        &self,
        root: &ServedRoot,
        target_dir: &str,
        file_name: &str,
    ) -> Result<Placement, StorageError> {
        // Confine the full destination, not just the directory, so a file
        // name such as "../x" cannot climb out.
        root.resolve(target_dir)?;
        let absolute = root.resolve(&format!("{}/{}", target_dir, file_name))?;
        Ok(Placement {
            relative: root.relative_of(&absolute),
            absolute,
            create_parent: false,
        })
    }
}

/// Images go to `<root>/<bucket>/YYYYMMDD_HHMMSS.<ext>`; other files are
/// placed verbatim.
///
/// Two images stored within the same second overwrite each other.
#[derive(Debug, Clone)]
pub struct TimestampedAssetBucket {
    bucket: String,
}

impl TimestampedAssetBucket {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    /// Placement for a file received at `now`.
    fn place_at(
        &self,
        root: &ServedRoot,
        target_dir: &str,
        file_name: &str,
        now: DateTime<Local>,
    ) -> Result<Placement, StorageError> {
        let Some(ext) = image_extension(file_name) else {
            return VerbatimTargetDirectory.place(root, target_dir, file_name);
        };

        let name = format!("{}{}", now.format(TIMESTAMP_FORMAT), ext);
        let absolute = root.resolve(&format!("{}/{}", self.bucket, name))?;
        Ok(Placement {
            relative: root.relative_of(&absolute),
            absolute,
            create_parent: true,
        })
    }
}

impl UploadPlacement for TimestampedAssetBucket {
    fn place(
        &self,
        root: &ServedRoot,
        target_dir: &str,
        file_name: &str,
    ) -> Result<Placement, StorageError> {
        self.place_at(root, target_dir, file_name, Local::now())
    }
}

/// Lowercase extension with leading dot, if it names an image type.
pub fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_string_lossy().to_lowercase();
    let ext = format!(".{}", ext);
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Streams one uploaded file to the destination chosen by `placement`.
pub async fn store_upload<S, E>(
    root: &ServedRoot,
    placement: &dyn UploadPlacement,
    target_dir: &str,
    file_name: &str,
    body: S,
) -> Result<StoredFile, StorageError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let placement = placement.place(root, target_dir, file_name)?;
    if placement.create_parent {
        ensure_parent_dir(&placement.absolute).await?;
    }

    let mut file = File::create(&placement.absolute).await?;
    let bytes_written = write_stream(&mut file, body, None).await?;

    info!(
        "Uploaded {} -> {} ({} bytes)",
        file_name,
        placement.absolute.display(),
        bytes_written
    );

    Ok(StoredFile {
        relative_path: placement.relative,
        bytes_written,
    })
}
