//! File system storage management
//!
//! Path confinement and the file operations built on it.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod upload;
pub mod validation;

pub use operations::{
    create_directory, list_directory, put_file, read_text_file, rename_entry, save_text_file,
};
pub use results::{FileEntry, StoredFile};
pub use upload::{
    Placement, TimestampedAssetBucket, UploadPlacement, UploadPolicy, VerbatimTargetDirectory,
    store_upload,
};
pub use validation::ServedRoot;
