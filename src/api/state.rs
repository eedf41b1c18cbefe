//! Shared application state
//!
//! Built once at startup and cloned into every request. All fields are
//! read-only for the life of the process.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::{ServedRoot, UploadPlacement};

#[derive(Clone)]
pub struct AppState {
    pub root: Arc<ServedRoot>,
    pub placement: Arc<dyn UploadPlacement>,
    /// Body ceiling for uploads and raw puts
    pub max_upload_bytes: Option<u64>,
}

impl AppState {
    pub fn new(
        root: ServedRoot,
        placement: Arc<dyn UploadPlacement>,
        max_upload_bytes: Option<u64>,
    ) -> Self {
        Self {
            root: Arc::new(root),
            placement,
            max_upload_bytes,
        }
    }

    pub fn from_config(root: ServedRoot, config: &ServerConfig) -> Self {
        Self::new(
            root,
            config.upload_policy.placement(&config.asset_dir),
            config.max_upload_bytes(),
        )
    }
}
