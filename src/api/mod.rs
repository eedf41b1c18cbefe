//! HTTP API
//!
//! Decodes requests into file operations and encodes results as JSON
//! envelopes.

pub mod envelope;
pub mod handlers;
pub mod pages;
pub mod requests;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::middleware::logging::log_request;

pub use envelope::Envelope;
pub use state::AppState;

/// Build the router serving the pages, the JSON API and raw downloads.
pub fn router(state: AppState) -> Router {
    let body_limit = match state.max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(usize::try_from(max).unwrap_or(usize::MAX)),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(pages::index_page))
        .route("/editor", get(pages::editor_page))
        .route("/api/files", get(handlers::list_files))
        .route("/api/upload", post(handlers::upload_files))
        .route(
            "/api/put",
            put(handlers::put_raw_file).post(handlers::put_raw_file),
        )
        .route("/api/mkdir", post(handlers::make_directory))
        .route("/api/rename", post(handlers::rename_file))
        .route("/api/read", get(handlers::read_file))
        .route("/api/save", post(handlers::save_file))
        .route("/files/{*path}", get(handlers::serve_file))
        .layer(body_limit)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
