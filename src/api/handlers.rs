//! API handlers
//!
//! Each handler decodes its request, runs one storage operation and wraps
//! the outcome in an `Envelope`. Logical failures are reported inside the
//! envelope with status 200.

use axum::body::{Body, Bytes};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::stream;
use log::warn;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use tokio::fs;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::api::envelope::{Done, Envelope, FileContent, FileList, PutDone, Uploaded};
use crate::api::requests::{
    MkdirRequest, PathQuery, RenameRequest, SaveRequest, UPLOAD_FILE_FIELDS, UPLOAD_PATH_FIELD,
};
use crate::api::state::AppState;
use crate::error::StorageError;
use crate::error::handlers::{error_to_status, handle_error};
use crate::storage;

const PUT_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// GET /api/files?path=
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Envelope<FileList> {
    let result = storage::list_directory(&state.root, &query.path)
        .await
        .map(|files| FileList { files });
    Envelope::from_result("list", result)
}

/// POST /api/upload (multipart)
pub async fn upload_files(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Envelope<Uploaded> {
    let result = match multipart {
        Ok(multipart) => receive_uploads(&state, multipart).await,
        Err(rejection) => Err(StorageError::MalformedRequest(rejection.body_text())),
    };
    Envelope::from_result("upload", result)
}

/// Streams file parts to disk in arrival order. The first `path` field sets
/// the target directory for every file in the request; parts that arrive
/// before it are held in memory until it is known, and go to the root when
/// the request carries no `path` at all. The first failing file stops the
/// upload; files already stored stay on disk.
async fn receive_uploads(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<Uploaded, StorageError> {
    let mut target_dir: Option<String> = None;
    let mut held: Vec<(String, Bytes)> = Vec::new();
    let mut paths = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StorageError::MalformedRequest(e.body_text()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        if field_name == UPLOAD_PATH_FIELD {
            let dir = field
                .text()
                .await
                .map_err(|e| StorageError::MalformedRequest(e.body_text()))?;
            if target_dir.is_none() {
                store_held(state, &dir, std::mem::take(&mut held), &mut paths).await?;
                target_dir = Some(dir);
            }
            continue;
        }

        if !UPLOAD_FILE_FIELDS.contains(&field_name.as_str()) {
            continue;
        }

        // Empty file inputs arrive with an empty file name
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let Some(dir) = target_dir.as_deref() else {
            let data = field
                .bytes()
                .await
                .map_err(|e| StorageError::MalformedRequest(e.body_text()))?;
            held.push((file_name, data));
            continue;
        };

        let stored = storage::store_upload(
            &state.root,
            state.placement.as_ref(),
            dir,
            &file_name,
            field,
        )
        .await?;
        paths.push(stored.relative_path);
    }

    if target_dir.is_none() {
        store_held(state, "", held, &mut paths).await?;
    }

    let Some(path) = paths.last().cloned() else {
        return Err(StorageError::NoFilesUploaded);
    };
    Ok(Uploaded { path, paths })
}

async fn store_held(
    state: &AppState,
    target_dir: &str,
    held: Vec<(String, Bytes)>,
    paths: &mut Vec<String>,
) -> Result<(), StorageError> {
    for (file_name, data) in held {
        let body = stream::iter([Ok::<_, Infallible>(data)]);
        let stored = storage::store_upload(
            &state.root,
            state.placement.as_ref(),
            target_dir,
            &file_name,
            body,
        )
        .await?;
        paths.push(stored.relative_path);
    }
    Ok(())
}

/// PUT|POST /api/put?path= (raw body)
pub async fn put_raw_file(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
    body: Body,
) -> Envelope<PutDone> {
    let result = storage::put_file(
        &state.root,
        &query.path,
        body.into_data_stream(),
        state.max_upload_bytes,
    )
    .await
    .map(|stored| PutDone {
        path: stored.relative_path,
        message: PUT_SUCCESS_MESSAGE,
    });
    Envelope::from_result("put", result)
}

/// POST /api/mkdir {path, name}
pub async fn make_directory(State(state): State<AppState>, body: Bytes) -> Envelope<Done> {
    let result = match parse_json::<MkdirRequest>(&body) {
        Ok(req) => storage::create_directory(&state.root, &req.path, &req.name)
            .await
            .map(|_| Done {}),
        Err(e) => Err(e),
    };
    Envelope::from_result("mkdir", result)
}

/// POST /api/rename {oldPath, newName}
pub async fn rename_file(State(state): State<AppState>, body: Bytes) -> Envelope<Done> {
    let result = match parse_json::<RenameRequest>(&body) {
        Ok(req) => storage::rename_entry(&state.root, &req.old_path, &req.new_name)
            .await
            .map(|_| Done {}),
        Err(e) => Err(e),
    };
    Envelope::from_result("rename", result)
}

/// GET /api/read?path=
pub async fn read_file(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Envelope<FileContent> {
    let result = storage::read_text_file(&state.root, &query.path)
        .await
        .map(|content| FileContent { content });
    Envelope::from_result("read", result)
}

/// POST /api/save {path, content}
pub async fn save_file(State(state): State<AppState>, body: Bytes) -> Envelope<Done> {
    let result = match parse_json::<SaveRequest>(&body) {
        Ok(req) => storage::save_text_file(&state.root, &req.path, &req.content)
            .await
            .map(|_| Done {}),
        Err(e) => Err(e),
    };
    Envelope::from_result("save", result)
}

/// GET /files/{*path}
///
/// Raw bytes with range and content-type handling. Failures here are plain
/// HTTP errors rather than envelopes, since browsers consume this directly.
pub async fn serve_file(
    State(state): State<AppState>,
    Path(relative): Path<String>,
    request: Request,
) -> Response {
    let path = match state.root.resolve(&relative) {
        Ok(path) => path,
        Err(e) => {
            let err = StorageError::from(e);
            handle_error("download", &err);
            return (error_to_status(&err), err.to_string()).into_response();
        }
    };

    if fs::metadata(&path).await.is_ok_and(|meta| meta.is_dir()) {
        warn!("download: {} is a directory", path.display());
        return (StatusCode::NOT_FOUND, "Not a file").into_response();
    }

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

// Bodies are decoded regardless of Content-Type.
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, StorageError> {
    serde_json::from_slice(body).map_err(|e| StorageError::MalformedRequest(e.to_string()))
}
