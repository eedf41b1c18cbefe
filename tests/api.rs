use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use lanshare::api::{self, AppState};
use lanshare::storage::{ServedRoot, UploadPolicy};

const BOUNDARY: &str = "----lanshare-test-boundary";

fn make_app(policy: UploadPolicy, limit: Option<u64>) -> (TempDir, Router) {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = ServedRoot::new(temp.path()).expect("served root");
    let state = AppState::new(root, policy.placement("assert"), limit);
    (temp, api::router(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> Value {
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).expect("json envelope")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

enum Part<'a> {
    Path(&'a str),
    File(&'a str, &'a str, &'a str),
}

fn multipart(path: Option<&str>, files: &[(&str, &str)]) -> Request<Body> {
    let mut parts: Vec<Part> = path.map(Part::Path).into_iter().collect();
    parts.extend(files.iter().map(|(name, content)| Part::File("files", *name, *content)));
    multipart_parts(&parts)
}

fn multipart_parts(parts: &[Part]) -> Request<Body> {
    let mut body = String::new();
    for part in parts {
        match part {
            Part::Path(path) => body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"path\"\r\n\r\n{path}\r\n"
            )),
            Part::File(field, name, content) => body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n{content}\r\n"
            )),
        }
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn names(listing: &Value) -> Vec<String> {
    let mut names: Vec<String> = listing["files"]
        .as_array()
        .expect("files array")
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn list_outside_root_is_invalid_path() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    let envelope = send_json(&app, get("/api/files?path=../../etc")).await;
    assert_eq!(envelope, json!({"success": false, "error": "Invalid path"}));
}

#[tokio::test]
async fn mkdir_then_list_shows_directory() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);

    let created = send_json(&app, post_json("/api/mkdir", json!({"path": "a", "name": "b"}))).await;
    assert_eq!(created, json!({"success": true}));

    let listing = send_json(&app, get("/api/files?path=a")).await;
    assert_eq!(listing["success"], true);
    let files = listing["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "b");
    assert_eq!(files[0]["path"], "a/b");
    assert_eq!(files[0]["isDir"], true);
}

#[tokio::test]
async fn mkdir_twice_succeeds() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    for _ in 0..2 {
        let envelope =
            send_json(&app, post_json("/api/mkdir", json!({"path": "", "name": "x/y"}))).await;
        assert_eq!(envelope["success"], true);
    }
    assert!(temp.path().join("x/y").is_dir());
}

#[tokio::test]
async fn list_empty_directory() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    std::fs::create_dir(temp.path().join("empty")).unwrap();
    let envelope = send_json(&app, get("/api/files?path=empty")).await;
    assert_eq!(envelope, json!({"success": true, "files": []}));
}

#[tokio::test]
async fn list_missing_directory_reports_error() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    let envelope = send_json(&app, get("/api/files?path=nope")).await;
    assert_eq!(envelope["success"], false);
    assert!(!envelope["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn rename_replaces_entry_in_listing() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    std::fs::create_dir(temp.path().join("dir")).unwrap();
    std::fs::write(temp.path().join("dir/old.txt"), "x").unwrap();

    let renamed = send_json(
        &app,
        post_json("/api/rename", json!({"oldPath": "dir/old.txt", "newName": "new.txt"})),
    )
    .await;
    assert_eq!(renamed, json!({"success": true}));

    let listing = send_json(&app, get("/api/files?path=dir")).await;
    assert_eq!(names(&listing), vec!["new.txt"]);
}

#[tokio::test]
async fn rename_target_outside_root_is_rejected() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    std::fs::write(temp.path().join("old.txt"), "x").unwrap();

    let envelope = send_json(
        &app,
        post_json("/api/rename", json!({"oldPath": "old.txt", "newName": "../stolen.txt"})),
    )
    .await;
    assert_eq!(envelope, json!({"success": false, "error": "Invalid new name"}));
    assert!(temp.path().join("old.txt").exists());
}

#[tokio::test]
async fn save_then_read_round_trips() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    for content in ["", "plain", "multi\nline\n", "emoji 🎉"] {
        let saved = send_json(
            &app,
            post_json("/api/save", json!({"path": "notes/n.txt", "content": content})),
        )
        .await;
        assert_eq!(saved, json!({"success": true}));

        let read = send_json(&app, get("/api/read?path=notes/n.txt")).await;
        assert_eq!(read, json!({"success": true, "content": content}));
    }
}

#[tokio::test]
async fn save_with_malformed_body_reports_error() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/save")
        .body(Body::from("{\"path\": "))
        .unwrap();
    let envelope = send_json(&app, request).await;
    assert_eq!(envelope["success"], false);
}

#[tokio::test]
async fn put_without_path_fails_before_io() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/put")
        .body(Body::from("data"))
        .unwrap();
    let envelope = send_json(&app, request).await;
    assert_eq!(envelope, json!({"success": false, "error": "Missing path parameter"}));
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn put_then_download() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    for method in [Method::PUT, Method::POST] {
        let request = Request::builder()
            .method(method)
            .uri("/api/put?path=dl/hello.txt")
            .body(Body::from("hello world"))
            .unwrap();
        let envelope = send_json(&app, request).await;
        assert_eq!(
            envelope,
            json!({"success": true, "path": "dl/hello.txt", "message": "File uploaded successfully"})
        );
    }

    let (status, body) = send(&app, get("/files/dl/hello.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"hello world");

    let ranged = Request::builder()
        .uri("/files/dl/hello.txt")
        .header(header::RANGE, "bytes=0-4")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, ranged).await;
    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(body, b"hello");
}

#[tokio::test]
async fn put_over_limit_is_rejected() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, Some(4));
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/put?path=big.bin")
        .body(Body::from("0123456789"))
        .unwrap();
    let envelope = send_json(&app, request).await;
    assert_eq!(envelope["success"], false);
    assert!(!temp.path().join("big.bin").exists());
}

#[tokio::test]
async fn download_outside_root_is_bad_request() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    let (status, _) = send(&app, get("/files/..%2F..%2Fetc%2Fpasswd")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_missing_file_is_not_found() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    let (status, _) = send(&app, get("/files/missing.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_directory_is_not_found() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    std::fs::create_dir(temp.path().join("docs")).unwrap();
    let (status, _) = send(&app, get("/files/docs")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_verbatim_into_target_directory() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    std::fs::create_dir(temp.path().join("docs")).unwrap();

    let envelope = send_json(
        &app,
        multipart(Some("docs"), &[("a.txt", "alpha"), ("photo.png", "png-bytes")]),
    )
    .await;
    assert_eq!(
        envelope,
        json!({"success": true, "path": "docs/photo.png", "paths": ["docs/a.txt", "docs/photo.png"]})
    );
    assert_eq!(std::fs::read(temp.path().join("docs/a.txt")).unwrap(), b"alpha");
    assert_eq!(std::fs::read(temp.path().join("docs/photo.png")).unwrap(), b"png-bytes");
}

#[tokio::test]
async fn upload_path_after_files_still_targets_directory() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    std::fs::create_dir(temp.path().join("docs")).unwrap();

    let envelope = send_json(
        &app,
        multipart_parts(&[
            Part::File("files", "a.txt", "alpha"),
            Part::Path("docs"),
            Part::File("files", "b.txt", "beta"),
        ]),
    )
    .await;
    assert_eq!(
        envelope,
        json!({"success": true, "path": "docs/b.txt", "paths": ["docs/a.txt", "docs/b.txt"]})
    );
    assert_eq!(std::fs::read(temp.path().join("docs/a.txt")).unwrap(), b"alpha");
    assert!(!temp.path().join("a.txt").exists());
}

#[tokio::test]
async fn upload_without_path_field_targets_root() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    let envelope = send_json(&app, multipart(None, &[("top.txt", "top")])).await;
    assert_eq!(
        envelope,
        json!({"success": true, "path": "top.txt", "paths": ["top.txt"]})
    );
    assert_eq!(std::fs::read(temp.path().join("top.txt")).unwrap(), b"top");
}

#[tokio::test]
async fn upload_accepts_bracketed_field_name() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    std::fs::create_dir(temp.path().join("docs")).unwrap();

    let envelope = send_json(
        &app,
        multipart_parts(&[
            Part::Path("docs"),
            Part::File("files[]", "one.txt", "1"),
            Part::File("files[]", "two.txt", "2"),
        ]),
    )
    .await;
    assert_eq!(envelope["paths"], json!(["docs/one.txt", "docs/two.txt"]));
    assert_eq!(std::fs::read(temp.path().join("docs/two.txt")).unwrap(), b"2");
}

#[tokio::test]
async fn upload_without_files_fails() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    let envelope = send_json(&app, multipart(Some("docs"), &[])).await;
    assert_eq!(envelope, json!({"success": false, "error": "No files uploaded"}));
}

#[tokio::test]
async fn upload_outside_root_is_rejected() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    let envelope = send_json(&app, multipart(Some("../.."), &[("x.txt", "x")])).await;
    assert_eq!(envelope, json!({"success": false, "error": "Invalid path"}));

    let escaping_name = send_json(&app, multipart(Some(""), &[("../x.txt", "x")])).await;
    assert_eq!(escaping_name["success"], false);
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn upload_stops_at_first_failure_and_keeps_earlier_files() {
    let (temp, app) = make_app(UploadPolicy::Verbatim, None);
    std::fs::create_dir(temp.path().join("docs")).unwrap();
    // A directory where the second file should go makes its create fail
    std::fs::create_dir(temp.path().join("docs/b.txt")).unwrap();

    let envelope = send_json(
        &app,
        multipart(Some("docs"), &[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")]),
    )
    .await;
    assert_eq!(envelope["success"], false);
    assert!(temp.path().join("docs/a.txt").is_file());
    assert!(!temp.path().join("docs/c.txt").exists());
}

#[tokio::test]
async fn upload_timestamped_diverts_images_only() {
    let (temp, app) = make_app(UploadPolicy::Timestamped, None);
    std::fs::create_dir(temp.path().join("docs")).unwrap();

    let envelope = send_json(
        &app,
        multipart(Some("docs"), &[("readme.md", "# hi"), ("Shot.JPG", "jpeg")]),
    )
    .await;
    assert_eq!(envelope["success"], true);

    let paths = envelope["paths"].as_array().unwrap();
    assert_eq!(paths[0], "docs/readme.md");
    let image = paths[1].as_str().unwrap();
    assert!(image.starts_with("assert/") && image.ends_with(".jpg"), "{image}");
    assert_eq!(envelope["path"], paths[1]);
    assert_eq!(std::fs::read(temp.path().join(image)).unwrap(), b"jpeg");
}

#[tokio::test]
async fn wrong_method_is_not_allowed() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    let (status, _) = send(&app, get("/api/mkdir")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri("/api/put?path=x")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn pages_are_served() {
    let (_temp, app) = make_app(UploadPolicy::Verbatim, None);
    for uri in ["/", "/editor"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("lanshare"));
    }

    let (status, _) = send(&app, get("/no-such-page")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
