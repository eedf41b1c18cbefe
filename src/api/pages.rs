//! Embedded HTML pages

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const EDITOR_HTML: &str = include_str!("../../static/editor.html");

/// GET /
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /editor
pub async fn editor_page() -> Html<&'static str> {
    Html(EDITOR_HTML)
}
