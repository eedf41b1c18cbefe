//! Logging middleware
//!
//! Logs every request with its client, status and latency.

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::net::SocketAddr;
use std::time::Instant;

/// Log a completed request
pub async fn log_request(request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "Client {} {} {} -> {} ({} ms)",
        client,
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );

    response
}
