//! Request logging middleware.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

/// Best-effort client address: `X-Forwarded-For`, then `X-Real-IP`, then the peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    for name in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    peer.map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Log every request with its client address and duration.
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_ip(req.headers(), peer);

    tracing::info!("{} {} from {}", method, path, client);

    let response = next.run(req).await;

    tracing::info!(
        status = response.status().as_u16(),
        "{} {} completed in {:?}",
        method,
        path,
        start.elapsed()
    );

    response
}
