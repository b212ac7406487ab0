//! Router configuration for the web layer.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_archive, download_archive, error_page, index, list_archives, upload_page, AppState,
};
use super::middleware::{log_request, security_headers};

/// Create the main router: HTML pages and the archive API.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/archive/create", post(create_archive))
        .route("/archives", get(list_archives))
        .route("/archive/:id", get(download_archive));

    let max_upload_size = app_state.max_upload_size();

    Router::new()
        .route("/", get(index))
        .route("/upload", get(upload_page))
        .route("/error", get(error_page))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(log_request))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create a router serving static assets under `/static`.
///
/// Returns `None` if the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let path = Path::new(static_path);
    if !path.is_dir() {
        tracing::warn!("Static directory not found: {}", static_path);
        return None;
    }

    Some(Router::new().nest_service("/static", ServeDir::new(path)))
}
