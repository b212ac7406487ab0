//! HTML page handlers.

use axum::{extract::State, response::Html};
use std::sync::Arc;

use super::AppState;
use crate::web::views::{group_by_year, render_error, render_index, render_upload};

/// GET / - Archive index grouped by year.
///
/// A failing listing renders an empty index instead of an error page.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let store = state.store.clone();
    let archives = match tokio::task::spawn_blocking(move || store.list()).await {
        Ok(Ok(archives)) => archives,
        Ok(Err(e)) => {
            tracing::error!("Failed to list archives: {}", e);
            Vec::new()
        }
        Err(e) => {
            tracing::error!("Listing task failed: {}", e);
            Vec::new()
        }
    };

    Html(render_index(&group_by_year(archives), &state.config.base_url))
}

/// GET /upload - Upload form.
pub async fn upload_page() -> Html<String> {
    Html(render_upload())
}

/// GET /error - Rejected upload page.
pub async fn error_page() -> Html<String> {
    Html(render_error())
}
