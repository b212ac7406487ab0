//! HTTP handlers for Locara.

pub mod archive;
pub mod pages;

pub use archive::*;
pub use pages::*;

use crate::archive::ArchiveStore;
use crate::config::Config;
use crate::web::error::ApiError;

/// Shared application state.
pub struct AppState {
    /// Archive store.
    pub store: ArchiveStore,
    /// Loaded configuration (users, base URL, limits).
    pub config: Config,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: ArchiveStore, config: Config) -> Self {
        Self { store, config }
    }

    /// Display name of the user owning an auth code.
    pub fn uploader_for(&self, auth_code: &str) -> Option<&str> {
        self.config
            .find_user_by_auth(auth_code)
            .map(|user| user.name.as_str())
    }

    /// Maximum request body size for uploads.
    pub fn max_upload_size(&self) -> usize {
        self.config.max_upload_size_bytes()
    }
}

/// Run a blocking store call off the async executor.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("Blocking task failed: {}", e);
            ApiError::internal("An internal error occurred")
        })?
        .map_err(ApiError::from)
}
