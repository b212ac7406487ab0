//! Web module for Locara.
//!
//! Serves the browser pages, the upload endpoint, the JSON listing and
//! file downloads on top of the archive store.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod views;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
