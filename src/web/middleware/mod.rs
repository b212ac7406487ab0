//! Middleware for the web layer.

pub mod request_log;
pub mod security;

pub use request_log::{client_ip, log_request};
pub use security::security_headers;
