//! Locara - a small self-hosted file archive.
//!
//! Uploaded files are kept next to their metadata in one directory per
//! archive; the directory tree is the only database.

pub mod archive;
pub mod config;
pub mod error;
pub mod logging;
pub mod web;

pub use archive::{Archive, ArchiveStore, NewArchive};
pub use config::Config;
pub use error::{LocaraError, Result};
