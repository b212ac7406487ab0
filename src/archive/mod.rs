//! Archive storage for Locara.
//!
//! The filesystem tree is the database. Every archive owns one directory
//! named after its identifier:
//!
//! ```text
//! {base_path}/
//! ├── 1/
//! │   ├── info.json
//! │   └── minutes-2024-03.pdf
//! ├── 2/
//! │   ├── info.json
//! │   └── photo.jpg
//! └── ...
//! ```

mod model;
mod store;

pub use model::{validate_file_name, Archive, NewArchive};
pub use store::{parse_archive_id, ArchiveStore};

/// Name of the metadata file inside every archive directory.
pub const INFO_FILE_NAME: &str = "info.json";

/// Attempts used by callers that retry a create after an identifier collision.
pub const DEFAULT_CREATE_ATTEMPTS: usize = 8;
