//! Error types for Locara.

use std::path::PathBuf;

use thiserror::Error;

/// Common error type for Locara.
#[derive(Error, Debug)]
pub enum LocaraError {
    /// I/O error not tied to a specific archive step.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Metadata exists but the content file it references does not.
    #[error("content file of archive {id} is missing: {}", .path.display())]
    ContentMissing {
        /// Archive identifier.
        id: u64,
        /// Expected location of the content file.
        path: PathBuf,
    },

    /// Metadata file exists but could not be parsed.
    #[error("metadata of archive {id} is corrupt: {reason}")]
    Corrupt {
        /// Archive identifier.
        id: u64,
        /// Parser message.
        reason: String,
    },

    /// Another writer created the directory for this identifier first.
    ///
    /// The whole create operation may be retried.
    #[error("archive identifier {0} is already taken")]
    IdCollision(u64),

    /// The archive directory could not be created.
    #[error("failed to create directory for archive {id}: {source}")]
    CreateDirectory {
        /// Archive identifier.
        id: u64,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The metadata record could not be serialized.
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The metadata file could not be written.
    #[error("failed to write metadata of archive {id}: {source}")]
    WriteMetadata {
        /// Archive identifier.
        id: u64,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The content stream could not be copied to disk.
    #[error("failed to write content of archive {id}: {source}")]
    WriteContent {
        /// Archive identifier.
        id: u64,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for Locara operations.
pub type Result<T> = std::result::Result<T, LocaraError>;
