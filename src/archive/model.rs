//! Archive metadata types.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::INFO_FILE_NAME;
use crate::{LocaraError, Result};

/// Metadata of a stored archive, as persisted in `info.json`.
///
/// Field order matches the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    /// Identifier, equal to the name of the containing directory.
    pub id: u64,
    /// Display name of the user who uploaded the file.
    pub uploader: String,
    /// Original filename, also the on-disk name of the content file.
    pub file_name: String,
    /// Size reported by the upload transport.
    pub size_bytes: u64,
    /// Checksum from the `Content-MD5` upload header, empty when absent.
    #[serde(default)]
    pub md5_sum: String,
    /// When the archive was created.
    pub uploaded_on: DateTime<Utc>,
    /// Title of the archive.
    pub name: String,
    /// Date the document refers to, expected as `YYYY-MM-DD`.
    pub dated_on: String,
    /// Free-form document type (e.g. "minutes").
    #[serde(rename = "type")]
    pub kind: String,
    /// Author of the document.
    pub author: String,
}

impl Archive {
    /// Year of `dated_on`, if it is a valid `YYYY-MM-DD` date.
    pub fn dated_year(&self) -> Option<i32> {
        NaiveDate::parse_from_str(&self.dated_on, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }

    /// Checksum, if one was supplied at upload.
    pub fn md5(&self) -> Option<&str> {
        if self.md5_sum.is_empty() {
            None
        } else {
            Some(&self.md5_sum)
        }
    }
}

/// Data for creating a new archive.
///
/// Carries no identifier; the store assigns one on create.
#[derive(Debug, Clone)]
pub struct NewArchive {
    /// Display name of the uploader.
    pub uploader: String,
    /// Original filename.
    pub file_name: String,
    /// Size reported by the upload transport.
    pub size_bytes: u64,
    /// Optional checksum from the upload.
    pub md5_sum: Option<String>,
    /// Creation timestamp.
    pub uploaded_on: DateTime<Utc>,
    /// Title of the archive.
    pub name: String,
    /// Date the document refers to.
    pub dated_on: String,
    /// Document type.
    pub kind: String,
    /// Author of the document.
    pub author: String,
}

impl NewArchive {
    /// Create a new NewArchive stamped with the current time.
    pub fn new(uploader: impl Into<String>, file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            uploader: uploader.into(),
            file_name: file_name.into(),
            size_bytes,
            md5_sum: None,
            uploaded_on: Utc::now(),
            name: String::new(),
            dated_on: String::new(),
            kind: String::new(),
            author: String::new(),
        }
    }

    /// Set the title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the document date.
    pub fn with_dated_on(mut self, dated_on: impl Into<String>) -> Self {
        self.dated_on = dated_on.into();
        self
    }

    /// Set the document type.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the checksum. Empty values are treated as absent.
    pub fn with_md5_sum(mut self, md5_sum: impl Into<String>) -> Self {
        let md5_sum = md5_sum.into();
        self.md5_sum = if md5_sum.is_empty() { None } else { Some(md5_sum) };
        self
    }

    /// Override the creation timestamp.
    pub fn with_uploaded_on(mut self, uploaded_on: DateTime<Utc>) -> Self {
        self.uploaded_on = uploaded_on;
        self
    }

    /// Check mandatory fields and the file name.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("dated_on", &self.dated_on),
            ("type", &self.kind),
            ("author", &self.author),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();

        if !missing.is_empty() {
            return Err(LocaraError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        validate_file_name(&self.file_name)
    }

    /// Attach an identifier, producing the persisted record.
    pub(crate) fn to_archive(&self, id: u64) -> Archive {
        Archive {
            id,
            uploader: self.uploader.clone(),
            file_name: self.file_name.clone(),
            size_bytes: self.size_bytes,
            md5_sum: self.md5_sum.clone().unwrap_or_default(),
            uploaded_on: self.uploaded_on,
            name: self.name.clone(),
            dated_on: self.dated_on.clone(),
            kind: self.kind.clone(),
            author: self.author.clone(),
        }
    }
}

/// Check that a file name is usable verbatim inside an archive directory.
///
/// The name must be a single path component and must not shadow the
/// metadata file.
pub fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.is_empty() {
        return Err(LocaraError::Validation("file name is required".to_string()));
    }

    if file_name == "." || file_name == ".." || file_name == INFO_FILE_NAME {
        return Err(LocaraError::Validation(format!(
            "file name is reserved: {file_name}"
        )));
    }

    if file_name.contains(['/', '\\', '\0']) {
        return Err(LocaraError::Validation(format!(
            "file name must not contain path separators: {file_name}"
        )));
    }

    Ok(())
}
