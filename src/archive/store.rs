//! Directory-backed archive store.
//!
//! The store holds no state beyond its base path; every call re-reads the
//! filesystem. Identifier allocation is not atomic: two concurrent creates can
//! compute the same identifier, and only the directory creation tells them
//! apart. The loser receives [`LocaraError::IdCollision`].

use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::{validate_file_name, Archive, NewArchive, INFO_FILE_NAME};
use crate::{LocaraError, Result};

/// Store for archives laid out as `{base_path}/{id}/info.json` plus the
/// content file next to it.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    /// Base directory; every archive directory is an immediate child.
    base_path: PathBuf,
}

impl ArchiveStore {
    /// Open a store rooted at the given directory.
    ///
    /// The base directory will be created if it doesn't exist, and the
    /// stored path is resolved to an absolute one.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        if base_path.as_os_str().is_empty() {
            return Err(LocaraError::Validation(
                "base directory cannot be empty".to_string(),
            ));
        }

        fs::create_dir_all(&base_path)?;
        let base_path = fs::canonicalize(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Directory of the archive with the given identifier.
    pub fn archive_dir(&self, id: u64) -> PathBuf {
        self.base_path.join(id.to_string())
    }

    fn info_path(&self, id: u64) -> PathBuf {
        self.archive_dir(id).join(INFO_FILE_NAME)
    }

    /// Compute the identifier the next create will try to claim.
    ///
    /// Returns one more than the highest identifier found among the base
    /// directory's subdirectories, or 1 when there are none. An unreadable
    /// base directory counts as empty.
    pub fn next_id(&self) -> u64 {
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(error = %e, "Base directory unreadable, starting at 1");
                return 1;
            }
        };

        entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().to_str().and_then(parse_archive_id))
            .max()
            .map_or(1, |highest| highest.saturating_add(1))
    }

    /// Create a new archive from a content stream.
    ///
    /// Writes `info.json` first and then streams `content` into a file named
    /// after `archive.file_name`. The metadata is not rolled back: if copying
    /// the content fails, the partial content file is removed, the directory
    /// keeps its metadata and reads of the content path report
    /// [`LocaraError::ContentMissing`].
    ///
    /// # Errors
    ///
    /// * [`LocaraError::Validation`] - missing mandatory field or unusable file name
    /// * [`LocaraError::IdCollision`] - another create claimed the identifier first
    /// * [`LocaraError::CreateDirectory`] - the archive directory could not be created,
    ///   including when a plain file or symlink already holds its name
    /// * [`LocaraError::Serialize`] / [`LocaraError::WriteMetadata`] - `info.json` failed
    /// * [`LocaraError::WriteContent`] - reading `content` or writing the file failed
    pub fn create<R: Read + ?Sized>(&self, content: &mut R, archive: &NewArchive) -> Result<Archive> {
        archive.validate()?;

        let id = self.next_id();
        let dir = self.archive_dir(id);

        match fs::create_dir(&dir) {
            Ok(()) => {}
            // next_id only counts directories, so only a directory is a collision.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && is_real_dir(&dir) => {
                return Err(LocaraError::IdCollision(id));
            }
            Err(source) => return Err(LocaraError::CreateDirectory { id, source }),
        }

        let record = archive.to_archive(id);

        let json = serde_json::to_vec_pretty(&record)?;
        fs::write(dir.join(INFO_FILE_NAME), json)
            .map_err(|source| LocaraError::WriteMetadata { id, source })?;

        let content_path = dir.join(&record.file_name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&content_path)
            .map_err(|source| LocaraError::WriteContent { id, source })?;
        if let Err(source) = io::copy(content, &mut file) {
            // A truncated file must not be served as the archive content.
            drop(file);
            let _ = fs::remove_file(&content_path);
            return Err(LocaraError::WriteContent { id, source });
        }

        tracing::info!(id, name = %record.name, file = %record.file_name, "Archive created");

        Ok(record)
    }

    /// Create a new archive, retrying the whole allocation on collision.
    ///
    /// A collision is detected before `content` is read, so the same stream
    /// can be handed to the next attempt. At most `max_attempts` creates are
    /// made (at least one).
    pub fn create_with_retry<R: Read + ?Sized>(
        &self,
        content: &mut R,
        archive: &NewArchive,
        max_attempts: usize,
    ) -> Result<Archive> {
        let mut attempt = 1;
        loop {
            match self.create(content, archive) {
                Err(LocaraError::IdCollision(id)) if attempt < max_attempts => {
                    tracing::debug!(id, attempt, "Archive identifier taken, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Load the metadata of an archive.
    ///
    /// # Errors
    ///
    /// * [`LocaraError::NotFound`] - no `info.json` for this identifier
    /// * [`LocaraError::Corrupt`] - `info.json` does not parse, or names another identifier
    pub fn get(&self, id: u64) -> Result<Archive> {
        if id == 0 {
            return Err(LocaraError::Validation(
                "archive identifier must be positive".to_string(),
            ));
        }

        let data = match fs::read(self.info_path(id)) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LocaraError::NotFound(format!("Archive {id}")));
            }
            Err(e) => return Err(e.into()),
        };

        let archive: Archive = serde_json::from_slice(&data).map_err(|e| LocaraError::Corrupt {
            id,
            reason: e.to_string(),
        })?;

        if archive.id != id {
            return Err(LocaraError::Corrupt {
                id,
                reason: format!("record carries identifier {}", archive.id),
            });
        }

        Ok(archive)
    }

    /// Resolve the path of an archive's content file.
    ///
    /// # Errors
    ///
    /// Everything [`ArchiveStore::get`] returns, plus
    /// [`LocaraError::ContentMissing`] when the metadata exists but the file
    /// does not (e.g. a create that is still running or failed half-way).
    pub fn content_path(&self, id: u64) -> Result<PathBuf> {
        let archive = self.get(id)?;

        validate_file_name(&archive.file_name).map_err(|e| LocaraError::Corrupt {
            id,
            reason: e.to_string(),
        })?;

        let path = self.archive_dir(id).join(&archive.file_name);
        if !path.is_file() {
            return Err(LocaraError::ContentMissing { id, path });
        }

        Ok(path)
    }

    /// Load every readable archive.
    ///
    /// Entries that are not identifier directories, or whose metadata cannot
    /// be loaded, are skipped. Only a failure to read the base directory
    /// itself is returned. The order follows the directory listing.
    pub fn list(&self) -> Result<Vec<Archive>> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut archives = Vec::new();
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let Some(id) = entry.file_name().to_str().and_then(parse_archive_id) else {
                continue;
            };

            match self.get(id) {
                Ok(archive) => archives.push(archive),
                Err(LocaraError::NotFound(_)) => {
                    tracing::debug!(id, "Skipping archive directory without metadata");
                }
                Err(e) => {
                    tracing::warn!(id, error = %e, "Skipping unreadable archive");
                }
            }
        }

        Ok(archives)
    }
}

/// Parse a directory name as an archive identifier.
///
/// Only canonical decimal form is accepted: ASCII digits, no sign, no leading
/// zero, value above zero.
pub fn parse_archive_id(name: &str) -> Option<u64> {
    if name.is_empty() || name.starts_with('0') || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Whether `path` is a directory itself, not a symlink to one.
fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
