//! Configuration module for Locara.

use serde::Deserialize;
use std::path::Path;

use crate::{LocaraError, Result};

/// Default path of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "./config.toml";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 4000;

/// A user allowed to upload archives.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserConfig {
    /// Display name recorded as the uploader.
    pub name: String,
    /// Shared secret entered on the upload form.
    pub auth: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty means console only.
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Main configuration structure.
///
/// The storage and server keys live at the top level of the file:
///
/// ```toml
/// use_directory = "./uploads"
/// port = 4000
///
/// [[users]]
/// name = "Alice"
/// auth = "s3cret"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base directory of the archive store.
    #[serde(default)]
    pub use_directory: String,
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on. 0 selects the default.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the service, shown on pages.
    #[serde(default)]
    pub base_url: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Directory served under `/static`.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Users allowed to upload.
    #[serde(default)]
    pub users: Vec<UserConfig>,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_upload_size() -> u64 {
    32
}

fn default_static_path() -> String {
    "static".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_directory: String::new(),
            host: default_host(),
            port: default_port(),
            base_url: String::new(),
            max_upload_size_mb: default_max_upload_size(),
            static_path: default_static_path(),
            users: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(LocaraError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(s).map_err(|e| LocaraError::Config(format!("parse error: {e}")))?;
        if config.port == 0 {
            config.port = DEFAULT_PORT;
        }
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `LOCARA_USE_DIRECTORY`: Override the archive base directory
    /// - `LOCARA_PORT`: Override the port (ignored unless a valid non-zero port)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("LOCARA_USE_DIRECTORY") {
            if !dir.is_empty() {
                self.use_directory = dir;
            }
        }

        if let Ok(port) = std::env::var("LOCARA_PORT") {
            match port.parse::<u16>() {
                Ok(port) if port > 0 => self.port = port,
                _ => tracing::warn!("Ignoring invalid LOCARA_PORT value: {}", port),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - `use_directory` is empty
    /// - no user is configured
    /// - a user has an empty name or auth code
    /// - two users share an auth code
    pub fn validate(&self) -> Result<()> {
        if self.use_directory.trim().is_empty() {
            return Err(LocaraError::Config(
                "use_directory cannot be empty".to_string(),
            ));
        }

        if self.users.is_empty() {
            return Err(LocaraError::Config(
                "at least one user must be configured".to_string(),
            ));
        }

        for (i, user) in self.users.iter().enumerate() {
            if user.name.is_empty() {
                return Err(LocaraError::Config(format!("user {i}: name cannot be empty")));
            }
            if user.auth.is_empty() {
                return Err(LocaraError::Config(format!(
                    "user {i}: auth code cannot be empty"
                )));
            }
            if self.users[..i].iter().any(|other| other.auth == user.auth) {
                return Err(LocaraError::Config(format!(
                    "user {i}: auth code is shared with another user"
                )));
            }
        }

        Ok(())
    }

    /// Find the user owning an auth code.
    pub fn find_user_by_auth(&self, code: &str) -> Option<&UserConfig> {
        if code.is_empty() {
            return None;
        }
        self.users.iter().find(|user| user.auth == code)
    }

    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}
