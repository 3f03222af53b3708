//! Drive configuration.
//!
//! [`DriveConfig`] is read from a TOML file:
//!
//! ```toml
//! user = "alice"
//! max_keys = 10000
//! checkpoint_id = "checkpoint"
//!
//! [storage]
//! backend = "filesystem"   # or "memory"
//! root = "/srv/bucket"     # defaults to ~/.nbdrive/bucket
//! ```
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! starting point as long as a user name can be found.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::checkpoints::{DEFAULT_CHECKPOINT_ID, validate_checkpoint_id};
use crate::client::DEFAULT_MAX_KEYS;
use crate::error::{Error, Result};
use crate::paths;

/// Listing caps above this draw a warning.
const MAX_KEYS_WARN_THRESHOLD: usize = 100_000;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Which storage backend a drive runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local, lost on exit.
    Memory,
    /// Files on disk with a redb metadata index.
    #[default]
    Filesystem,
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Bucket directory for the filesystem backend.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl StorageConfig {
    /// Bucket directory: the configured root or `~/.nbdrive/bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no home directory can be found.
    pub fn resolved_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => paths::get_bucket_dir().map_err(|e| Error::Config(format!("{e:#}"))),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveConfig {
    /// Principal whose namespace the drive serves.
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_max_keys")]
    pub max_keys: usize,
    /// Id of the single checkpoint slot hosts see.
    #[serde(default = "default_checkpoint_id")]
    pub checkpoint_id: String,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_user() -> String {
    std::env::var("USER").unwrap_or_default()
}

fn default_max_keys() -> usize {
    DEFAULT_MAX_KEYS
}

fn default_checkpoint_id() -> String {
    DEFAULT_CHECKPOINT_ID.to_string()
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            max_keys: default_max_keys(),
            checkpoint_id: default_checkpoint_id(),
            storage: StorageConfig::default(),
        }
    }
}

impl DriveConfig {
    /// In-memory drive for `user` with every other setting at its default.
    pub fn memory(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            storage: StorageConfig {
                backend: BackendKind::Memory,
                root: None,
            },
            ..Self::default()
        }
    }

    /// Load configuration from `~/.nbdrive/config.toml` (or
    /// `$NBDRIVE_HOME/config.toml`). A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        let path = paths::get_config_path().map_err(|e| Error::Config(format!("{e:#}")))?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types or unknown backend names
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] listing every problem found:
    /// - Empty user, or a user containing '/'
    /// - `max_keys` of 0
    /// - A checkpoint id containing '-', '.' or '/'
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.user.is_empty() {
            errors.push("user cannot be empty (set it in config.toml or via $USER)".to_string());
        } else if self.user.contains('/') {
            errors.push(format!("user cannot contain '/' (got: '{}')", self.user));
        }

        if self.max_keys == 0 {
            errors.push(format!(
                "max_keys cannot be 0. Set a positive number (default: {DEFAULT_MAX_KEYS})"
            ));
        } else if self.max_keys > MAX_KEYS_WARN_THRESHOLD {
            warnings.push(format!(
                "max_keys {} is very high (> {MAX_KEYS_WARN_THRESHOLD}); listings hold every key in memory",
                self.max_keys
            ));
        }

        if validate_checkpoint_id(&self.checkpoint_id).is_err() {
            errors.push(format!(
                "checkpoint_id must be non-empty without '-', '.' or '/' (got: '{}')",
                self.checkpoint_id
            ));
        }

        if self.storage.backend == BackendKind::Memory && self.storage.root.is_some() {
            warnings.push("storage.root is ignored by the memory backend".to_string());
        }

        if let Some(root) = &self.storage.root
            && root.exists()
            && !root.is_dir()
        {
            errors.push(format!("storage.root is not a directory: {}", root.display()));
        }

        if !errors.is_empty() {
            return Err(Error::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )));
        }

        Ok(ValidationResult { warnings })
    }
}
