//! Path utilities for nbdrive data.
//!
//! - [`get_nbdrive_dir`] - `~/.nbdrive/` (base directory)
//! - [`get_config_path`] - `~/.nbdrive/config.toml`
//! - [`get_bucket_dir`] - `~/.nbdrive/bucket/` (default filesystem bucket)

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable overriding the base directory.
pub const HOME_ENV: &str = "NBDRIVE_HOME";

/// Get the nbdrive base directory.
///
/// Resolution order:
/// 1. `NBDRIVE_HOME` environment variable (if set and non-empty)
/// 2. `~/.nbdrive/` (default)
pub fn get_nbdrive_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV)
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    let home = dirs::home_dir().context("Failed to get home directory")?;
    Ok(home.join(".nbdrive"))
}

/// Get the config file path: `~/.nbdrive/config.toml`
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_nbdrive_dir()?.join("config.toml"))
}

/// Get the default bucket directory: `~/.nbdrive/bucket/`
pub fn get_bucket_dir() -> Result<PathBuf> {
    Ok(get_nbdrive_dir()?.join("bucket"))
}
