//! CLI command implementations for nbdrive.
//!
//! - [`contents`] - ls / get / put / rm / mv
//! - [`checkpoint`] - checkpoint create / list / restore / delete

pub mod checkpoint;
pub mod contents;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use nbdrive::{BackendKind, Drive, DriveConfig};

/// Load the configuration, apply command-line overrides and open the drive.
pub fn open_drive(
    config_path: Option<&Path>,
    user: Option<String>,
    root: Option<PathBuf>,
) -> Result<Drive> {
    let mut config = match config_path {
        Some(path) => DriveConfig::load_from(path)?,
        None => DriveConfig::load()?,
    };

    if let Some(user) = user {
        config.user = user;
    }
    if let Some(root) = root {
        config.storage.backend = BackendKind::Filesystem;
        config.storage.root = Some(root);
    }

    Drive::open(&config).with_context(|| format!("Failed to open drive for user '{}'", config.user))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
