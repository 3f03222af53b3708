//! Key validation and security checks for the storage backends.
//!
//! Object keys are slash-separated strings. Backends that map keys onto the
//! local filesystem must never let a key escape their root directory, so
//! every key is normalized and checked before use.

use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};

/// Validates and normalizes an object key to prevent directory traversal.
///
/// # Security
/// Rejects keys that:
/// - Are absolute (start with `/` or drive letter)
/// - Contain `..` components
/// - Contain special components like root or prefix
/// - Are empty
///
/// `.` components are dropped and the result always uses forward slashes.
///
/// # Examples
/// ```ignore
/// // Valid keys
/// validate_key("alice/logo.png")        // Ok("alice/logo.png")
/// validate_key("./alice/file.json")     // Ok("alice/file.json")
///
/// // Invalid keys
/// validate_key("../etc/passwd")         // Error: path traversal
/// validate_key("/etc/passwd")           // Error: absolute path
/// validate_key("")                      // Error: empty key
/// ```
pub(crate) fn validate_key(key: &str) -> Result<String> {
    if key.is_empty() {
        bail!("Object key cannot be empty");
    }

    let path = Path::new(key);

    if path.is_absolute() || key.starts_with('/') {
        bail!("Object key cannot be absolute: {key}");
    }

    let mut segments: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {},
            Component::ParentDir => {
                bail!("Object key cannot contain '..': {key}")
            },
            Component::RootDir | Component::Prefix(_) => {
                bail!("Object key cannot contain root or prefix: {key}")
            },
        }
    }

    if segments.is_empty() {
        bail!("Object key normalized to empty key");
    }

    // Use forward slashes consistently (for cross-platform compatibility)
    Ok(segments.join("/"))
}

/// Returns the filesystem path for an object given a base directory and key.
pub(crate) fn object_path(base_dir: &Path, key: &str) -> Result<PathBuf> {
    let normalized = validate_key(key)?;
    Ok(base_dir.join(normalized))
}
