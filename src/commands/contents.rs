//! Contents commands:
//! - `nbdrive ls [PATH]` - list a directory
//! - `nbdrive get PATH` - print a model
//! - `nbdrive put PATH SOURCE` - upload a local file
//! - `nbdrive rm PATH` - delete
//! - `nbdrive mv OLD NEW` - rename

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use nbdrive::{Content, ContentFormat, ContentKind, ContentModel, Drive};

use super::print_json;

pub fn ls(drive: &Drive, path: &str) -> Result<()> {
    if !drive.contents().dir_exists(path)? {
        anyhow::bail!("Directory not found: {path}");
    }
    let model = drive.get(path, true, Some(ContentKind::Directory), None)?;
    print_json(&model)
}

pub fn get(
    drive: &Drive,
    path: &str,
    kind: Option<ContentKind>,
    format: Option<ContentFormat>,
    content: bool,
) -> Result<()> {
    let model = drive.get(path, content, kind, format)?;
    print_json(&model)
}

/// Upload `source` to `path`. Notebooks must parse as JSON; other files go
/// up as text when they are valid UTF-8 and as binary otherwise.
pub fn put(drive: &Drive, path: &str, source: &Path, kind: Option<ContentKind>) -> Result<()> {
    let bytes =
        fs::read(source).with_context(|| format!("Failed to read {}", source.display()))?;

    let model = match kind.unwrap_or_else(|| ContentKind::for_leaf(path)) {
        ContentKind::Document => {
            let document: Value = serde_json::from_slice(&bytes)
                .with_context(|| format!("{} is not valid JSON", source.display()))?;
            ContentModel::document(path, document)
        },
        ContentKind::File => {
            let content = match String::from_utf8(bytes) {
                Ok(text) => Content::Text(text),
                Err(e) => Content::Binary(e.into_bytes()),
            };
            ContentModel::file(path, content)
        },
        ContentKind::Directory => anyhow::bail!("Cannot upload a directory: {path}"),
    };

    let saved = drive.save(&model, path)?;
    print_json(&saved)
}

pub fn rm(drive: &Drive, path: &str) -> Result<()> {
    drive.delete(path)?;
    tracing::info!(path = %path, "Deleted");
    Ok(())
}

pub fn mv(drive: &Drive, old: &str, new: &str) -> Result<()> {
    drive.rename(old, new)?;
    let model = drive.get(new, false, None, None)?;
    print_json(&model)
}
