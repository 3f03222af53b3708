//! Content models exchanged with the host.
//!
//! A [`ContentModel`] describes one file, notebook or directory. Models are
//! built fresh on every read and never cached; mutating one does nothing to
//! the store until it is saved.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::scope::normalize;

/// Extension marking a path as a structured document (notebook).
pub const DOCUMENT_EXTENSION: &str = ".ipynb";

/// The three kinds of entry a drive holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Plain file, text or binary.
    File,
    /// Structured JSON document.
    #[serde(rename = "notebook")]
    Document,
    /// Emulated directory (a key prefix).
    Directory,
}

impl ContentKind {
    /// Wire name used by hosts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Document => "notebook",
            Self::Directory => "directory",
        }
    }

    /// Leaf classification by path: documents carry [`DOCUMENT_EXTENSION`].
    pub fn for_leaf(path: &str) -> Self {
        if path.ends_with(DOCUMENT_EXTENSION) {
            Self::Document
        } else {
            Self::File
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "notebook" | "document" => Ok(Self::Document),
            "directory" => Ok(Self::Directory),
            other => Err(Error::UnknownContentType(other.to_string())),
        }
    }
}

/// Representation of a model's content on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Text,
    Json,
    Base64,
}

impl ContentFormat {
    /// Wire name used by hosts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Base64 => "base64",
        }
    }

    /// Default mime type written for content in this format.
    pub fn mimetype(self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Json => "application/json",
            Self::Base64 => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "base64" => Ok(Self::Base64),
            other => Err(Error::UnknownContentType(other.to_string())),
        }
    }
}

/// Content carried by a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    /// Text file content.
    Text(String),
    /// Binary file content; serialized as base64.
    Binary(#[serde(serialize_with = "crate::codec::serialize_base64")] Vec<u8>),
    /// Notebook content.
    Document(serde_json::Value),
    /// Directory children, one level deep.
    Directory(Vec<ContentModel>),
}

impl Content {
    /// Format label matching this content.
    pub fn format(&self) -> ContentFormat {
        match self {
            Self::Text(_) => ContentFormat::Text,
            Self::Binary(_) => ContentFormat::Base64,
            Self::Document(_) | Self::Directory(_) => ContentFormat::Json,
        }
    }
}

/// One file, notebook or directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentModel {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub name: String,
    pub path: String,
    pub content: Option<Content>,
    pub format: Option<ContentFormat>,
    pub mimetype: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub writable: bool,
}

impl ContentModel {
    /// Bare model for `path`: no content, no timestamps.
    pub fn new(kind: ContentKind, path: &str) -> Self {
        let path = normalize(path);
        let name = path.rsplit('/').next().unwrap_or_default();
        Self {
            kind,
            name: name.to_string(),
            path: path.to_string(),
            content: None,
            format: None,
            mimetype: None,
            created: None,
            last_modified: None,
            writable: true,
        }
    }

    /// Metadata-only directory model.
    ///
    /// Object stores keep no directory metadata, so both timestamps are the
    /// Unix epoch.
    pub fn directory(path: &str) -> Self {
        let epoch = DateTime::<Utc>::default();
        Self {
            created: Some(epoch),
            last_modified: Some(epoch),
            ..Self::new(ContentKind::Directory, path)
        }
    }

    /// File model carrying `content`; format and mimetype follow the content.
    pub fn file(path: &str, content: Content) -> Self {
        let format = content.format();
        Self {
            format: Some(format),
            mimetype: Some(format.mimetype().to_string()),
            content: Some(content),
            ..Self::new(ContentKind::File, path)
        }
    }

    /// Notebook model carrying `document`.
    pub fn document(path: &str, document: serde_json::Value) -> Self {
        Self {
            format: Some(ContentFormat::Json),
            content: Some(Content::Document(document)),
            ..Self::new(ContentKind::Document, path)
        }
    }

    /// Child models, if this is a directory listed with content.
    pub fn children(&self) -> &[ContentModel] {
        match &self.content {
            Some(Content::Directory(children)) => children,
            _ => &[],
        }
    }
}

/// One stored checkpoint of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointRecord {
    pub id: String,
    /// Logical path of the content the checkpoint belongs to.
    pub path: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Content read back from a checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckpointContent {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub content: Content,
    pub format: ContentFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("notebook".parse::<ContentKind>().unwrap(), ContentKind::Document);
        assert_eq!("document".parse::<ContentKind>().unwrap(), ContentKind::Document);
        assert_eq!("directory".parse::<ContentKind>().unwrap(), ContentKind::Directory);
        assert!(matches!(
            "symlink".parse::<ContentKind>(),
            Err(Error::UnknownContentType(t)) if t == "symlink"
        ));
    }

    #[test]
    fn test_format_parsing_and_mimes() {
        assert_eq!("base64".parse::<ContentFormat>().unwrap(), ContentFormat::Base64);
        assert!("yaml".parse::<ContentFormat>().is_err());
        assert_eq!(ContentFormat::Json.mimetype(), "application/json");
    }

    #[test]
    fn test_leaf_classification() {
        assert_eq!(ContentKind::for_leaf("a/b.ipynb"), ContentKind::Document);
        assert_eq!(ContentKind::for_leaf("a/b.ipynb.txt"), ContentKind::File);
    }

    #[test]
    fn test_new_model_name_and_path() {
        let model = ContentModel::new(ContentKind::File, "/notes/sub/x.txt/");
        assert_eq!(model.name, "x.txt");
        assert_eq!(model.path, "notes/sub/x.txt");
        assert!(model.writable);

        let root = ContentModel::directory("");
        assert_eq!(root.name, "");
        assert_eq!(root.created.unwrap().timestamp(), 0);
    }

    #[test]
    fn test_serializes_wire_names() {
        let model = ContentModel::document("x.ipynb", json!({"cells": []}));
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["type"], "notebook");
        assert_eq!(value["format"], "json");
        assert_eq!(value["content"], json!({"cells": []}));

        let bin = ContentModel::file("b.bin", Content::Binary(vec![0xff, 0x00]));
        let value = serde_json::to_value(&bin).unwrap();
        assert_eq!(value["content"], "/wA=");
        assert_eq!(value["format"], "base64");
    }
}
