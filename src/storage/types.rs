//! Types and constants for the storage backends.

use chrono::{DateTime, Utc};
use redb::TableDefinition;
use serde::{Deserialize, Serialize};

/// Table for object metadata in the filesystem backend
pub(crate) const OBJECTS_TABLE: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("objects");

/// Metadata for a stored object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Store key of the object (e.g., "alice/notes/x.ipynb")
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// MIME content type exactly as supplied on write, if any
    #[serde(default)]
    pub content_type: Option<String>,
    /// Timestamp when object was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when object was last modified
    pub modified_at: DateTime<Utc>,
}

impl ObjectMeta {
    /// Fresh metadata for an object written now.
    pub(crate) fn new(path: impl Into<String>, size: u64, content_type: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            path: path.into(),
            size,
            content_type: content_type.map(str::to_string),
            created_at: now,
            modified_at: now,
        }
    }
}

/// One page of a delimiter-grouped listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Keys grouped up to and including the next delimiter ("directories").
    pub common_prefixes: Vec<String>,
    /// Objects directly under the prefix.
    pub objects: Vec<ObjectMeta>,
    /// Set when `max_keys` cut the listing short.
    pub truncated: bool,
}

impl ListPage {
    /// Number of entries counted against `max_keys`.
    pub fn len(&self) -> usize {
        self.common_prefixes.len() + self.objects.len()
    }

    /// Returns true if the page holds no prefixes and no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
