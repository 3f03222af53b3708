//! Store client: the drive's only door to the object store.
//!
//! Wraps a shared [`StorageBackend`] handle, normalizes listing prefixes, and
//! translates backend failures into [`Error`]. All keys passed here are
//! already scoped.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::storage::{ObjectMeta, StorageBackend, validate_key};

/// Default listing cap.
pub const DEFAULT_MAX_KEYS: usize = 10_000;

/// Content type reported for objects stored without one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

const DELIMITER: char = '/';

/// Metadata of one stored object as the drive sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: String,
}

impl From<ObjectMeta> for ObjectRecord {
    fn from(meta: ObjectMeta) -> Self {
        Self {
            key: meta.path,
            size: meta.size,
            last_modified: Some(meta.modified_at),
            content_type: meta
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        }
    }
}

/// One-level listing of a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Sub-prefixes ("directories"), each ending with `/`.
    pub prefixes: Vec<String>,
    /// Objects directly under the prefix.
    pub objects: Vec<ObjectRecord>,
    /// Set when the listing hit the key cap.
    pub truncated: bool,
}

impl Listing {
    /// Returns true if the listing holds no prefixes and no objects.
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.objects.is_empty()
    }
}

/// Normalizes a listing prefix: no leading slash, one trailing slash, and
/// the empty string for the store root.
pub fn listing_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_start_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Canonical form of a store key: `.` and empty segments dropped.
///
/// Keys the backends would reject are returned unchanged and left for the
/// backend to refuse.
pub(crate) fn canonical_key(key: &str) -> String {
    validate_key(key).unwrap_or_else(|_| key.to_string())
}

/// Synchronous client over an object store backend.
///
/// # Thread Safety
///
/// `StoreClient` is `Clone`; clones share the backend handle and hold no
/// other state, so one client can serve any number of callers.
#[derive(Clone)]
pub struct StoreClient {
    backend: Arc<dyn StorageBackend>,
    max_keys: usize,
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("max_keys", &self.max_keys)
            .finish_non_exhaustive()
    }
}

impl StoreClient {
    /// Creates a client over `backend` with the given listing cap.
    pub fn new(backend: Arc<dyn StorageBackend>, max_keys: usize) -> Self {
        Self {
            backend,
            max_keys: max_keys.max(1),
        }
    }

    /// Creates a client with a custom backend and the default listing cap.
    pub fn custom<B: StorageBackend>(backend: B) -> Self {
        Self::new(Arc::new(backend), DEFAULT_MAX_KEYS)
    }

    /// Listing cap in effect.
    pub fn max_keys(&self) -> usize {
        self.max_keys
    }

    /// Checks whether an object exists. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn exists(&self, key: &str) -> Result<bool> {
        self.backend
            .head(key)
            .map(|meta| meta.is_some())
            .map_err(|e| Error::store("exists", key, e))
    }

    /// Fetches metadata without the object body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the object is absent, [`Error::Store`]
    /// if the backend fails.
    pub fn info(&self, key: &str) -> Result<ObjectRecord> {
        match self.backend.head(key) {
            Ok(Some(meta)) => Ok(meta.into()),
            Ok(None) => Err(Error::not_found(key)),
            Err(e) => Err(Error::store("info", key, e)),
        }
    }

    /// Lists the immediate children of `prefix`.
    ///
    /// The prefix is normalized to end with `/`; the empty prefix is the
    /// store root. Sub-prefixes equal to the prefix itself and zero-length
    /// directory markers (objects whose key is the prefix) are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn list(&self, prefix: &str) -> Result<Listing> {
        let prefix = listing_prefix(prefix);
        let page = self
            .backend
            .list_delimited(&prefix, DELIMITER, self.max_keys)
            .map_err(|e| Error::store("list", &prefix, e))?;

        if page.truncated {
            warn!(prefix = %prefix, max_keys = self.max_keys, "Listing truncated at key cap");
        }

        let listing = Listing {
            prefixes: page
                .common_prefixes
                .into_iter()
                .filter(|p| *p != prefix)
                .collect(),
            objects: page
                .objects
                .into_iter()
                .filter(|meta| meta.path != prefix)
                .map(ObjectRecord::from)
                .collect(),
            truncated: page.truncated,
        };

        debug!(
            prefix = %prefix,
            prefixes = listing.prefixes.len(),
            objects = listing.objects.len(),
            "Listed prefix"
        );

        Ok(listing)
    }

    /// Lists every object under `prefix` at any depth, up to the key cap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn list_recursive(&self, prefix: &str) -> Result<Vec<ObjectRecord>> {
        let prefix = listing_prefix(prefix);
        let filter = (!prefix.is_empty()).then_some(prefix.as_str());
        let mut objects = self
            .backend
            .list(filter)
            .map_err(|e| Error::store("list", &prefix, e))?;

        if objects.len() > self.max_keys {
            warn!(prefix = %prefix, max_keys = self.max_keys, "Recursive listing truncated at key cap");
            objects.truncate(self.max_keys);
        }

        Ok(objects
            .into_iter()
            .filter(|meta| meta.path != prefix)
            .map(ObjectRecord::from)
            .collect())
    }

    /// Checks whether any object lives under `prefix`. The root always exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn directory_exists(&self, prefix: &str) -> Result<bool> {
        if listing_prefix(prefix).is_empty() {
            return Ok(true);
        }
        Ok(!self.list(prefix)?.is_empty())
    }

    /// Reads an object body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the object is absent, [`Error::Store`]
    /// if the backend fails.
    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        match self.backend.get(key) {
            Ok(Some((data, _))) => Ok(data),
            Ok(None) => Err(Error::not_found(key)),
            Err(e) => Err(Error::store("read", key, e)),
        }
    }

    /// Writes an object, overwriting unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<ObjectRecord> {
        debug!(key = %key, size = data.len(), content_type = %content_type, "Writing object");
        self.backend
            .put(key, data, Some(content_type))
            .map(ObjectRecord::from)
            .map_err(|e| Error::store("write", key, e))
    }

    /// Deletes an object. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn delete(&self, key: &str) -> Result<()> {
        let existed = self
            .backend
            .delete(key)
            .map_err(|e| Error::store("delete", key, e))?;
        debug!(key = %key, existed, "Deleted object");
        Ok(())
    }

    /// Renames an object by copying it and deleting the source.
    ///
    /// Not atomic. Readers may see both keys, or neither has changed yet.
    /// When both keys name the same stored object the store is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `old` does not exist (nothing changed)
    /// - [`Error::Store`] if the copy fails (nothing changed)
    /// - [`Error::PartialRename`] if the copy succeeded but the delete
    ///   failed; both keys exist and the delete may be retried
    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        if canonical_key(old) == canonical_key(new) {
            if !self.exists(old)? {
                return Err(Error::not_found(old));
            }
            debug!(key = %old, "Rename onto the same key skipped");
            return Ok(());
        }

        match self.backend.copy(old, new) {
            Ok(Some(_)) => {},
            Ok(None) => return Err(Error::not_found(old)),
            Err(e) => return Err(Error::store("copy", old, e)),
        }

        if let Err(e) = self.backend.delete(old) {
            warn!(old = %old, new = %new, error = %e, "Rename left source behind");
            return Err(Error::partial_rename(old, new, e));
        }

        debug!(old = %old, new = %new, "Renamed object");
        Ok(())
    }
}
