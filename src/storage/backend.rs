//! Backend trait for the object store.
//!
//! Defines the primitives every store must offer (put, get, head, delete,
//! prefix listing, copy), enabling pluggable storage (filesystem, memory,
//! a remote bucket, etc.). There is no rename primitive; the store client
//! renames by copy then delete.

use super::types::{ListPage, ObjectMeta};
use anyhow::Result;

/// Backend trait for object storage.
///
/// All backends must be thread-safe (`Send + Sync`). Calls are blocking and
/// each one is a single round trip to the underlying store. Implementations
/// provide per-key read-after-write consistency and nothing stronger.
///
/// # Example
///
/// ```ignore
/// use nbdrive::storage::{MemoryBackend, StorageBackend};
///
/// let backend = MemoryBackend::new();
/// backend.put("alice/logo.png", &image_bytes, Some("image/png"))?;
/// let (data, meta) = backend.get("alice/logo.png")?.unwrap();
/// ```
pub trait StorageBackend: Send + Sync + 'static {
    /// Stores an object, overwriting any previous object at `key`.
    ///
    /// `content_type` is recorded exactly as given; backends never guess it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    fn put(&self, key: &str, data: &[u8], content_type: Option<&str>) -> Result<ObjectMeta>;

    /// Retrieves an object and its metadata.
    ///
    /// # Returns
    /// * `Ok(Some((data, meta)))` - Object found
    /// * `Ok(None)` - Object not found
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the read operation fails.
    fn get(&self, key: &str) -> Result<Option<(Vec<u8>, ObjectMeta)>>;

    /// Deletes an object.
    ///
    /// # Returns
    /// * `Ok(true)` - Object existed and was deleted
    /// * `Ok(false)` - Object did not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or deletion fails.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Retrieves object metadata without downloading the object.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or metadata cannot be read.
    fn head(&self, key: &str) -> Result<Option<ObjectMeta>>;

    /// Lists all objects, optionally filtered by key prefix, sorted by key.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    fn list(&self, prefix: Option<&str>) -> Result<Vec<ObjectMeta>>;

    /// Copies the object at `from` to `to`, keeping its content type.
    ///
    /// Returns `Ok(None)` if the source does not exist. The default
    /// implementation downloads and re-uploads; backends with a server-side
    /// copy should override it.
    ///
    /// # Errors
    ///
    /// Returns an error if either key is invalid or a store call fails.
    fn copy(&self, from: &str, to: &str) -> Result<Option<ObjectMeta>> {
        match self.get(from)? {
            Some((data, meta)) => self.put(to, &data, meta.content_type.as_deref()).map(Some),
            None => Ok(None),
        }
    }

    /// Lists the immediate children of `prefix`, grouping deeper keys into
    /// common prefixes that end at the next `delimiter`.
    ///
    /// At most `max_keys` entries (prefixes plus objects) are returned;
    /// [`ListPage::truncated`] reports whether more were available.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    fn list_delimited(&self, prefix: &str, delimiter: char, max_keys: usize) -> Result<ListPage> {
        let filter = (!prefix.is_empty()).then_some(prefix);
        let objects = self.list(filter)?;
        Ok(group_by_delimiter(prefix, delimiter, objects, max_keys))
    }
}

/// Groups a sorted flat listing into common prefixes and direct objects.
///
/// Keys sharing a common prefix are contiguous in sorted order, so each
/// prefix only needs to be compared against the last one recorded.
pub(crate) fn group_by_delimiter(
    prefix: &str,
    delimiter: char,
    objects: Vec<ObjectMeta>,
    max_keys: usize,
) -> ListPage {
    let mut page = ListPage::default();

    for meta in objects {
        let Some(rest) = meta.path.strip_prefix(prefix) else {
            continue;
        };

        match rest.find(delimiter) {
            Some(idx) => {
                let end = prefix.len() + idx + delimiter.len_utf8();
                let common = &meta.path[..end];
                if page.common_prefixes.last().is_some_and(|last| last == common) {
                    continue;
                }
                if page.len() >= max_keys {
                    page.truncated = true;
                    break;
                }
                page.common_prefixes.push(common.to_string());
            },
            None => {
                if page.len() >= max_keys {
                    page.truncated = true;
                    break;
                }
                page.objects.push(meta);
            },
        }
    }

    page
}
