//! In-memory storage backend.
//!
//! Provides a fast, non-persistent object store using DashMap for
//! concurrent access. Ideal for testing, development, and embedded use cases.

use super::backend::StorageBackend;
use super::types::ObjectMeta;
use super::validation::validate_key;
use anyhow::Result;
use dashmap::DashMap;

/// Entry stored in the memory backend.
#[derive(Clone)]
struct MemoryObject {
    data: Vec<u8>,
    meta: ObjectMeta,
}

/// In-memory object storage backend using DashMap.
///
/// Provides fast, concurrent access without persistence. All data is lost
/// when the process exits. Ideal for:
/// - Testing and development
/// - Embedding a drive inside another process
/// - Scratch buckets
///
/// # Thread Safety
///
/// `MemoryBackend` uses `DashMap` internally for sharded concurrent access.
///
/// # Example
///
/// ```ignore
/// use nbdrive::storage::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// backend.put("alice/logo.png", &image_bytes, Some("image/png"))?;
/// ```
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: DashMap<String, MemoryObject>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of objects in the store.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clears all objects from the store.
    pub fn clear(&self) {
        self.data.clear();
    }
}

impl StorageBackend for MemoryBackend {
    fn put(&self, key: &str, data: &[u8], content_type: Option<&str>) -> Result<ObjectMeta> {
        let key = validate_key(key)?;

        // Overwrites keep the original creation time
        let mut meta = ObjectMeta::new(key.clone(), data.len() as u64, content_type);
        if let Some(existing) = self.data.get(&key) {
            meta.created_at = existing.meta.created_at;
        }

        let obj = MemoryObject {
            data: data.to_vec(),
            meta: meta.clone(),
        };
        self.data.insert(key, obj);

        Ok(meta)
    }

    fn get(&self, key: &str) -> Result<Option<(Vec<u8>, ObjectMeta)>> {
        let key = validate_key(key)?;

        Ok(self.data.get(&key).map(|entry| {
            let obj = entry.value();
            (obj.data.clone(), obj.meta.clone())
        }))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let key = validate_key(key)?;
        Ok(self.data.remove(&key).is_some())
    }

    fn head(&self, key: &str) -> Result<Option<ObjectMeta>> {
        let key = validate_key(key)?;
        Ok(self.data.get(&key).map(|entry| entry.value().meta.clone()))
    }

    fn list(&self, prefix: Option<&str>) -> Result<Vec<ObjectMeta>> {
        let mut objects: Vec<ObjectMeta> = self
            .data
            .iter()
            .filter(|entry| prefix.is_none_or(|prefix| entry.key().starts_with(prefix)))
            .map(|entry| entry.value().meta.clone())
            .collect();

        // Sort by key for consistent ordering
        objects.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(objects)
    }
}
