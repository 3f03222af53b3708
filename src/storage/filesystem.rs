//! Filesystem-backed storage backend.
//!
//! Provides persistent object storage using the local filesystem with
//! metadata tracked in redb. Each object lives at `<root>/<key>`.
//!
//! A bucket can hold both `a` and `a/b`; a filesystem cannot hold a file
//! and a directory of the same name, so such a pair is rejected on write.

use super::backend::StorageBackend;
use super::metadata::{METADATA_FILE, MetadataIndex, guessed_meta};
use super::types::ObjectMeta;
use super::validation::{object_path, validate_key};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem-backed object storage backend.
///
/// Stores objects on the filesystem with metadata tracked in redb for
/// fast queries and listing operations.
///
/// # Thread Safety
///
/// `FilesystemBackend` is `Clone` and can be shared across threads. The underlying
/// database handles concurrent access safely.
#[derive(Clone)]
pub struct FilesystemBackend {
    base_dir: PathBuf,
    index: MetadataIndex,
}

impl FilesystemBackend {
    /// Creates or opens the storage backend at the given base directory.
    ///
    /// # Arguments
    /// * `base_dir` - Root directory for object storage (e.g., ~/.nbdrive/bucket)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Storage directory cannot be created
    /// - Metadata database cannot be opened or initialized
    /// - Metadata reconciliation fails
    pub fn open<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir).with_context(|| {
            format!("Failed to create storage directory: {}", base_dir.display())
        })?;

        let index = MetadataIndex::open(&base_dir.join(METADATA_FILE))?;
        let backend = Self { base_dir, index };
        backend.reconcile()?;

        Ok(backend)
    }

    /// Root directory of this backend.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Reconciles the metadata database with the object directory.
    ///
    /// # Errors
    ///
    /// Returns an error if directory scanning fails or database operations fail.
    pub fn reconcile(&self) -> Result<()> {
        self.index.reconcile(&self.base_dir).map(|_| ())
    }

    /// Metadata for an object whose file exists but was never recorded.
    fn reconstruct_meta(&self, key: &str, file_path: &Path) -> Result<ObjectMeta> {
        let metadata = fs::metadata(file_path)
            .with_context(|| format!("Failed to get file metadata: {key}"))?;
        Ok(guessed_meta(key, metadata.len()))
    }

    /// Removes now-empty directories between a deleted file and the root.
    fn prune_empty_parents(&self, file_path: &Path) {
        let mut dir = file_path.parent();
        while let Some(current) = dir {
            if current == self.base_dir || fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
    }
}

impl StorageBackend for FilesystemBackend {
    fn put(&self, key: &str, data: &[u8], content_type: Option<&str>) -> Result<ObjectMeta> {
        let key = validate_key(key)?;
        let file_path = object_path(&self.base_dir, &key)?;

        if file_path.is_dir() {
            anyhow::bail!("Object key collides with an existing key prefix: {key}");
        }

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create parent directories for: {key}"))?;
        }

        fs::write(&file_path, data).with_context(|| format!("Failed to write object: {key}"))?;

        // Overwrites keep the original creation time
        let mut meta = ObjectMeta::new(key.clone(), data.len() as u64, content_type);
        if let Some(existing) = self.index.get(&key)? {
            meta.created_at = existing.created_at;
        }

        self.index.insert(&meta)?;

        Ok(meta)
    }

    fn get(&self, key: &str) -> Result<Option<(Vec<u8>, ObjectMeta)>> {
        let key = validate_key(key)?;
        let file_path = object_path(&self.base_dir, &key)?;

        if !file_path.is_file() {
            return Ok(None);
        }

        let data = fs::read(&file_path).with_context(|| format!("Failed to read object: {key}"))?;

        let meta = match self.index.get(&key)? {
            Some(meta) => meta,
            None => self.reconstruct_meta(&key, &file_path)?,
        };

        Ok(Some((data, meta)))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let key = validate_key(key)?;
        let file_path = object_path(&self.base_dir, &key)?;

        if !file_path.is_file() {
            // Drop any orphaned entry
            self.index.remove(&key)?;
            return Ok(false);
        }

        fs::remove_file(&file_path).with_context(|| format!("Failed to delete object: {key}"))?;
        self.index.remove(&key)?;
        self.prune_empty_parents(&file_path);

        Ok(true)
    }

    fn head(&self, key: &str) -> Result<Option<ObjectMeta>> {
        let key = validate_key(key)?;
        let file_path = object_path(&self.base_dir, &key)?;

        if !file_path.is_file() {
            return Ok(None);
        }

        match self.index.get(&key)? {
            Some(meta) => Ok(Some(meta)),
            None => self.reconstruct_meta(&key, &file_path).map(Some),
        }
    }

    fn list(&self, prefix: Option<&str>) -> Result<Vec<ObjectMeta>> {
        self.index.scan(prefix)
    }

    fn copy(&self, from: &str, to: &str) -> Result<Option<ObjectMeta>> {
        let Some(source) = self.head(from)? else {
            return Ok(None);
        };

        let to = validate_key(to)?;
        if to == source.path {
            return Ok(Some(source));
        }
        let src_path = object_path(&self.base_dir, &source.path)?;
        let dst_path = object_path(&self.base_dir, &to)?;

        if dst_path.is_dir() {
            anyhow::bail!("Object key collides with an existing key prefix: {to}");
        }
        if let Some(parent) = dst_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create parent directories for: {to}"))?;
        }

        fs::copy(&src_path, &dst_path)
            .with_context(|| format!("Failed to copy object {} to {to}", source.path))?;

        let meta = ObjectMeta::new(to, source.size, source.content_type.as_deref());
        self.index.insert(&meta)?;

        Ok(Some(meta))
    }
}
