//! Shared helpers for the integration tests.

use anyhow::{Result, bail};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nbdrive::storage::{MemoryBackend, ObjectMeta, StorageBackend};
use nbdrive::{Content, ContentModel, Drive, DriveConfig};

/// Memory backend whose deletes, copies, heads and listings can be made
/// to fail.
#[derive(Default)]
pub struct FaultyBackend {
    inner: MemoryBackend,
    fail_deletes: AtomicBool,
    fail_copies: AtomicBool,
    fail_heads: AtomicBool,
    fail_lists: AtomicBool,
}

impl FaultyBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_copies(&self, fail: bool) {
        self.fail_copies.store(fail, Ordering::SeqCst);
    }

    pub fn fail_heads(&self, fail: bool) {
        self.fail_heads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }
}

impl StorageBackend for FaultyBackend {
    fn put(&self, key: &str, data: &[u8], content_type: Option<&str>) -> Result<ObjectMeta> {
        self.inner.put(key, data, content_type)
    }

    fn get(&self, key: &str) -> Result<Option<(Vec<u8>, ObjectMeta)>> {
        self.inner.get(key)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            bail!("injected delete failure for {key}");
        }
        self.inner.delete(key)
    }

    fn head(&self, key: &str) -> Result<Option<ObjectMeta>> {
        if self.fail_heads.load(Ordering::SeqCst) {
            bail!("injected head failure for {key}");
        }
        self.inner.head(key)
    }

    fn list(&self, prefix: Option<&str>) -> Result<Vec<ObjectMeta>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            bail!("injected list failure under {}", prefix.unwrap_or("<root>"));
        }
        self.inner.list(prefix)
    }

    fn copy(&self, from: &str, to: &str) -> Result<Option<ObjectMeta>> {
        if self.fail_copies.load(Ordering::SeqCst) {
            bail!("injected copy failure for {from}");
        }
        self.inner.copy(from, to)
    }
}

/// Drive for `user` over a shared backend handle.
pub fn drive_on(user: &str, backend: Arc<dyn StorageBackend>) -> Drive {
    Drive::with_backend(&DriveConfig::memory(user), backend).expect("drive should open")
}

/// Save a text file at `path`.
pub fn save_text(drive: &Drive, path: &str, text: &str) {
    drive
        .save(&ContentModel::file(path, Content::Text(text.into())), path)
        .expect("save should succeed");
}
