//! redb index of object metadata for the filesystem backend.
//!
//! Entries are keyed by store key and hold JSON-encoded [`ObjectMeta`].
//! redb orders `&str` keys bytewise, so the entries under a prefix form one
//! contiguous range starting at the prefix itself.

use anyhow::{Context, Result};
use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, Table};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::types::{OBJECTS_TABLE, ObjectMeta};

/// File name of the metadata database inside the backend root.
pub(crate) const METADATA_FILE: &str = "metadata.redb";

type ObjectsTable<'txn> = Table<'txn, &'static str, &'static [u8]>;

/// Counts of entries fixed by [`MetadataIndex::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ReconcileReport {
    /// Entries whose object file is gone.
    pub orphaned: usize,
    /// Object files that had no entry.
    pub untracked: usize,
    /// Entries whose recorded size no longer matched the file.
    pub stale: usize,
}

impl ReconcileReport {
    pub(crate) fn total(&self) -> usize {
        self.orphaned + self.untracked + self.stale
    }
}

/// Metadata guessed from the key alone, for objects written by other tools.
pub(crate) fn guessed_meta(key: &str, size: u64) -> ObjectMeta {
    let content_type = mime_guess::from_path(key).first().map(|mime| mime.to_string());
    ObjectMeta::new(key, size, content_type.as_deref())
}

fn insert_entry(table: &mut ObjectsTable<'_>, meta: &ObjectMeta) -> Result<()> {
    let json = serde_json::to_vec(meta).context("Failed to serialize object metadata")?;
    table
        .insert(meta.path.as_str(), json.as_slice())
        .with_context(|| format!("Failed to index object: {}", meta.path))?;
    Ok(())
}

/// Shared handle to the metadata database.
#[derive(Clone)]
pub(crate) struct MetadataIndex {
    db: Arc<Database>,
}

impl MetadataIndex {
    /// Opens (or creates) the index at `path` and makes sure the objects
    /// table exists.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)
            .with_context(|| format!("Failed to open metadata index: {}", path.display()))?;

        let write_txn = db
            .begin_write()
            .context("Failed to begin initialization transaction")?;
        write_txn
            .open_table(OBJECTS_TABLE)
            .context("Failed to initialize objects table")?;
        write_txn
            .commit()
            .context("Failed to commit initialization transaction")?;

        Ok(Self { db: Arc::new(db) })
    }

    pub(crate) fn get(&self, key: &str) -> Result<Option<ObjectMeta>> {
        let read_txn = self.db.begin_read().context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(OBJECTS_TABLE)
            .context("Failed to open objects table")?;

        let Some(guard) = table
            .get(key)
            .with_context(|| format!("Failed to read object metadata: {key}"))?
        else {
            return Ok(None);
        };

        serde_json::from_slice(guard.value())
            .map(Some)
            .with_context(|| format!("Corrupt object metadata: {key}"))
    }

    pub(crate) fn insert(&self, meta: &ObjectMeta) -> Result<()> {
        let write_txn = self.db.begin_write().context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(OBJECTS_TABLE)
                .context("Failed to open objects table")?;
            insert_entry(&mut table, meta)?;
        }
        write_txn.commit().context("Failed to commit metadata write")
    }

    /// Drops the entry for `key`; absent entries are fine.
    pub(crate) fn remove(&self, key: &str) -> Result<()> {
        let write_txn = self.db.begin_write().context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(OBJECTS_TABLE)
                .context("Failed to open objects table")?;
            table
                .remove(key)
                .with_context(|| format!("Failed to unindex object: {key}"))?;
        }
        write_txn.commit().context("Failed to commit metadata removal")
    }

    /// Entries whose key starts with `prefix`, in key order.
    ///
    /// Reads only the range at and after `prefix`, stopping at the first key
    /// outside it. Unreadable entries are skipped with a warning.
    pub(crate) fn scan(&self, prefix: Option<&str>) -> Result<Vec<ObjectMeta>> {
        let read_txn = self.db.begin_read().context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(OBJECTS_TABLE)
            .context("Failed to open objects table")?;

        let prefix = prefix.unwrap_or_default();
        let range = table
            .range(prefix..)
            .with_context(|| format!("Failed to scan objects under '{prefix}'"))?;

        let mut objects = Vec::new();
        for item in range {
            let (key, value) = item.context("Failed to read object entry")?;
            if !key.value().starts_with(prefix) {
                break;
            }
            match serde_json::from_slice::<ObjectMeta>(value.value()) {
                Ok(meta) => objects.push(meta),
                Err(e) => {
                    tracing::warn!(key = %key.value(), error = %e, "Skipping unreadable metadata entry");
                },
            }
        }
        Ok(objects)
    }

    /// Brings the index in line with the files under `root`, in a single
    /// write transaction.
    ///
    /// Entries without a file are dropped, files without an entry are
    /// indexed with a content type guessed from the key, and entries whose
    /// size disagrees with the file (or that cannot be decoded) are
    /// rewritten.
    pub(crate) fn reconcile(&self, root: &Path) -> Result<ReconcileReport> {
        let mut on_disk = walk_objects(root)?;
        let mut report = ReconcileReport::default();

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin reconciliation transaction")?;
        {
            let mut table = write_txn
                .open_table(OBJECTS_TABLE)
                .context("Failed to open objects table for reconciliation")?;

            let mut removals: Vec<String> = Vec::new();
            let mut rewrites: Vec<ObjectMeta> = Vec::new();

            for item in table.iter().context("Failed to iterate objects table")? {
                let (key, value) = item.context("Failed to read object entry")?;
                let key = key.value();

                let Some(size) = on_disk.remove(key) else {
                    removals.push(key.to_string());
                    continue;
                };

                match serde_json::from_slice::<ObjectMeta>(value.value()) {
                    Ok(meta) if meta.size == size => {},
                    Ok(mut meta) => {
                        meta.size = size;
                        meta.modified_at = Utc::now();
                        rewrites.push(meta);
                    },
                    Err(_) => rewrites.push(guessed_meta(key, size)),
                }
            }

            for key in &removals {
                table
                    .remove(key.as_str())
                    .with_context(|| format!("Failed to unindex object: {key}"))?;
            }
            for meta in &rewrites {
                insert_entry(&mut table, meta)?;
            }
            for (key, size) in &on_disk {
                insert_entry(&mut table, &guessed_meta(key, *size))?;
            }

            report.orphaned = removals.len();
            report.stale = rewrites.len();
            report.untracked = on_disk.len();
        }
        write_txn
            .commit()
            .context("Failed to commit reconciliation transaction")?;

        if report.total() > 0 {
            tracing::info!(
                root = %root.display(),
                orphaned = report.orphaned,
                untracked = report.untracked,
                stale = report.stale,
                "Reconciled object index"
            );
        } else {
            tracing::debug!(root = %root.display(), "Object index is consistent");
        }

        Ok(report)
    }
}

fn is_index_file(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == METADATA_FILE)
        || path.extension().is_some_and(|ext| ext == "lock")
}

/// Store keys and sizes of every object file under `root`.
fn walk_objects(root: &Path) -> Result<BTreeMap<String, u64>> {
    let mut objects = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .with_context(|| format!("Failed to stat: {}", path.display()))?;

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if !file_type.is_file() || is_index_file(&path) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };

            let key = relative
                .components()
                .map(|part| part.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let size = entry
                .metadata()
                .with_context(|| format!("Failed to stat: {}", path.display()))?
                .len();
            objects.insert(key, size);
        }
    }

    Ok(objects)
}
