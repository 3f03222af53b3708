//! Checkpoints stored beside the content they snapshot.
//!
//! A checkpoint of `notes/x.ipynb` with id `checkpoint` lives at
//! `notes/.checkpoints/x-checkpoint.ipynb` in the owner's namespace. The
//! name encodes the id between the base name and the extension, so the
//! checkpoints of one path can be found again by listing its parent's
//! `.checkpoints` directory and parsing names back.

use tracing::{debug, info};

use crate::client::StoreClient;
use crate::codec::{DOCUMENT_MIMETYPE, decode_document, decode_file, encode_document, encode_file};
use crate::error::{Error, Result};
use crate::model::{CheckpointContent, CheckpointRecord, Content, ContentFormat, ContentKind, ContentModel};
use crate::scope::{PathScoper, normalize};

/// Directory holding the checkpoints of its parent's entries.
pub const CHECKPOINT_DIR: &str = ".checkpoints";

/// Checkpoint id used when none is configured.
pub const DEFAULT_CHECKPOINT_ID: &str = "checkpoint";

/// Rejects ids that would make checkpoint names ambiguous.
///
/// # Errors
///
/// Returns [`Error::InvalidCheckpointId`] for empty ids and ids containing
/// `-`, `.` or `/`.
pub fn validate_checkpoint_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains(['-', '.', '/']) {
        return Err(Error::InvalidCheckpointId(id.to_string()));
    }
    Ok(())
}

/// Splits a file name at its last dot, ignoring leading dots.
fn split_ext(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}

fn split_parent(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

fn checkpoint_dir(parent: &str) -> String {
    if parent.is_empty() {
        CHECKPOINT_DIR.to_string()
    } else {
        format!("{parent}/{CHECKPOINT_DIR}")
    }
}

/// Id encoded in checkpoint file `name` if it belongs to `base` + `ext`.
fn parse_checkpoint_name<'a>(name: &'a str, base: &str, ext: &str) -> Option<&'a str> {
    let (stem, name_ext) = split_ext(name);
    if name_ext != ext {
        return None;
    }
    let (name_base, id) = stem.rsplit_once('-')?;
    (name_base == base && validate_checkpoint_id(id).is_ok()).then_some(id)
}

/// Logical path of checkpoint `id` of `path`.
///
/// # Examples
///
/// ```
/// use nbdrive::checkpoints::checkpoint_path;
///
/// assert_eq!(checkpoint_path("chk", "a/b/c.txt")?, "a/b/.checkpoints/c-chk.txt");
/// assert_eq!(checkpoint_path("chk", "top.ipynb")?, ".checkpoints/top-chk.ipynb");
/// # Ok::<(), nbdrive::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidCheckpointId`] for a bad id and
/// [`Error::InvalidPath`] for the root path.
pub fn checkpoint_path(id: &str, path: &str) -> Result<String> {
    validate_checkpoint_id(id)?;
    let path = normalize(path);
    if path.is_empty() {
        return Err(Error::invalid_path(path, "the root directory has no checkpoints"));
    }

    let (parent, name) = split_parent(path);
    let (base, ext) = split_ext(name);
    Ok(format!("{}/{base}-{id}{ext}", checkpoint_dir(parent)))
}

/// Checkpoint operations over one principal's namespace.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    client: StoreClient,
    scoper: PathScoper,
    checkpoint_id: String,
}

impl CheckpointManager {
    /// Creates a manager whose single reachable slot is `checkpoint_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCheckpointId`] if the id is not usable.
    pub fn new(client: StoreClient, scoper: PathScoper, checkpoint_id: impl Into<String>) -> Result<Self> {
        let checkpoint_id: String = checkpoint_id.into();
        validate_checkpoint_id(&checkpoint_id)?;
        Ok(Self::from_validated(client, scoper, checkpoint_id))
    }

    pub(crate) fn from_validated(
        client: StoreClient,
        scoper: PathScoper,
        checkpoint_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            scoper,
            checkpoint_id: checkpoint_id.into(),
        }
    }

    /// The id [`list`](Self::list) looks for.
    pub fn checkpoint_id(&self) -> &str {
        &self.checkpoint_id
    }

    fn key(&self, id: &str, path: &str) -> Result<String> {
        Ok(self.scoper.scope(&checkpoint_path(id, path)?))
    }

    fn record(&self, id: &str, path: &str, key: &str) -> Result<CheckpointRecord> {
        let info = self.client.info(key)?;
        Ok(CheckpointRecord {
            id: id.to_string(),
            path: normalize(path).to_string(),
            last_modified: info.last_modified,
        })
    }

    /// Stores `model`'s content as checkpoint `id` of `path`, replacing any
    /// previous checkpoint with that id.
    ///
    /// # Errors
    ///
    /// - [`Error::Codec`] if the content does not match the model kind
    /// - [`Error::InvalidPath`] for directory models
    /// - [`Error::Store`] if the backend fails
    pub fn create(&self, model: &ContentModel, path: &str, id: &str) -> Result<CheckpointRecord> {
        let key = self.key(id, path)?;

        match (model.kind, &model.content) {
            (ContentKind::Document, Some(Content::Document(document))) => {
                let blob = encode_document(document)?;
                self.client.write(&key, &blob, DOCUMENT_MIMETYPE)?;
            },
            (ContentKind::Document, _) => {
                return Err(Error::codec("notebook checkpoints need JSON content"));
            },
            (ContentKind::File, Some(body)) => {
                let bytes = encode_file(body)?;
                let format = model.format.unwrap_or_else(|| body.format());
                self.client.write(&key, &bytes, format.mimetype())?;
            },
            (ContentKind::File, None) => {
                return Err(Error::codec("file checkpoints need content"));
            },
            (ContentKind::Directory, _) => {
                return Err(Error::invalid_path(path, "directories cannot be checkpointed"));
            },
        }

        debug!(path = %normalize(path), id = %id, key = %key, "Created checkpoint");
        self.record(id, path, &key)
    }

    /// Reads checkpoint `id` of `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no such checkpoint exists
    /// - [`Error::Codec`] if the stored checkpoint cannot be decoded
    /// - [`Error::Store`] if the backend fails
    pub fn get(&self, id: &str, path: &str) -> Result<CheckpointContent> {
        let key = self.key(id, path)?;
        let info = self.client.info(&key)?;
        let bytes = self.client.read(&key)?;

        match ContentKind::for_leaf(normalize(path)) {
            ContentKind::Document => Ok(CheckpointContent {
                kind: ContentKind::Document,
                content: Content::Document(decode_document(&bytes)?),
                format: ContentFormat::Json,
            }),
            kind => {
                let (content, format) = decode_file(bytes, &info.content_type, None)?;
                Ok(CheckpointContent {
                    kind,
                    content,
                    format,
                })
            },
        }
    }

    /// Checkpoints of `path` under the configured id: zero or one record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn list(&self, path: &str) -> Result<Vec<CheckpointRecord>> {
        let key = self.key(&self.checkpoint_id, path)?;
        match self.record(&self.checkpoint_id, path, &key) {
            Ok(record) => Ok(vec![record]),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Every checkpoint of `path`, whatever its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn list_all(&self, path: &str) -> Result<Vec<CheckpointRecord>> {
        let path = normalize(path);
        if path.is_empty() {
            return Ok(Vec::new());
        }
        let (parent, name) = split_parent(path);
        let (base, ext) = split_ext(name);

        let listing = self.client.list(&self.scoper.scope(&checkpoint_dir(parent)))?;
        Ok(listing
            .objects
            .into_iter()
            .filter_map(|object| {
                let file = object.key.rsplit('/').next()?;
                let id = parse_checkpoint_name(file, base, ext)?;
                Some(CheckpointRecord {
                    id: id.to_string(),
                    path: path.to_string(),
                    last_modified: object.last_modified,
                })
            })
            .collect())
    }

    /// Deletes checkpoint `id` of `path`. Deleting an absent checkpoint
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn delete_one(&self, id: &str, path: &str) -> Result<()> {
        let key = self.key(id, path)?;
        self.client.delete(&key)
    }

    /// Deletes every checkpoint of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn delete_all(&self, path: &str) -> Result<()> {
        let records = self.list_all(path)?;
        for record in &records {
            self.delete_one(&record.id, &record.path)?;
        }
        if !records.is_empty() {
            info!(path = %normalize(path), count = records.len(), "Deleted checkpoints");
        }
        Ok(())
    }

    /// Moves every checkpoint of `old_path` to the same id under `new_path`.
    ///
    /// Stops at the first failure; checkpoints moved before it stay moved.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPath`] if `new_path` is the root
    /// - [`Error::PartialRename`] if a source checkpoint could not be removed
    /// - [`Error::Store`] if the backend fails
    pub fn rename_all(&self, old_path: &str, new_path: &str) -> Result<()> {
        let records = self.list_all(old_path)?;
        for record in &records {
            let old_key = self.key(&record.id, old_path)?;
            let new_key = self.key(&record.id, new_path)?;
            self.client.rename(&old_key, &new_key)?;
        }
        if !records.is_empty() {
            info!(
                old = %normalize(old_path),
                new = %normalize(new_path),
                count = records.len(),
                "Renamed checkpoints"
            );
        }
        Ok(())
    }
}
