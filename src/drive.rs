//! The drive facade.
//!
//! A [`Drive`] pairs a [`ContentsManager`] with a [`CheckpointManager`]
//! over one backend and one principal, and keeps checkpoints following
//! their files: deleting a file deletes its checkpoints, renaming a file
//! moves them.

use std::sync::Arc;
use tracing::{info, warn};

use crate::checkpoints::CheckpointManager;
use crate::client::StoreClient;
use crate::config::{BackendKind, DriveConfig, ValidationResult};
use crate::contents::ContentsManager;
use crate::error::{Error, Result};
use crate::model::{CheckpointRecord, ContentFormat, ContentKind, ContentModel};
use crate::scope::{PathScoper, normalize};
use crate::storage::{FilesystemBackend, MemoryBackend, StorageBackend};

/// Contents and checkpoints of one principal.
#[derive(Debug, Clone)]
pub struct Drive {
    contents: ContentsManager,
    checkpoints: CheckpointManager,
}

impl Drive {
    /// Opens the backend named by `config`.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the configuration is invalid
    /// - [`Error::Store`] if the filesystem bucket cannot be opened
    pub fn open(config: &DriveConfig) -> Result<Self> {
        let validation = config.validate()?;

        let backend: Arc<dyn StorageBackend> = match config.storage.backend {
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
            BackendKind::Filesystem => {
                let root = config.storage.resolved_root()?;
                let backend = FilesystemBackend::open(&root)
                    .map_err(|e| Error::store("open", root.display().to_string(), e))?;
                Arc::new(backend)
            },
        };

        Ok(Self::build(config, backend, &validation))
    }

    /// Builds a drive over an existing backend handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn with_backend(config: &DriveConfig, backend: Arc<dyn StorageBackend>) -> Result<Self> {
        let validation = config.validate()?;
        Ok(Self::build(config, backend, &validation))
    }

    /// Assembles the managers from an already validated configuration.
    fn build(
        config: &DriveConfig,
        backend: Arc<dyn StorageBackend>,
        validation: &ValidationResult,
    ) -> Self {
        for warning in &validation.warnings {
            warn!(warning = %warning, "Configuration warning");
        }

        let client = StoreClient::new(backend, config.max_keys);
        let scoper = PathScoper::new(config.user.as_str());

        info!(
            user = %config.user,
            backend = ?config.storage.backend,
            max_keys = config.max_keys,
            "Opened drive"
        );

        Self {
            checkpoints: CheckpointManager::from_validated(
                client.clone(),
                scoper.clone(),
                config.checkpoint_id.as_str(),
            ),
            contents: ContentsManager::new(client, scoper),
        }
    }

    pub fn contents(&self) -> &ContentsManager {
        &self.contents
    }

    pub fn checkpoints(&self) -> &CheckpointManager {
        &self.checkpoints
    }

    /// See [`ContentsManager::get`].
    pub fn get(
        &self,
        path: &str,
        content: bool,
        kind: Option<ContentKind>,
        format: Option<ContentFormat>,
    ) -> Result<ContentModel> {
        self.contents.get(path, content, kind, format)
    }

    /// See [`ContentsManager::save`].
    pub fn save(&self, model: &ContentModel, path: &str) -> Result<ContentModel> {
        self.contents.save(model, path)
    }

    /// Deletes `path` and, for files, every checkpoint of it.
    ///
    /// Directory checkpoints sit under the directory's own prefix and go
    /// with it.
    ///
    /// # Errors
    ///
    /// See [`ContentsManager::delete_file`].
    pub fn delete(&self, path: &str) -> Result<()> {
        let is_file = self.contents.file_exists(path)?;
        self.contents.delete_file(path)?;
        if is_file {
            self.checkpoints.delete_all(path)?;
        }
        Ok(())
    }

    /// Renames `old_path` to `new_path` and moves a file's checkpoints along.
    ///
    /// # Errors
    ///
    /// See [`ContentsManager::rename_file`] and
    /// [`CheckpointManager::rename_all`].
    pub fn rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        let is_file = self.contents.file_exists(old_path)?;
        self.contents.rename_file(old_path, new_path)?;
        if is_file && normalize(old_path) != normalize(new_path) {
            self.checkpoints.rename_all(old_path, new_path)?;
        }
        Ok(())
    }

    /// Checkpoints the current content of `path` under the configured id.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if nothing is stored at `path`
    /// - [`Error::InvalidPath`] if `path` is a directory
    /// - [`Error::Store`] if the backend fails
    pub fn create_checkpoint(&self, path: &str) -> Result<CheckpointRecord> {
        let model = self.contents.get(path, true, None, None)?;
        self.checkpoints
            .create(&model, path, self.checkpoints.checkpoint_id())
    }

    /// Writes checkpoint `id` of `path` back onto `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the checkpoint does not exist
    /// - [`Error::Codec`] if the checkpoint cannot be decoded
    /// - [`Error::Store`] if the backend fails
    pub fn restore_checkpoint(&self, id: &str, path: &str) -> Result<ContentModel> {
        let checkpoint = self.checkpoints.get(id, path)?;

        let mut model = ContentModel::new(checkpoint.kind, path);
        model.format = Some(checkpoint.format);
        model.content = Some(checkpoint.content);

        let restored = self.contents.save(&model, path)?;
        info!(path = %restored.path, id = %id, "Restored checkpoint");
        Ok(restored)
    }
}
