//! Host-facing contents operations.
//!
//! [`ContentsManager`] answers get / save / delete / rename for logical
//! paths, dispatching on [`ContentKind`]. Every path is scoped to the
//! configured principal before it reaches the store.

use tracing::{debug, info};

use crate::client::{StoreClient, canonical_key, listing_prefix};
use crate::codec::{DOCUMENT_MIMETYPE, decode_document, decode_file, encode_document, encode_file};
use crate::directory::DirectoryAssembler;
use crate::error::{Error, Result};
use crate::model::{Content, ContentFormat, ContentKind, ContentModel, DOCUMENT_EXTENSION};
use crate::scope::{PathScoper, normalize};

/// Contents operations over one principal's namespace.
#[derive(Debug, Clone)]
pub struct ContentsManager {
    client: StoreClient,
    scoper: PathScoper,
}

impl ContentsManager {
    pub fn new(client: StoreClient, scoper: PathScoper) -> Self {
        Self { client, scoper }
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    pub fn scoper(&self) -> &PathScoper {
        &self.scoper
    }

    fn is_root_key(&self, key: &str) -> bool {
        key == canonical_key(&self.scoper.scope(""))
    }

    fn guess_kind(&self, path: &str) -> Result<ContentKind> {
        if path.ends_with(DOCUMENT_EXTENSION) {
            Ok(ContentKind::Document)
        } else if self.dir_exists(path)? {
            Ok(ContentKind::Directory)
        } else {
            Ok(ContentKind::File)
        }
    }

    /// Model for `path`, with content when `content` is set.
    ///
    /// Without an explicit `kind`, `.ipynb` paths are documents, paths with
    /// keys under them are directories, and anything else is a file.
    /// `format` only applies to files.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if a file or document is absent
    /// - [`Error::Codec`] if stored content cannot be decoded as asked
    /// - [`Error::Store`] if the backend fails
    pub fn get(
        &self,
        path: &str,
        content: bool,
        kind: Option<ContentKind>,
        format: Option<ContentFormat>,
    ) -> Result<ContentModel> {
        let path = normalize(path);
        let kind = match kind {
            Some(kind) => kind,
            None => self.guess_kind(path)?,
        };

        debug!(path = %path, kind = %kind, content, "Getting model");

        match kind {
            ContentKind::Directory => {
                DirectoryAssembler::new(&self.client, &self.scoper).assemble(path, content)
            },
            ContentKind::Document => self.get_document(path, content),
            ContentKind::File => self.get_file(path, content, format),
        }
    }

    fn get_file(
        &self,
        path: &str,
        content: bool,
        format: Option<ContentFormat>,
    ) -> Result<ContentModel> {
        let key = self.scoper.scope(path);
        let record = self.client.info(&key)?;

        let mut model = ContentModel::new(ContentKind::File, path);
        model.created = record.last_modified;
        model.last_modified = record.last_modified;
        model.format = format;
        model.mimetype = Some(record.content_type.clone());

        if content {
            let bytes = self.client.read(&key)?;
            let (body, format) = decode_file(bytes, &record.content_type, format)?;
            model.content = Some(body);
            model.format = Some(format);
        }

        Ok(model)
    }

    fn get_document(&self, path: &str, content: bool) -> Result<ContentModel> {
        let key = self.scoper.scope(path);
        let record = self.client.info(&key)?;

        let mut model = ContentModel::new(ContentKind::Document, path);
        model.created = record.last_modified;
        model.last_modified = record.last_modified;

        if content {
            let document = decode_document(&self.client.read(&key)?)?;
            model.content = Some(Content::Document(document));
            model.format = Some(ContentFormat::Json);
        }

        Ok(model)
    }

    /// Stores `model` at `path` and returns the metadata-only model of the
    /// result.
    ///
    /// Directory models write nothing: a directory exists once something is
    /// saved under it.
    ///
    /// # Errors
    ///
    /// - [`Error::Codec`] if the content does not match the model kind
    /// - [`Error::Store`] if the backend fails
    pub fn save(&self, model: &ContentModel, path: &str) -> Result<ContentModel> {
        let path = normalize(path);
        let key = self.scoper.scope(path);

        match model.kind {
            ContentKind::Document => {
                let Some(Content::Document(document)) = &model.content else {
                    return Err(Error::codec("notebook models must carry JSON content"));
                };
                let blob = encode_document(document)?;
                self.client.write(&key, &blob, DOCUMENT_MIMETYPE)?;
            },
            ContentKind::File => {
                let body = model
                    .content
                    .as_ref()
                    .ok_or_else(|| Error::codec("file models must carry content"))?;
                let bytes = encode_file(body)?;
                let format = model.format.unwrap_or_else(|| body.format());
                let mimetype = mime_guess::from_path(path)
                    .first()
                    .map(|mime| mime.essence_str().to_string())
                    .unwrap_or_else(|| format.mimetype().to_string());
                self.client.write(&key, &bytes, &mimetype)?;
            },
            ContentKind::Directory => {
                debug!(path = %path, "Directory save writes nothing");
            },
        }

        let mut saved = self.get(path, false, Some(model.kind), None)?;
        saved.format = None;
        Ok(saved)
    }

    /// Deletes a file, or every key under a directory.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPath`] for the namespace root
    /// - [`Error::NotFound`] if nothing lives at `path`
    /// - [`Error::Store`] if the backend fails
    pub fn delete_file(&self, path: &str) -> Result<()> {
        let path = normalize(path);
        let key = canonical_key(&self.scoper.scope(path));
        if path.is_empty() || self.is_root_key(&key) {
            return Err(Error::invalid_path(path, "the root directory cannot be deleted"));
        }

        if self.client.exists(&key)? {
            return self.client.delete(&key);
        }

        if self.client.directory_exists(&key)? {
            let records = self.client.list_recursive(&key)?;
            for record in &records {
                self.client.delete(&record.key)?;
            }
            info!(path = %path, deleted = records.len(), "Deleted directory");
            return Ok(());
        }

        Err(Error::not_found(key))
    }

    /// Renames a file, or every key under a directory.
    ///
    /// A rename onto the same path does nothing. Existing keys at the
    /// destination are overwritten.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPath`] for the namespace root or a directory moved
    ///   into itself
    /// - [`Error::NotFound`] if nothing lives at `old_path`
    /// - [`Error::PartialRename`] if a source key could not be removed
    /// - [`Error::Store`] if the backend fails
    pub fn rename_file(&self, old_path: &str, new_path: &str) -> Result<()> {
        let old_path = normalize(old_path);
        let new_path = normalize(new_path);
        let old_key = canonical_key(&self.scoper.scope(old_path));
        let new_key = canonical_key(&self.scoper.scope(new_path));

        if old_path.is_empty()
            || new_path.is_empty()
            || self.is_root_key(&old_key)
            || self.is_root_key(&new_key)
        {
            return Err(Error::invalid_path(old_path, "the root directory cannot be renamed"));
        }
        if old_key == new_key {
            return Ok(());
        }

        if self.client.exists(&old_key)? {
            return self.client.rename(&old_key, &new_key);
        }

        if self.client.directory_exists(&old_key)? {
            let old_prefix = listing_prefix(&old_key);
            if new_key.starts_with(&old_prefix) {
                return Err(Error::invalid_path(
                    new_path,
                    format!("cannot move '{old_path}' into itself"),
                ));
            }

            let new_prefix = listing_prefix(&new_key);
            let records = self.client.list_recursive(&old_key)?;
            for record in &records {
                let Some(rest) = record.key.strip_prefix(&old_prefix) else {
                    continue;
                };
                self.client.rename(&record.key, &format!("{new_prefix}{rest}"))?;
            }
            info!(old = %old_path, new = %new_path, moved = records.len(), "Renamed directory");
            return Ok(());
        }

        Err(Error::not_found(old_key))
    }

    /// Checks whether a file or document is stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn file_exists(&self, path: &str) -> Result<bool> {
        let path = normalize(path);
        if path.is_empty() {
            return Ok(false);
        }
        self.client.exists(&self.scoper.scope(path))
    }

    /// Checks whether anything is stored under `path`. The root always exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backend fails.
    pub fn dir_exists(&self, path: &str) -> Result<bool> {
        let path = normalize(path);
        if path.is_empty() {
            return Ok(true);
        }
        self.client.directory_exists(&self.scoper.scope(path))
    }
}
