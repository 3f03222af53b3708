//! Directory emulation over prefix listings.
//!
//! A directory is whatever shares a key prefix. Listing one asks the store
//! for a single delimiter-grouped page and turns it into one level of child
//! models: sub-prefixes become placeholder directories, objects become file
//! or notebook models built from the listed metadata alone.

use tracing::debug;

use crate::client::{ObjectRecord, StoreClient};
use crate::codec::classify;
use crate::error::Result;
use crate::model::{Content, ContentFormat, ContentKind, ContentModel};
use crate::scope::PathScoper;

/// Metadata-only model for a stored leaf object.
///
/// Files report `format` from the stored mime type; notebooks report none
/// until their content is read.
pub(crate) fn leaf_model(path: &str, record: &ObjectRecord) -> ContentModel {
    let kind = ContentKind::for_leaf(path);
    let mut model = ContentModel::new(kind, path);
    model.created = record.last_modified;
    model.last_modified = record.last_modified;

    if kind == ContentKind::File {
        model.format = Some(classify(&record.content_type));
        model.mimetype = Some(record.content_type.clone());
    }

    model
}

/// Builds directory models from store listings.
pub(crate) struct DirectoryAssembler<'a> {
    client: &'a StoreClient,
    scoper: &'a PathScoper,
}

impl<'a> DirectoryAssembler<'a> {
    pub(crate) fn new(client: &'a StoreClient, scoper: &'a PathScoper) -> Self {
        Self { client, scoper }
    }

    /// Directory model for the logical `path`.
    ///
    /// Without content no listing is made. With content the children are
    /// listed one level deep: files first, then sub-directories.
    pub(crate) fn assemble(&self, path: &str, include_content: bool) -> Result<ContentModel> {
        let mut model = ContentModel::directory(path);
        if !include_content {
            return Ok(model);
        }

        let listing = self.client.list(&self.scoper.scope(path))?;

        let mut children: Vec<ContentModel> =
            Vec::with_capacity(listing.objects.len() + listing.prefixes.len());

        for record in &listing.objects {
            let child_path = self.scoper.unscope(&record.key);
            children.push(leaf_model(&child_path, record));
        }

        for prefix in &listing.prefixes {
            children.push(ContentModel::directory(&self.scoper.unscope(prefix)));
        }

        debug!(
            path = %model.path,
            children = children.len(),
            truncated = listing.truncated,
            "Assembled directory"
        );

        model.format = Some(ContentFormat::Json);
        model.content = Some(Content::Directory(children));
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn setup() -> (StoreClient, PathScoper) {
        let client = StoreClient::custom(MemoryBackend::new());
        let scoper = PathScoper::new("alice");
        client.write("alice/notes/a.txt", b"a", "text/plain").unwrap();
        client.write("alice/notes/b.ipynb", b"e30=", "application/octet-stream").unwrap();
        client.write("alice/notes/img.png", b"png", "image/png").unwrap();
        client.write("alice/notes/sub/deep.txt", b"d", "text/plain").unwrap();
        client.write("bob/notes/private.txt", b"p", "text/plain").unwrap();
        (client, scoper)
    }

    #[test]
    fn test_assemble_without_content_skips_listing() {
        let (client, scoper) = setup();
        let model = DirectoryAssembler::new(&client, &scoper)
            .assemble("missing/dir", false)
            .unwrap();

        assert_eq!(model.kind, ContentKind::Directory);
        assert_eq!(model.path, "missing/dir");
        assert!(model.content.is_none());
        assert!(model.format.is_none());
    }

    #[test]
    fn test_assemble_one_level() {
        let (client, scoper) = setup();
        let model = DirectoryAssembler::new(&client, &scoper)
            .assemble("notes", true)
            .unwrap();

        assert_eq!(model.format, Some(ContentFormat::Json));
        let children = model.children();
        let summary: Vec<(&str, ContentKind)> = children
            .iter()
            .map(|c| (c.path.as_str(), c.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("notes/a.txt", ContentKind::File),
                ("notes/b.ipynb", ContentKind::Document),
                ("notes/img.png", ContentKind::File),
                ("notes/sub", ContentKind::Directory),
            ]
        );

        // Children are never expanded
        assert!(children.iter().all(|c| c.content.is_none()));
        assert_eq!(children[2].format, Some(ContentFormat::Base64));
        assert_eq!(children[2].mimetype.as_deref(), Some("image/png"));
        assert!(children[1].format.is_none());
    }

    #[test]
    fn test_assemble_root_stays_in_namespace() {
        let (client, scoper) = setup();
        let model = DirectoryAssembler::new(&client, &scoper).assemble("", true).unwrap();

        let paths: Vec<&str> = model.children().iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["notes"]);
    }
}
