//! End-to-end drive scenarios.

use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use nbdrive::storage::{FilesystemBackend, MemoryBackend, StorageBackend};
use nbdrive::{BackendKind, Content, ContentFormat, ContentKind, ContentModel, Drive, DriveConfig};

use crate::common::{drive_on, save_text};

fn memory_drive() -> Drive {
    drive_on("alice", Arc::new(MemoryBackend::new()))
}

#[test]
fn notebook_save_then_get() {
    let drive = memory_drive();
    let notebook = ContentModel::document("notes/x.ipynb", json!({"cells": []}));

    let saved = drive.save(&notebook, "notes/x.ipynb").unwrap();
    assert_eq!(saved.kind, ContentKind::Document);
    assert_eq!(saved.name, "x.ipynb");
    assert!(saved.content.is_none());

    let model = drive.get("notes/x.ipynb", true, None, None).unwrap();
    assert_eq!(model.kind, ContentKind::Document);
    assert_eq!(model.format, Some(ContentFormat::Json));
    assert_eq!(model.content, Some(Content::Document(json!({"cells": []}))));
}

#[test]
fn checkpoint_list_then_delete_all() {
    let drive = memory_drive();
    drive
        .save(
            &ContentModel::document("notes/x.ipynb", json!({"cells": []})),
            "notes/x.ipynb",
        )
        .unwrap();

    drive.create_checkpoint("notes/x.ipynb").unwrap();
    let records = drive.checkpoints().list("notes/x.ipynb").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "checkpoint");

    drive.checkpoints().delete_all("notes/x.ipynb").unwrap();
    assert!(drive.checkpoints().list("notes/x.ipynb").unwrap().is_empty());
}

#[test]
fn checkpoint_directory_lists_as_a_sibling_prefix() {
    let drive = memory_drive();
    save_text(&drive, "notes/a.txt", "a");
    drive.create_checkpoint("notes/a.txt").unwrap();

    // The checkpoint directory is an ordinary prefix under its parent
    let notes = drive.get("notes", true, None, None).unwrap();
    let children: Vec<(&str, ContentKind)> = notes
        .children()
        .iter()
        .map(|c| (c.name.as_str(), c.kind))
        .collect();
    assert_eq!(
        children,
        vec![("a.txt", ContentKind::File), (".checkpoints", ContentKind::Directory)]
    );
}

#[test]
fn principals_share_a_bucket_without_seeing_each_other() {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    let alice = drive_on("alice", backend.clone());
    let bob = drive_on("bob", backend.clone());

    save_text(&alice, "a.txt", "alice's");
    save_text(&bob, "a.txt", "bob's");

    let model = alice.get("a.txt", true, None, None).unwrap();
    assert_eq!(model.content, Some(Content::Text("alice's".into())));

    alice.delete("a.txt").unwrap();
    assert!(bob.contents().file_exists("a.txt").unwrap());

    let keys: Vec<String> = backend
        .list(None)
        .unwrap()
        .into_iter()
        .map(|meta| meta.path)
        .collect();
    assert_eq!(keys, vec!["bob/a.txt"]);
}

#[test]
fn directory_rename_moves_everything_below() {
    let drive = memory_drive();
    save_text(&drive, "proj/readme.md", "# proj");
    drive
        .save(
            &ContentModel::document("proj/nb/a.ipynb", json!({"cells": [], "metadata": {}})),
            "proj/nb/a.ipynb",
        )
        .unwrap();
    drive.create_checkpoint("proj/nb/a.ipynb").unwrap();

    drive.rename("proj", "archive/proj").unwrap();

    assert!(!drive.contents().dir_exists("proj").unwrap());
    let model = drive.get("archive/proj/nb/a.ipynb", true, None, None).unwrap();
    assert_eq!(
        model.content,
        Some(Content::Document(json!({"cells": [], "metadata": {}})))
    );
    assert_eq!(drive.checkpoints().list("archive/proj/nb/a.ipynb").unwrap().len(), 1);
}

#[test]
fn binary_file_round_trip_reports_base64() {
    let drive = memory_drive();
    let bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    drive
        .save(&ContentModel::file("img/logo.png", Content::Binary(bytes.clone())), "img/logo.png")
        .unwrap();

    let model = drive.get("img/logo.png", true, None, None).unwrap();
    assert_eq!(model.mimetype.as_deref(), Some("image/png"));
    assert_eq!(model.format, Some(ContentFormat::Base64));
    assert_eq!(model.content, Some(Content::Binary(bytes)));

    let wire = serde_json::to_value(&model).unwrap();
    assert_eq!(wire["content"], "iVBORw0KGgo=");
}

#[test]
fn filesystem_drive_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let mut config = DriveConfig::memory("alice");
    config.storage.backend = BackendKind::Filesystem;
    config.storage.root = Some(dir.path().to_path_buf());

    {
        let drive = Drive::open(&config).unwrap();
        drive
            .save(&ContentModel::document("x.ipynb", json!({"cells": [1, 2]})), "x.ipynb")
            .unwrap();
        drive.create_checkpoint("x.ipynb").unwrap();
    }

    let drive = Drive::open(&config).unwrap();
    let model = drive.get("x.ipynb", true, None, None).unwrap();
    assert_eq!(model.content, Some(Content::Document(json!({"cells": [1, 2]}))));
    assert_eq!(drive.checkpoints().list("x.ipynb").unwrap().len(), 1);
    assert!(dir.path().join("alice/.checkpoints/x-checkpoint.ipynb").exists());
}

#[test]
fn filesystem_drive_picks_up_files_copied_into_the_bucket() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("alice/data")).unwrap();
    fs::write(dir.path().join("alice/data/table.csv"), "a,b\n1,2\n").unwrap();

    let backend = FilesystemBackend::open(dir.path()).unwrap();
    let drive = drive_on("alice", Arc::new(backend));

    let listing = drive.get("data", true, None, None).unwrap();
    assert_eq!(listing.children().len(), 1);
    assert_eq!(listing.children()[0].mimetype.as_deref(), Some("text/csv"));

    let model = drive.get("data/table.csv", true, None, None).unwrap();
    assert_eq!(model.content, Some(Content::Text("a,b\n1,2\n".into())));
}
