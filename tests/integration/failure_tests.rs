//! Store failures surfacing through the client and the drive.

use std::sync::Arc;

use nbdrive::storage::StorageBackend;
use nbdrive::{Error, StoreClient};

use crate::common::{FaultyBackend, drive_on, save_text};

#[test]
fn rename_with_failing_delete_leaves_both_keys() {
    let backend = FaultyBackend::new();
    let client = StoreClient::new(backend.clone(), 100);
    client.write("u/old.txt", b"data", "text/plain").unwrap();

    backend.fail_deletes(true);
    let err = client.rename("u/old.txt", "u/new.txt").unwrap_err();

    assert!(matches!(&err, Error::PartialRename { old, new, .. } if old == "u/old.txt" && new == "u/new.txt"));
    assert_eq!(err.status_code(), 500);
    assert!(client.exists("u/old.txt").unwrap());
    assert!(client.exists("u/new.txt").unwrap());

    // Retrying the delete finishes the rename
    backend.fail_deletes(false);
    client.delete("u/old.txt").unwrap();
    assert!(!client.exists("u/old.txt").unwrap());
    assert_eq!(client.read("u/new.txt").unwrap(), b"data");
}

#[test]
fn rename_with_failing_copy_changes_nothing() {
    let backend = FaultyBackend::new();
    let client = StoreClient::new(backend.clone(), 100);
    client.write("u/old.txt", b"data", "text/plain").unwrap();

    backend.fail_copies(true);
    let err = client.rename("u/old.txt", "u/new.txt").unwrap_err();

    assert!(matches!(err, Error::Store { op: "copy", .. }));
    assert!(client.exists("u/old.txt").unwrap());
    assert!(!client.exists("u/new.txt").unwrap());
}

#[test]
fn drive_delete_reports_store_failure() {
    let backend = FaultyBackend::new();
    let drive = drive_on("alice", backend.clone());
    save_text(&drive, "a.txt", "a");

    backend.fail_deletes(true);
    let err = drive.delete("a.txt").unwrap_err();
    assert!(matches!(err, Error::Store { op: "delete", .. }));
    assert!(drive.contents().file_exists("a.txt").unwrap());
}

#[test]
fn directory_rename_stops_at_first_failure() {
    let backend = FaultyBackend::new();
    let drive = drive_on("alice", backend.clone());
    save_text(&drive, "d/a.txt", "a");
    save_text(&drive, "d/b.txt", "b");

    backend.fail_deletes(true);
    let err = drive.rename("d", "e").unwrap_err();
    assert!(matches!(err, Error::PartialRename { .. }));

    // The first key was copied, nothing was removed
    assert!(drive.contents().file_exists("d/a.txt").unwrap());
    assert!(drive.contents().file_exists("e/a.txt").unwrap());
    assert!(!drive.contents().file_exists("e/b.txt").unwrap());
}

#[test]
fn failing_heads_are_store_errors_not_absence() {
    let backend = FaultyBackend::new();
    let drive = drive_on("alice", backend.clone());
    save_text(&drive, "a.txt", "a");
    drive.create_checkpoint("a.txt").unwrap();
    let client = drive.contents().client();

    backend.fail_heads(true);
    assert!(matches!(client.exists("alice/a.txt"), Err(Error::Store { op: "exists", .. })));
    assert!(matches!(client.exists("alice/missing.txt"), Err(Error::Store { .. })));
    assert!(matches!(client.info("alice/a.txt"), Err(Error::Store { op: "info", .. })));
    assert!(matches!(drive.contents().file_exists("a.txt"), Err(Error::Store { .. })));

    // Kind guessed from the path, then the head fails
    let err = drive.get("a.txt", true, None, None).unwrap_err();
    assert!(matches!(err, Error::Store { .. }), "got {err}");
    assert_eq!(err.status_code(), 500);

    assert!(matches!(drive.checkpoints().list("a.txt"), Err(Error::Store { .. })));
    assert!(matches!(drive.checkpoints().list("never.txt"), Err(Error::Store { .. })));

    backend.fail_heads(false);
    assert_eq!(drive.checkpoints().list("a.txt").unwrap().len(), 1);
}

#[test]
fn failing_listings_are_store_errors_not_empty() {
    let backend = FaultyBackend::new();
    let drive = drive_on("alice", backend.clone());
    save_text(&drive, "d/a.txt", "a");
    save_text(&drive, "a.txt", "a");
    drive.create_checkpoint("a.txt").unwrap();
    let client = drive.contents().client();

    backend.fail_lists(true);
    assert!(matches!(client.list("alice/"), Err(Error::Store { op: "list", .. })));
    assert!(matches!(client.list_recursive("alice/d"), Err(Error::Store { .. })));
    assert!(matches!(client.directory_exists("alice/d"), Err(Error::Store { .. })));
    assert!(matches!(drive.contents().dir_exists("d"), Err(Error::Store { .. })));

    for path in ["d", "", "nope"] {
        let err = drive.get(path, true, None, None).unwrap_err();
        assert!(matches!(err, Error::Store { .. }), "{path:?} gave {err}");
    }
    assert!(matches!(drive.checkpoints().list_all("a.txt"), Err(Error::Store { .. })));

    backend.fail_lists(false);
    assert!(drive.contents().dir_exists("d").unwrap());
}

#[test]
fn missing_paths_map_to_not_found() {
    let drive = drive_on("alice", FaultyBackend::new());

    for err in [
        drive.get("nope.txt", true, None, None).unwrap_err(),
        drive.delete("nope.txt").unwrap_err(),
        drive.rename("nope.txt", "other.txt").unwrap_err(),
        drive.restore_checkpoint("checkpoint", "nope.txt").unwrap_err(),
    ] {
        assert!(err.is_not_found(), "expected not found, got {err}");
        assert_eq!(err.status_code(), 404);
    }
}

#[test]
fn backend_handle_is_shared_between_clients() {
    let backend: Arc<dyn StorageBackend> = FaultyBackend::new();
    let writer = StoreClient::new(backend.clone(), 10);
    let reader = StoreClient::new(backend, 10);

    writer.write("k", b"v", "text/plain").unwrap();
    assert_eq!(reader.read("k").unwrap(), b"v");
}
