//! Notebook contents and checkpoints on a flat object store.
//!
//! An object store has keys, not directories. `nbdrive` gives one principal
//! a hierarchical view over its slice of a bucket: directories are emulated
//! from key prefixes, notebooks are stored as base64 of their JSON text, and
//! checkpoints live in a `.checkpoints` directory beside the file they
//! snapshot.
//!
//! # Layers
//!
//! - [`storage`] - the [`StorageBackend`] trait plus memory and filesystem
//!   backends
//! - [`StoreClient`] - the only component that talks to a backend
//! - [`PathScoper`] - maps logical paths into the principal's namespace
//! - [`codec`] - content classification and encoding
//! - [`ContentsManager`] / [`CheckpointManager`] - host-facing operations
//! - [`Drive`] - both managers over one backend, with checkpoint cascade
//!
//! # Example
//!
//! ```
//! use nbdrive::{ContentKind, ContentModel, Drive, DriveConfig};
//! use serde_json::json;
//!
//! let drive = Drive::open(&DriveConfig::memory("alice"))?;
//! let notebook = ContentModel::document("notes/x.ipynb", json!({"cells": []}));
//! drive.save(&notebook, "notes/x.ipynb")?;
//!
//! let model = drive.get("notes/x.ipynb", true, None, None)?;
//! assert_eq!(model.kind, ContentKind::Document);
//! # Ok::<(), nbdrive::Error>(())
//! ```

#![deny(unsafe_code)]

pub mod checkpoints;
pub mod client;
pub mod codec;
pub mod config;
pub mod contents;
mod directory;
pub mod drive;
pub mod error;
pub mod model;
pub mod paths;
pub mod scope;
pub mod storage;

#[cfg(test)]
mod property_tests;

pub use checkpoints::CheckpointManager;
pub use client::{Listing, ObjectRecord, StoreClient};
pub use config::{BackendKind, DriveConfig, StorageConfig};
pub use contents::ContentsManager;
pub use drive::Drive;
pub use error::{Error, Result};
pub use model::{CheckpointContent, CheckpointRecord, Content, ContentFormat, ContentKind, ContentModel};
pub use scope::PathScoper;
pub use storage::StorageBackend;
