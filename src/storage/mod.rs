//! Object store backends.
//!
//! The drive only needs the primitives of a flat object store: put, get,
//! head, delete, list-by-prefix, and copy. Supported backends:
//!
//! - **FilesystemBackend**: objects as files under a root directory, metadata
//!   (content type, timestamps) tracked in redb (default for the CLI)
//! - **MemoryBackend**: fast, non-persistent storage (ideal for testing/embedding)
//!
//! # Custom Backends
//!
//! Implement the `StorageBackend` trait to put a drive on another store:
//!
//! ```ignore
//! use nbdrive::storage::StorageBackend;
//!
//! struct BucketBackend { /* ... */ }
//! impl StorageBackend for BucketBackend { /* ... */ }
//!
//! let client = StoreClient::new(Arc::new(BucketBackend::new()), 10_000);
//! ```

mod backend;
mod filesystem;
mod memory;
mod metadata;
mod types;
mod validation;

pub use backend::StorageBackend;
pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;
pub use types::{ListPage, ObjectMeta};
pub(crate) use validation::validate_key;
