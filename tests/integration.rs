//! Integration test runner for nbdrive.
//!
//! The tests are organized in the `integration/` subdirectory.
//!
//! Run tests with:
//! ```bash
//! cargo test --test integration
//! ```

#[path = "integration/common.rs"]
mod common;

// End-to-end drive scenarios on the memory and filesystem backends
#[path = "integration/drive_tests.rs"]
mod drive_tests;

// Store failures surfacing through the client and the drive
#[path = "integration/failure_tests.rs"]
mod failure_tests;
