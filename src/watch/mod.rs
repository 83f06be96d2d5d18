// src/watch/mod.rs

//! Polling change detection over the source tree.
//!
//! This module is responsible for:
//! - Compiling include / exclude file patterns.
//! - Walking the watch area and snapshotting modification times.
//! - Diffing two snapshots into a [`WatchState`].
//! - Correlating `test_*` sources with executables in the build area.
//!
//! It does **not** know about building or running tests; it only answers
//! "did anything change?" and "which test binaries exist?".

pub mod patterns;
pub mod snapshot;
pub mod walker;
pub mod watcher;

pub use patterns::{compile_pattern, FileFilter, PatternSet};
pub use snapshot::{diff, Snapshot, WatchState, WatchedFile};
pub use watcher::{expected_binary_name, TestBinary, Watcher, DEFAULT_TEST_PREFIX};
