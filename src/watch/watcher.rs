// src/watch/watcher.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::engine::ChangeSource;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::patterns::FileFilter;
use crate::watch::snapshot::{diff, Snapshot, WatchState, WatchedFile};
use crate::watch::walker::{walk, VCS_EXCLUSIONS};

/// File name prefix identifying test sources (`test_core.cc`).
pub const DEFAULT_TEST_PREFIX: &str = "test_";

/// A test executable found in the build area, with the source it came from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestBinary {
    /// Source file path relative to the watch root.
    pub source: PathBuf,
    /// Absolute path of the executable.
    pub executable: PathBuf,
}

/// Tracks the modification times of files under the watch root by polling.
///
/// Every [`poll`](Watcher::poll) re-walks the whole tree; there is no OS
/// change notification involved, so network drives work too.
#[derive(Debug)]
pub struct Watcher {
    fs: Arc<dyn FileSystem>,
    watch_path: PathBuf,
    build_path: Option<PathBuf>,
    filter: FileFilter,
    test_prefix: String,
    snapshot: Snapshot,
}

impl Watcher {
    pub fn new(watch_path: impl Into<PathBuf>, build_path: Option<PathBuf>, filter: FileFilter) -> Self {
        Self::with_fs(Arc::new(RealFileSystem), watch_path, build_path, filter)
    }

    pub fn with_fs(
        fs: Arc<dyn FileSystem>,
        watch_path: impl Into<PathBuf>,
        build_path: Option<PathBuf>,
        filter: FileFilter,
    ) -> Self {
        Self {
            fs,
            watch_path: watch_path.into(),
            build_path,
            filter,
            test_prefix: DEFAULT_TEST_PREFIX.to_string(),
            snapshot: Snapshot::new(),
        }
    }

    pub fn with_test_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.test_prefix = prefix.into();
        self
    }

    pub fn watch_path(&self) -> &Path {
        &self.watch_path
    }

    pub fn build_path(&self) -> Option<&Path> {
        self.build_path.as_deref()
    }

    /// Files tracked by the most recent poll.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Re-walk the watch area and report what changed since the last poll.
    pub fn poll(&mut self) -> Result<WatchState> {
        let started = Instant::now();
        let mut current = Snapshot::new();

        for entry in walk(self.fs.as_ref(), &self.watch_path, VCS_EXCLUSIONS)? {
            let candidate = entry.path.to_string_lossy();
            if !self.filter.tracks(&candidate) {
                continue;
            }
            let relpath = entry
                .path
                .strip_prefix(&self.watch_path)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path.clone());
            current.insert(
                entry.path.clone(),
                WatchedFile {
                    name: entry.name,
                    relpath,
                    mtime: entry.meta.modified,
                },
            );
        }

        let state = diff(&self.snapshot, &current, started.elapsed());
        debug!(
            tracked = current.len(),
            inserts = state.inserts.len(),
            updates = state.updates.len(),
            deletes = state.deletes.len(),
            walk_ms = state.walk_time.as_millis() as u64,
            "polled watch area"
        );
        self.snapshot = current;
        Ok(state)
    }

    /// Find the test executables under `build_root` that were compiled from
    /// tracked sources whose file name starts with `prefix`.
    ///
    /// `test_core.cc` is expected to produce `test_core` (`test_core.exe` on
    /// Windows); only files with the owner-execute bit qualify.
    pub fn test_binaries_in(&self, build_root: &Path, prefix: &str) -> Result<Vec<TestBinary>> {
        let expected: HashMap<String, &Path> = self
            .snapshot
            .values()
            .filter(|w| w.name.starts_with(prefix))
            .map(|w| (expected_binary_name(&w.name), w.relpath.as_path()))
            .collect();

        if expected.is_empty() {
            return Ok(Vec::new());
        }

        let mut binaries: Vec<TestBinary> = walk(self.fs.as_ref(), build_root, &[])?
            .into_iter()
            .filter(|entry| entry.meta.owner_executable)
            .filter_map(|entry| {
                expected.get(&entry.name).map(|source| TestBinary {
                    source: source.to_path_buf(),
                    executable: entry.path,
                })
            })
            .collect();
        binaries.sort();

        info!(count = binaries.len(), "discovered test binaries");
        Ok(binaries)
    }

    /// Test binaries in the configured build area, using the configured
    /// test prefix. No build area means no tests.
    pub fn test_binaries(&self) -> Result<Vec<TestBinary>> {
        match &self.build_path {
            Some(build) if self.fs.is_dir(build) => self.test_binaries_in(build, &self.test_prefix),
            _ => Ok(Vec::new()),
        }
    }
}

/// `test_core.cc` -> `test_core` + platform executable suffix.
pub fn expected_binary_name(source_name: &str) -> String {
    let stem = match source_name.rfind('.') {
        Some(idx) if idx > 0 => &source_name[..idx],
        _ => source_name,
    };
    format!("{stem}{}", std::env::consts::EXE_SUFFIX)
}

impl ChangeSource for Watcher {
    fn poll(&mut self) -> Result<WatchState> {
        Watcher::poll(self)
    }

    fn test_binaries(&self) -> Result<Vec<TestBinary>> {
        Watcher::test_binaries(self)
    }
}
