// src/fs/mock.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use anyhow::{anyhow, bail, Result};

use super::{EntryKind, FileMeta, FileSystem};

#[derive(Debug, Clone)]
enum MockEntry {
    File {
        content: Vec<u8>,
        modified: SystemTime,
        executable: bool,
    },
    Dir,
}

/// In-memory filesystem for watcher and builder tests.
///
/// Modification times are explicit so tests never depend on the clock
/// resolution of the host filesystem. Parent directories spring into
/// existence when something is added below them.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a non-executable file with mtime = epoch + 1s.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert(
            path.as_ref(),
            MockEntry::File {
                content: content.into(),
                modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1),
                executable: false,
            },
        );
    }

    /// Add (or replace) a file with the owner-execute bit set.
    pub fn add_executable(&self, path: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            MockEntry::File {
                content: b"binary".to_vec(),
                modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1),
                executable: true,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    /// Change the modification time of an existing file.
    pub fn touch(&self, path: impl AsRef<Path>, when: SystemTime) {
        let mut entries = self.lock();
        if let Some(MockEntry::File { modified, .. }) = entries.get_mut(path.as_ref()) {
            *modified = when;
        }
    }

    /// Remove a file or a whole directory subtree.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.lock().retain(|p, _| !p.starts_with(path));
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.lock();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
        entries.insert(path.to_path_buf(), entry);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.lock().get(path) {
            Some(MockEntry::File { content, .. }) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("invalid UTF-8 in {path:?}: {e}"))
            }
            Some(MockEntry::Dir) => bail!("is a directory: {path:?}"),
            None => bail!("file not found: {path:?}"),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        if !self.is_dir(path) {
            bail!("not a directory: {path:?}");
        }
        self.remove(path);
        Ok(())
    }

    fn metadata(&self, path: &Path) -> Result<FileMeta> {
        match self.lock().get(path) {
            Some(MockEntry::File {
                modified,
                executable,
                ..
            }) => Ok(FileMeta {
                kind: EntryKind::File,
                symlink: false,
                modified: *modified,
                owner_executable: *executable,
            }),
            Some(MockEntry::Dir) => Ok(FileMeta {
                kind: EntryKind::Dir,
                symlink: false,
                modified: SystemTime::UNIX_EPOCH,
                owner_executable: true,
            }),
            None => bail!("file not found: {path:?}"),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.lock();
        if !matches!(entries.get(path), Some(MockEntry::Dir)) {
            bail!("not a directory: {path:?}");
        }
        Ok(entries
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }
}
