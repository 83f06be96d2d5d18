// src/watch/walker.rs

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::fs::{EntryKind, FileMeta, FileSystem};

/// Directory names never descended into, at any depth.
pub const VCS_EXCLUSIONS: &[&str] = &[".git", ".hg"];

/// A regular file found during a walk.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub name: String,
    pub meta: FileMeta,
}

/// Collect every regular file under `root`.
///
/// Directories whose name is in `skip_dirs` are pruned. Symlinked directories
/// are listed but not followed. Entries that vanish between listing and
/// stat are skipped, as are unreadable subdirectories; an unreadable `root`
/// is an error.
pub fn walk(fs: &dyn FileSystem, root: &Path, skip_dirs: &[&str]) -> Result<Vec<WalkEntry>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    let mut first = true;

    while let Some(dir) = stack.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if first => return Err(e),
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };
        first = false;

        for path in entries {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let meta = match fs.metadata(&path) {
                Ok(meta) => meta,
                Err(_) => continue,
            };

            match meta.kind {
                EntryKind::Dir => {
                    if !meta.symlink && !skip_dirs.contains(&name.as_str()) {
                        stack.push(path);
                    }
                }
                EntryKind::File => files.push(WalkEntry { path, name, meta }),
                EntryKind::Other => {}
            }
        }
    }

    Ok(files)
}
