// src/watch/snapshot.rs

//! Point-in-time view of the watch area and the delta between two views.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// A tracked file as captured by one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedFile {
    pub name: String,
    /// Path relative to the watch root.
    pub relpath: PathBuf,
    pub mtime: SystemTime,
}

/// Absolute path -> tracked file.
pub type Snapshot = HashMap<PathBuf, WatchedFile>;

/// File activity between two polls of the watch area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchState {
    pub inserts: BTreeSet<PathBuf>,
    pub deletes: BTreeSet<PathBuf>,
    pub updates: BTreeSet<PathBuf>,
    /// Time spent walking the watch area.
    pub walk_time: Duration,
}

impl WatchState {
    pub fn has_changes(&self) -> bool {
        !(self.inserts.is_empty() && self.deletes.is_empty() && self.updates.is_empty())
    }
}

/// Compute inserted, deleted and updated paths between two snapshots.
pub fn diff(previous: &Snapshot, current: &Snapshot, walk_time: Duration) -> WatchState {
    let inserts = current
        .keys()
        .filter(|k| !previous.contains_key(*k))
        .cloned()
        .collect();

    let deletes = previous
        .keys()
        .filter(|k| !current.contains_key(*k))
        .cloned()
        .collect();

    let updates = previous
        .iter()
        .filter_map(|(k, old)| match current.get(k) {
            Some(new) if new.mtime != old.mtime => Some(k.clone()),
            _ => None,
        })
        .collect();

    WatchState {
        inserts,
        deletes,
        updates,
        walk_time,
    }
}
