// tests/snapshot_diff.rs

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use proptest::prelude::*;

use ttt::watch::{diff, Snapshot, WatchedFile};

fn watched(name: &str, secs: u64) -> WatchedFile {
    WatchedFile {
        name: name.to_string(),
        relpath: PathBuf::from(name),
        mtime: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
    }
}

fn snapshot(entries: &[(&str, u64)]) -> Snapshot {
    entries
        .iter()
        .map(|(name, secs)| (PathBuf::from("/src").join(name), watched(name, *secs)))
        .collect()
}

#[test]
fn test_empty_snapshots_give_empty_delta() {
    let state = diff(&Snapshot::new(), &Snapshot::new(), Duration::ZERO);
    assert!(!state.has_changes());
}

#[test]
fn test_insert_update_delete_are_classified() {
    let before = snapshot(&[("a.c", 1), ("b.c", 1), ("c.c", 1)]);
    let after = snapshot(&[("a.c", 1), ("b.c", 2), ("d.c", 1)]);

    let state = diff(&before, &after, Duration::from_millis(7));

    assert_eq!(state.inserts, BTreeSet::from([PathBuf::from("/src/d.c")]));
    assert_eq!(state.updates, BTreeSet::from([PathBuf::from("/src/b.c")]));
    assert_eq!(state.deletes, BTreeSet::from([PathBuf::from("/src/c.c")]));
    assert_eq!(state.walk_time, Duration::from_millis(7));
    assert!(state.has_changes());
}

#[test]
fn test_older_mtime_counts_as_update() {
    let before = snapshot(&[("a.c", 5)]);
    let after = snapshot(&[("a.c", 3)]);

    let state = diff(&before, &after, Duration::ZERO);
    assert_eq!(state.updates.len(), 1);
}

fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    proptest::collection::hash_map("[a-z]{1,6}\\.c", 0u64..4, 0..12).prop_map(|m: HashMap<String, u64>| {
        m.into_iter()
            .map(|(name, secs)| (PathBuf::from("/src").join(&name), watched(&name, secs)))
            .collect()
    })
}

proptest! {
    #[test]
    fn test_diff_with_itself_is_empty(a in snapshot_strategy()) {
        let state = diff(&a, &a, Duration::ZERO);
        prop_assert!(!state.has_changes());
    }

    #[test]
    fn test_diff_from_empty_inserts_everything(b in snapshot_strategy()) {
        let state = diff(&Snapshot::new(), &b, Duration::ZERO);
        let keys: BTreeSet<PathBuf> = b.keys().cloned().collect();
        prop_assert_eq!(state.inserts, keys);
        prop_assert!(state.deletes.is_empty());
        prop_assert!(state.updates.is_empty());
    }

    #[test]
    fn test_diff_to_empty_deletes_everything(a in snapshot_strategy()) {
        let state = diff(&a, &Snapshot::new(), Duration::ZERO);
        let keys: BTreeSet<PathBuf> = a.keys().cloned().collect();
        prop_assert_eq!(state.deletes, keys);
        prop_assert!(state.inserts.is_empty());
        prop_assert!(state.updates.is_empty());
    }

    #[test]
    fn test_delta_sets_are_disjoint(a in snapshot_strategy(), b in snapshot_strategy()) {
        let state = diff(&a, &b, Duration::ZERO);
        prop_assert!(state.inserts.is_disjoint(&state.deletes));
        prop_assert!(state.inserts.is_disjoint(&state.updates));
        prop_assert!(state.deletes.is_disjoint(&state.updates));
    }
}
