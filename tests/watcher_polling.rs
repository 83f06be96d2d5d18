// tests/watcher_polling.rs

use std::collections::BTreeSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use ttt::fs::mock::MockFileSystem;
use ttt::watch::{compile_pattern, expected_binary_name, FileFilter, TestBinary, Watcher};
use ttt_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

const NO_PATTERNS: &[&str] = &[];

fn mock_tree(files: &[&str]) -> Arc<MockFileSystem> {
    let fs = MockFileSystem::new();
    fs.add_dir("/src");
    for f in files {
        fs.add_file(Path::new("/src").join(f), "");
    }
    Arc::new(fs)
}

fn names(paths: &BTreeSet<PathBuf>) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_first_poll_inserts_every_file_and_second_is_quiet() -> TestResult {
    init_tracing();
    let fs = mock_tree(&["a.c", "sub/b.h"]);
    let mut watcher = Watcher::with_fs(fs, "/src", None, FileFilter::default());

    let first = watcher.poll()?;
    assert_eq!(names(&first.inserts), vec!["a.c", "b.h"]);

    let second = watcher.poll()?;
    assert!(!second.has_changes());
    Ok(())
}

#[test]
fn test_touch_and_remove_are_reported() -> TestResult {
    let fs = mock_tree(&["a.c", "b.c"]);
    let mut watcher = Watcher::with_fs(fs.clone(), "/src", None, FileFilter::default());
    watcher.poll()?;

    fs.touch("/src/a.c", SystemTime::UNIX_EPOCH + Duration::from_secs(60));
    fs.remove("/src/b.c");
    fs.add_file("/src/c.c", "");

    let state = watcher.poll()?;
    assert_eq!(names(&state.updates), vec!["a.c"]);
    assert_eq!(names(&state.deletes), vec!["b.c"]);
    assert_eq!(names(&state.inserts), vec!["c.c"]);
    Ok(())
}

#[test]
fn test_anchored_patterns_select_sources_only() -> TestResult {
    let files = ["a.c", "a.h", "a.cc", "CMakeLists.txt", "blah.txt"];
    let fs = mock_tree(&files);
    let filter = FileFilter::new(&["*.c$", "*.h$", "*.cc$", "CMakeLists.txt$"], NO_PATTERNS)?;
    let mut watcher = Watcher::with_fs(fs, "/src", None, filter);

    let state = watcher.poll()?;
    let mut tracked = names(&state.inserts);
    tracked.sort();
    assert_eq!(tracked, vec!["CMakeLists.txt", "a.c", "a.cc", "a.h"]);
    Ok(())
}

#[test]
fn test_empty_include_list_tracks_everything() -> TestResult {
    let files = ["a.c", "a.h", "a.cc", "CMakeLists.txt", "blah.txt"];
    let fs = mock_tree(&files);
    let mut watcher = Watcher::with_fs(fs, "/src", None, FileFilter::default());

    let state = watcher.poll()?;
    assert_eq!(state.inserts.len(), 5);
    Ok(())
}

#[test]
fn test_exclusion_wins_over_inclusion() -> TestResult {
    let fs = mock_tree(&["core/a.c", "third_party/b.c"]);
    let filter = FileFilter::new(&["*.c$"], &["third_party"])?;
    let mut watcher = Watcher::with_fs(fs, "/src", None, filter);

    let state = watcher.poll()?;
    assert_eq!(names(&state.inserts), vec!["a.c"]);
    Ok(())
}

#[test]
fn test_vcs_directories_are_never_walked() -> TestResult {
    let fs = mock_tree(&["a.c", ".git/config", ".hg/store/data", "deep/.git/HEAD"]);
    let mut watcher = Watcher::with_fs(fs, "/src", None, FileFilter::default());

    let state = watcher.poll()?;
    assert_eq!(names(&state.inserts), vec!["a.c"]);
    Ok(())
}

#[test]
fn test_patterns_match_anywhere_in_the_path() -> TestResult {
    let re = compile_pattern("build")?;
    assert!(re.is_match("/src/build/x.c"));
    assert!(re.is_match("/src/rebuild.c"));

    let glob = compile_pattern("test_?.c*")?;
    assert!(glob.is_match("/src/test_a.cc"));
    assert!(!glob.is_match("/src/test_ab.c"));

    let literal = compile_pattern("a+b.c$")?;
    assert!(literal.is_match("/src/a+b.c"));
    assert!(!literal.is_match("/src/aab.c"));
    Ok(())
}

#[test]
fn test_expected_binary_name_drops_extension() {
    let suffix = std::env::consts::EXE_SUFFIX;
    assert_eq!(expected_binary_name("test_core.cc"), format!("test_core{suffix}"));
    assert_eq!(expected_binary_name("test_noext"), format!("test_noext{suffix}"));
}

#[test]
fn test_test_binaries_need_prefix_and_exec_bit() -> TestResult {
    let fs = mock_tree(&["test/test_core.cc", "test/helper.cc", "test/test_io.cc"]);
    let suffix = std::env::consts::EXE_SUFFIX;
    fs.add_executable(format!("/build/test/test_core{suffix}"));
    fs.add_executable(format!("/build/test/helper{suffix}"));
    // Present but not executable.
    fs.add_file(format!("/build/test/test_io{suffix}"), "");

    let mut watcher = Watcher::with_fs(
        fs,
        "/src",
        Some(PathBuf::from("/build")),
        FileFilter::default(),
    );
    watcher.poll()?;

    let binaries = watcher.test_binaries()?;
    assert_eq!(
        binaries,
        vec![TestBinary {
            source: PathBuf::from("test/test_core.cc"),
            executable: PathBuf::from(format!("/build/test/test_core{suffix}")),
        }]
    );
    Ok(())
}

#[test]
fn test_no_build_area_means_no_binaries() -> TestResult {
    let fs = mock_tree(&["test_core.cc"]);
    let mut watcher = Watcher::with_fs(fs.clone(), "/src", None, FileFilter::default());
    watcher.poll()?;
    assert!(watcher.test_binaries()?.is_empty());

    let mut missing = Watcher::with_fs(
        fs,
        "/src",
        Some(PathBuf::from("/nowhere")),
        FileFilter::default(),
    );
    missing.poll()?;
    assert!(missing.test_binaries()?.is_empty());
    Ok(())
}

#[test]
fn test_custom_test_prefix() -> TestResult {
    let fs = mock_tree(&["check_core.cc", "test_io.cc"]);
    let suffix = std::env::consts::EXE_SUFFIX;
    fs.add_executable(format!("/build/check_core{suffix}"));
    fs.add_executable(format!("/build/test_io{suffix}"));

    let mut watcher = Watcher::with_fs(
        fs,
        "/src",
        Some(PathBuf::from("/build")),
        FileFilter::default(),
    )
    .with_test_prefix("check_");
    watcher.poll()?;

    let binaries = watcher.test_binaries()?;
    assert_eq!(binaries.len(), 1);
    assert_eq!(binaries[0].source, PathBuf::from("check_core.cc"));
    Ok(())
}

#[test]
fn test_missing_watch_root_is_an_error() {
    let fs = Arc::new(MockFileSystem::new());
    let mut watcher = Watcher::with_fs(fs, "/gone", None, FileFilter::default());
    assert!(watcher.poll().is_err());
}

#[test]
fn test_real_filesystem_polling() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("main.c"), "int main() {}")?;
    std::fs::create_dir(dir.path().join(".git"))?;
    std::fs::write(dir.path().join(".git").join("HEAD"), "ref")?;

    let mut watcher = Watcher::new(dir.path(), None, FileFilter::default());
    let first = watcher.poll()?;
    assert_eq!(names(&first.inserts), vec!["main.c"]);

    std::fs::write(dir.path().join("util.h"), "#pragma once")?;
    let second = watcher.poll()?;
    assert_eq!(names(&second.inserts), vec!["util.h"]);
    assert!(second.updates.is_empty());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_real_filesystem_test_discovery() -> TestResult {
    use std::os::unix::fs::PermissionsExt;

    let src = tempfile::tempdir()?;
    let build = tempfile::tempdir()?;
    std::fs::write(src.path().join("test_core.cc"), "")?;
    let exe = build.path().join("test_core");
    std::fs::write(&exe, "#!/bin/sh\n")?;
    std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755))?;

    let mut watcher = Watcher::new(
        src.path(),
        Some(build.path().to_path_buf()),
        FileFilter::default(),
    );
    watcher.poll()?;

    let binaries = watcher.test_binaries()?;
    assert_eq!(binaries.len(), 1);
    assert_eq!(binaries[0].executable, exe);
    Ok(())
}
