// tests/cmake_builder.rs

use std::error::Error;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use ttt::build::cmake::CmakeOptions;
use ttt::build::{BuildError, Builder, CmakeBuilder};
use ttt::fs::mock::MockFileSystem;
use ttt::fs::FileSystem;
use ttt::term::Terminal;
use ttt_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const CACHE: &str = "CMAKE_BUILD_TYPE:STRING=Debug\nCMAKE_COMMAND:INTERNAL=/usr/bin/cmake\n";

fn source_tree() -> Arc<MockFileSystem> {
    let fs = MockFileSystem::new();
    fs.add_file("/src/CMakeLists.txt", "project(demo)");
    fs.add_file("/usr/bin/cmake", "");
    Arc::new(fs)
}

fn builder(fs: &Arc<MockFileSystem>, options: CmakeOptions) -> Result<CmakeBuilder, BuildError> {
    CmakeBuilder::with_fs(fs.clone(), "/src", "/build", options, Terminal::silent())
}

fn args(cmd: &ttt::exec::CommandSpec) -> Vec<String> {
    cmd.get_args()
        .iter()
        .map(|a: &OsString| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_paths_must_be_absolute() {
    let fs = source_tree();
    let relative_src =
        CmakeBuilder::with_fs(fs.clone(), "src", "/build", CmakeOptions::default(), Terminal::silent());
    match relative_src {
        Err(e @ BuildError::RelativePath { .. }) => {
            assert_eq!(e.to_string(), "Watch path src must be absolute");
        }
        other => panic!("expected relative path error, got {other:?}"),
    }

    let relative_build =
        CmakeBuilder::with_fs(fs, "/src", "build", CmakeOptions::default(), Terminal::silent());
    assert!(matches!(
        relative_build,
        Err(BuildError::RelativePath { what: "Build", .. })
    ));
}

#[test]
fn test_generate_requires_cmakelists() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_dir("/src");
    let b = builder(&fs, CmakeOptions::default())?;

    let err = b.generate_command().err().ok_or("expected an error")?;
    assert_eq!(err.to_string(), "No CMakeLists.txt detected in /src");
    Ok(())
}

#[test]
fn test_generate_command() -> TestResult {
    let fs = source_tree();
    let options = CmakeOptions {
        generator: Some("Ninja".to_string()),
        build_config: Some("Release".to_string()),
        defines: vec!["ENABLE_TESTS=ON".to_string()],
        always_clean: false,
    };
    let b = builder(&fs, options)?;

    let cmd = b.generate_command()?.ok_or("expected a generate command")?;
    assert_eq!(cmd.program(), "cmake");

    let mut expected = vec!["-G", "Ninja", "-H/src", "-B/build"];
    if !cfg!(windows) {
        expected.push("-DCMAKE_BUILD_TYPE=Release");
    }
    expected.push("-DENABLE_TESTS=ON");
    assert_eq!(args(&cmd), expected);
    Ok(())
}

#[test]
fn test_generated_area_is_not_regenerated() -> TestResult {
    let fs = source_tree();
    fs.add_dir("/build/CMakeFiles");
    let b = builder(&fs, CmakeOptions::default())?;

    assert!(b.generate_command()?.is_none());
    Ok(())
}

#[test]
fn test_build_command() -> TestResult {
    let fs = source_tree();
    let options = CmakeOptions {
        build_config: Some("Debug".to_string()),
        ..CmakeOptions::default()
    };
    let b = builder(&fs, options)?;

    let mut expected = vec!["--build", "/build"];
    if cfg!(windows) {
        expected.extend(["--config", "Debug"]);
    }
    assert_eq!(args(&b.build_command()), expected);
    assert_eq!(b.build_path(), Path::new("/build"));
    Ok(())
}

#[test]
fn test_clean_without_build_area_is_a_no_op() -> TestResult {
    init_tracing();
    let fs = source_tree();
    let b = builder(&fs, CmakeOptions::default())?;
    assert!(!b.clean()?);
    Ok(())
}

#[test]
fn test_clean_removes_area_without_generated_files() -> TestResult {
    let fs = source_tree();
    fs.add_file("/build/leftover.o", "");
    let b = builder(&fs, CmakeOptions::default())?;

    assert!(b.clean()?);
    assert!(!fs.exists(Path::new("/build")));
    Ok(())
}

#[test]
fn test_clean_keeps_healthy_area() -> TestResult {
    let fs = source_tree();
    fs.add_file("/build/Makefile", "all:");
    fs.add_file("/build/CMakeCache.txt", CACHE);
    let b = builder(&fs, CmakeOptions::default())?;

    assert!(!b.clean()?);
    assert!(fs.exists(Path::new("/build/Makefile")));
    Ok(())
}

#[test]
fn test_visual_studio_solution_counts_as_generated() -> TestResult {
    let fs = source_tree();
    fs.add_file("/build/demo.sln", "");
    let b = builder(&fs, CmakeOptions::default())?;

    assert!(!b.clean()?);
    Ok(())
}

#[test]
fn test_clean_removes_area_when_cmake_moved() -> TestResult {
    let fs = source_tree();
    fs.add_file("/build/build.ninja", "");
    fs.add_file(
        "/build/CMakeCache.txt",
        "CMAKE_COMMAND:INTERNAL=/opt/old/cmake\n",
    );
    let b = builder(&fs, CmakeOptions::default())?;

    assert!(b.clean()?);
    Ok(())
}

#[test]
fn test_clean_removes_area_when_tests_get_enabled() -> TestResult {
    let fs = source_tree();
    fs.add_file("/build/Makefile", "all:");
    fs.add_file(
        "/build/CMakeCache.txt",
        format!("{CACHE}ENABLE_TESTS:BOOL=OFF\n"),
    );

    let unchanged = builder(&fs, CmakeOptions::default())?;
    assert!(!unchanged.clean()?);

    let enabling = builder(
        &fs,
        CmakeOptions {
            defines: vec!["ENABLE_TESTS=ON".to_string()],
            ..CmakeOptions::default()
        },
    )?;
    assert!(enabling.clean()?);
    Ok(())
}

#[test]
fn test_always_clean() -> TestResult {
    let fs = source_tree();
    fs.add_file("/build/Makefile", "all:");
    fs.add_file("/build/CMakeCache.txt", CACHE);
    let b = builder(
        &fs,
        CmakeOptions {
            always_clean: true,
            ..CmakeOptions::default()
        },
    )?;

    assert!(b.clean()?);
    assert!(!fs.exists(Path::new("/build")));
    Ok(())
}

#[tokio::test]
async fn test_build_stops_before_running_anything_without_cmakelists() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_dir("/src");
    let mut b = builder(&fs, CmakeOptions::default())?;

    let result = with_timeout(b.build()).await;
    assert!(matches!(result, Err(BuildError::MissingCMakeLists(_))));
    Ok(())
}
