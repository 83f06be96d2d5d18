// tests/config_settings.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use ttt::cli::{CliArgs, LogLevel};
use ttt::config::{load_from_path, make_build_path, parse_config, ConfigFile, Settings};
use ttt::errors::TttError;
use ttt::logging::resolve_level;
use ttt::types::Verbosity;

type TestResult = Result<(), Box<dyn Error>>;

fn cli(args: &[&str]) -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse_from(std::iter::once("ttt").chain(args.iter().copied()))
}

fn config_error_message(result: Result<Settings, TttError>) -> String {
    match result {
        Err(TttError::ConfigError(msg)) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn test_parse_full_config_file() -> TestResult {
    let config = parse_config(
        r#"
        [watch]
        patterns = ["*.cc$"]
        exclude = ["third_party"]
        test_prefix = "check_"

        [build]
        path = "out"
        generator = "Ninja"
        build_config = "Release"
        defines = ["ENABLE_TESTS=ON"]
        clean = true

        [monitor]
        interval_ms = 250
        "#,
    )?;

    assert_eq!(config.watch.patterns, Some(vec!["*.cc$".to_string()]));
    assert_eq!(config.watch.exclude, vec!["third_party"]);
    assert_eq!(config.watch.test_prefix.as_deref(), Some("check_"));
    assert_eq!(config.build.path, Some(PathBuf::from("out")));
    assert_eq!(config.build.generator.as_deref(), Some("Ninja"));
    assert_eq!(config.build.defines, vec!["ENABLE_TESTS=ON"]);
    assert!(config.build.clean);
    assert_eq!(config.monitor.interval_ms, Some(250));
    Ok(())
}

#[test]
fn test_empty_config_file_is_all_defaults() -> TestResult {
    assert_eq!(parse_config("")?, ConfigFile::default());
    Ok(())
}

#[test]
fn test_malformed_config_is_a_toml_error() {
    assert!(matches!(
        parse_config("[watch]\npatterns = 3"),
        Err(TttError::TomlError(_))
    ));
}

#[test]
fn test_missing_config_file_is_a_config_error() {
    assert!(matches!(
        load_from_path("/definitely/not/here.toml"),
        Err(TttError::ConfigError(_))
    ));
}

#[test]
fn test_load_config_from_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ttt.toml");
    std::fs::write(&path, "[build]\ngenerator = \"Ninja\"\n")?;

    let config = load_from_path(&path)?;
    assert_eq!(config.build.generator.as_deref(), Some("Ninja"));
    Ok(())
}

#[test]
fn test_defaults() -> TestResult {
    let cwd = tempfile::tempdir()?;
    std::fs::create_dir(cwd.path().join("proj"))?;

    let settings = Settings::resolve(&cli(&["proj"])?, ConfigFile::default(), cwd.path())?;

    assert_eq!(settings.watch_path, cwd.path().join("proj"));
    assert_eq!(settings.build_path, cwd.path().join("proj-Debug-build"));
    assert_eq!(
        settings.filter.include().sources(),
        ["*.cc", "*.c", "*.h", "CMakeLists.txt"]
    );
    assert!(settings.filter.exclude().is_empty());
    assert_eq!(settings.test_prefix, "test_");
    assert_eq!(settings.cmake.build_config.as_deref(), Some("Debug"));
    assert_eq!(settings.cmake.generator, None);
    assert_eq!(settings.cmake.defines, vec!["ENABLE_TESTS=ON"]);
    assert!(!settings.cmake.always_clean);
    assert!(!settings.watch_mode);
    assert_eq!(settings.verbosity, Verbosity::Quiet);
    assert_eq!(settings.polling_interval, Duration::from_secs(1));
    Ok(())
}

#[test]
fn test_command_line_wins_over_file() -> TestResult {
    let cwd = tempfile::tempdir()?;
    std::fs::create_dir(cwd.path().join("proj"))?;
    let file = parse_config(
        r#"
        [watch]
        patterns = ["*.cc$"]
        exclude = ["third_party"]

        [build]
        generator = "Unix Makefiles"
        build_config = "Release"
        defines = ["A=1"]

        [monitor]
        interval_ms = 250
        "#,
    )?;
    let args = cli(&[
        "proj", "*.c$", "-g", "Ninja", "-c", "RelWithDebInfo", "-D", "B=2", "-x", "gen", "-w",
        "-vv", "--interval-ms", "50", "--clean",
    ])?;

    let settings = Settings::resolve(&args, file, cwd.path())?;

    assert_eq!(settings.filter.include().sources(), ["*.c$"]);
    assert_eq!(settings.filter.exclude().sources(), ["third_party", "gen"]);
    assert_eq!(settings.cmake.generator.as_deref(), Some("Ninja"));
    assert_eq!(settings.cmake.build_config.as_deref(), Some("RelWithDebInfo"));
    assert_eq!(settings.cmake.defines, vec!["A=1", "B=2", "ENABLE_TESTS=ON"]);
    assert!(settings.cmake.always_clean);
    assert!(settings.watch_mode);
    assert_eq!(settings.verbosity, Verbosity::Commands);
    assert_eq!(settings.polling_interval, Duration::from_millis(50));
    assert_eq!(
        settings.build_path,
        cwd.path().join("proj-RelWithDebInfo-build")
    );
    Ok(())
}

#[test]
fn test_explicit_enable_tests_define_is_kept() -> TestResult {
    let cwd = tempfile::tempdir()?;
    std::fs::create_dir(cwd.path().join("proj"))?;

    let off = Settings::resolve(
        &cli(&["proj", "-D", "ENABLE_TESTS=OFF"])?,
        ConfigFile::default(),
        cwd.path(),
    )?;
    assert_eq!(off.cmake.defines, vec!["ENABLE_TESTS=OFF"]);

    let typed = parse_config("[build]\ndefines = [\"ENABLE_TESTS:BOOL=ON\"]\n")?;
    let settings = Settings::resolve(&cli(&["proj"])?, typed, cwd.path())?;
    assert_eq!(settings.cmake.defines, vec!["ENABLE_TESTS:BOOL=ON"]);
    Ok(())
}

#[test]
fn test_file_patterns_replace_defaults() -> TestResult {
    let cwd = tempfile::tempdir()?;
    std::fs::create_dir(cwd.path().join("proj"))?;
    let file = parse_config("[watch]\npatterns = []\n")?;

    let settings = Settings::resolve(&cli(&["proj"])?, file, cwd.path())?;

    // An explicit empty list tracks every file.
    assert!(settings.filter.include().is_empty());
    Ok(())
}

#[test]
fn test_relative_build_path_is_taken_from_cwd() -> TestResult {
    let cwd = tempfile::tempdir()?;
    std::fs::create_dir(cwd.path().join("proj"))?;

    let args = cli(&["./proj/../proj", "-b", "out/../build"])?;
    let settings = Settings::resolve(&args, ConfigFile::default(), cwd.path())?;

    assert_eq!(settings.watch_path, cwd.path().join("proj"));
    assert_eq!(settings.build_path, cwd.path().join("build"));
    Ok(())
}

#[test]
fn test_invalid_watch_path() -> TestResult {
    let cwd = tempfile::tempdir()?;
    let result = Settings::resolve(&cli(&["missing"])?, ConfigFile::default(), cwd.path());

    let msg = config_error_message(result);
    assert_eq!(
        msg,
        format!("Invalid path: {} (missing)", cwd.path().join("missing").display())
    );
    Ok(())
}

#[test]
fn test_rejected_values() -> TestResult {
    let cwd = tempfile::tempdir()?;
    std::fs::create_dir(cwd.path().join("proj"))?;

    let zero = Settings::resolve(
        &cli(&["proj", "--interval-ms", "0"])?,
        ConfigFile::default(),
        cwd.path(),
    );
    assert!(config_error_message(zero).contains("polling interval"));

    let prefix = Settings::resolve(
        &cli(&["proj", "--test-prefix", ""])?,
        ConfigFile::default(),
        cwd.path(),
    );
    assert!(config_error_message(prefix).contains("test prefix"));

    let define = Settings::resolve(
        &cli(&["proj", "-D", "NO_VALUE"])?,
        ConfigFile::default(),
        cwd.path(),
    );
    assert!(config_error_message(define).contains("NO_VALUE"));
    Ok(())
}

#[test]
fn test_make_build_path() {
    let cwd = Path::new("/work");
    assert_eq!(
        make_build_path(Path::new("/src/proj"), Some("Debug"), cwd),
        PathBuf::from("/work/proj-Debug-build")
    );
    assert_eq!(
        make_build_path(Path::new("/src/proj"), None, cwd),
        PathBuf::from("/work/proj-build")
    );
}

#[test]
fn test_cli_requires_watch_path() {
    assert!(cli(&[]).is_err());
}

#[test]
fn test_log_level_priority() {
    assert_eq!(resolve_level(None, None), tracing::Level::WARN);
    assert_eq!(resolve_level(None, Some("debug")), tracing::Level::DEBUG);
    assert_eq!(resolve_level(None, Some(" Warning ")), tracing::Level::WARN);
    assert_eq!(resolve_level(None, Some("chatty")), tracing::Level::WARN);
    assert_eq!(
        resolve_level(Some(LogLevel::Trace), Some("error")),
        tracing::Level::TRACE
    );
}
