// src/config/validate.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::build::cmake::CmakeOptions;
use crate::cli::CliArgs;
use crate::config::model::ConfigFile;
use crate::errors::{Result, TttError};
use crate::types::Verbosity;
use crate::watch::{FileFilter, DEFAULT_TEST_PREFIX};

/// Files tracked when neither the command line nor the config file names any.
pub const DEFAULT_SOURCE_PATTERNS: &[&str] = &["*.cc", "*.c", "*.h", "CMakeLists.txt"];

pub const DEFAULT_BUILD_CONFIG: &str = "Debug";

const DEFAULT_BUILD_PATH_SUFFIX: &str = "-build";
const DEFAULT_INTERVAL_MS: u64 = 1000;

/// cmake option switching the project's tests on.
pub const ENABLE_TESTS: &str = "ENABLE_TESTS";

/// Everything the application needs, merged from command line, config file
/// and defaults (in that priority) and checked.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute, existing root of the source tree.
    pub watch_path: PathBuf,
    /// Absolute build area.
    pub build_path: PathBuf,
    pub filter: FileFilter,
    pub test_prefix: String,
    pub cmake: CmakeOptions,
    pub watch_mode: bool,
    pub verbosity: Verbosity,
    pub polling_interval: Duration,
}

impl Settings {
    /// Merge `cli` over `file` over the defaults. Relative paths are taken
    /// from `cwd`.
    pub fn resolve(cli: &CliArgs, file: ConfigFile, cwd: &Path) -> Result<Self> {
        let watch_path = make_watch_path(&cli.watch_path, cwd)?;

        let include: Vec<String> = if !cli.patterns.is_empty() {
            cli.patterns.clone()
        } else if let Some(patterns) = file.watch.patterns {
            patterns
        } else {
            DEFAULT_SOURCE_PATTERNS.iter().map(|p| p.to_string()).collect()
        };
        let mut exclude = file.watch.exclude;
        exclude.extend(cli.exclude.iter().cloned());
        let filter = FileFilter::new(&include, &exclude)?;

        let test_prefix = cli
            .test_prefix
            .clone()
            .or(file.watch.test_prefix)
            .unwrap_or_else(|| DEFAULT_TEST_PREFIX.to_string());
        if test_prefix.is_empty() {
            return Err(TttError::ConfigError("test prefix must not be empty".to_string()));
        }

        let build_config = cli
            .build_config
            .clone()
            .or(file.build.build_config)
            .unwrap_or_else(|| DEFAULT_BUILD_CONFIG.to_string());

        let build_path = match cli.build_path.clone().or(file.build.path) {
            Some(path) => absolute(&path, cwd),
            None => make_build_path(&watch_path, Some(&build_config), cwd),
        };

        let mut defines = file.build.defines;
        defines.extend(cli.define.iter().cloned());
        if let Some(bad) = defines.iter().find(|d| !d.contains('=')) {
            return Err(TttError::ConfigError(format!(
                "define {bad:?} must have the form VAR=VALUE"
            )));
        }
        // Every cycle runs the tests, so projects gating them behind
        // ENABLE_TESTS must build them.
        if !defines.iter().any(|d| define_name(d) == ENABLE_TESTS) {
            defines.push(format!("{ENABLE_TESTS}=ON"));
        }

        let interval_ms = cli
            .interval_ms
            .or(file.monitor.interval_ms)
            .unwrap_or(DEFAULT_INTERVAL_MS);
        if interval_ms == 0 {
            return Err(TttError::ConfigError(
                "polling interval must be at least 1 ms".to_string(),
            ));
        }

        Ok(Self {
            watch_path,
            build_path,
            filter,
            test_prefix,
            cmake: CmakeOptions {
                generator: cli.generator.clone().or(file.build.generator),
                build_config: Some(build_config),
                defines,
                always_clean: cli.clean || file.build.clean,
            },
            watch_mode: cli.watch,
            verbosity: Verbosity::from_count(cli.verbose),
            polling_interval: Duration::from_millis(interval_ms),
        })
    }
}

/// `NAME` of a `NAME[:TYPE]=VALUE` define.
fn define_name(define: &str) -> &str {
    define.split(['=', ':']).next().unwrap_or(define).trim()
}

/// Absolute version of `watch_path`, which must exist.
pub fn make_watch_path(watch_path: &Path, cwd: &Path) -> Result<PathBuf> {
    let abs = absolute(watch_path, cwd);
    if !abs.is_dir() {
        return Err(TttError::ConfigError(format!(
            "Invalid path: {} ({})",
            abs.display(),
            watch_path.display()
        )));
    }
    Ok(abs)
}

/// `<cwd>/<basename of watch path>[-<config>]-build`.
pub fn make_build_path(watch_path: &Path, build_config: Option<&str>, cwd: &Path) -> PathBuf {
    let base = watch_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match build_config {
        Some(config) => format!("{base}-{config}{DEFAULT_BUILD_PATH_SUFFIX}"),
        None => format!("{base}{DEFAULT_BUILD_PATH_SUFFIX}"),
    };
    cwd.join(name)
}

fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    normalize(&joined)
}

/// Lexically drop `.` and resolve `..` components.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
