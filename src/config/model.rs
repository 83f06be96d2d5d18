// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Optional project configuration read from a TOML file.
///
/// ```toml
/// [watch]
/// patterns = ["*.cc$", "*.h$", "CMakeLists.txt$"]
/// exclude = ["third_party"]
/// test_prefix = "test_"
///
/// [build]
/// path = "/tmp/proj-build"
/// generator = "Ninja"
/// build_config = "Release"
/// defines = ["ENABLE_TESTS=ON"]
/// clean = false
///
/// [monitor]
/// interval_ms = 500
/// ```
///
/// Every section and key is optional. Command line options win over the
/// file; see [`Settings::resolve`](crate::config::Settings::resolve).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub monitor: MonitorSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WatchSection {
    /// Files to track. `None` means the built-in source patterns; an empty
    /// list tracks every file.
    #[serde(default)]
    pub patterns: Option<Vec<String>>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub test_prefix: Option<String>,
}

/// `[build]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildSection {
    /// Relative paths are taken from the current directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub generator: Option<String>,

    #[serde(default)]
    pub build_config: Option<String>,

    /// `VAR=VALUE` strings passed as `-D` to cmake.
    #[serde(default)]
    pub defines: Vec<String>,

    #[serde(default)]
    pub clean: bool,
}

/// `[monitor]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitorSection {
    #[serde(default)]
    pub interval_ms: Option<u64>,
}
