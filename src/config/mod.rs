// src/config/mod.rs

//! Configuration for ttt.
//!
//! Responsibilities:
//! - Define the optional TOML file model (`model.rs`).
//! - Load it from disk (`loader.rs`).
//! - Merge command line, file and defaults into checked [`Settings`]
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, parse_config};
pub use model::{BuildSection, ConfigFile, MonitorSection, WatchSection};
pub use validate::{
    make_build_path, make_watch_path, Settings, DEFAULT_BUILD_CONFIG, DEFAULT_SOURCE_PATTERNS,
    ENABLE_TESTS,
};
