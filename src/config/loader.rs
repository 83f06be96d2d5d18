// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::errors::{Result, TttError};

/// Read and deserialize a config file. No semantic checks happen here;
/// those belong to [`Settings::resolve`](crate::config::Settings::resolve).
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        TttError::ConfigError(format!("cannot read config file {}: {e}", path.display()))
    })?;

    let config = parse_config(&contents)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(contents)?)
}
