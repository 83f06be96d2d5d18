// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::build::BuildError;

#[derive(Error, Debug)]
pub enum TttError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    /// The test binary produced output the gtest parser cannot trust.
    #[error("Corrupted test output from {exe}: {reason}")]
    CorruptOutput { exe: String, reason: String },

    /// A streamed command tried to redirect a pipe owned by the runner.
    #[error("{0} redirection is not allowed for a streamed call")]
    ForbiddenRedirect(&'static str),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TttError>;
