// src/build/mod.rs

//! Compiling the watched project before its tests run.

pub mod cmake;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;

pub use cmake::CmakeBuilder;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{what} path {} must be absolute", path.display())]
    RelativePath { what: &'static str, path: PathBuf },

    #[error("No CMakeLists.txt detected in {}", .0.display())]
    MissingCMakeLists(PathBuf),

    /// A build command ran and exited non-zero.
    #[error("command '{command}' failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("failed to run build command: {0}")]
    Exec(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Brings the build area up to date with the watched sources.
pub trait Builder: Send {
    fn build(&mut self) -> Pin<Box<dyn Future<Output = Result<(), BuildError>> + Send + '_>>;
}
