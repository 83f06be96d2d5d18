// src/build/cmake.rs

//! CMake driven builds: clean when outdated, generate once, then build.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::build::{BuildError, Builder};
use crate::exec::{call, CommandSpec, Redirect};
use crate::fs::{FileSystem, RealFileSystem};
use crate::term::Terminal;
use crate::types::Verbosity;

/// Files whose presence shows that cmake generated the build area.
const GENERATED: &[&str] = &["Makefile", "build.ninja"];
const SOLUTION_EXT: &str = "sln";

/// Settings for a [`CmakeBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmakeOptions {
    /// Passed through to `cmake -G`.
    pub generator: Option<String>,
    /// `Debug`, `Release`, ...
    pub build_config: Option<String>,
    /// `VAR=VALUE` strings for `cmake -D`.
    pub defines: Vec<String>,
    /// Remove the build area before every build.
    pub always_clean: bool,
}

#[derive(Debug)]
pub struct CmakeBuilder {
    fs: Arc<dyn FileSystem>,
    source_path: PathBuf,
    build_path: PathBuf,
    options: CmakeOptions,
    term: Terminal,
}

impl CmakeBuilder {
    pub fn new(
        source_path: impl Into<PathBuf>,
        build_path: impl Into<PathBuf>,
        options: CmakeOptions,
        term: Terminal,
    ) -> Result<Self, BuildError> {
        Self::with_fs(Arc::new(RealFileSystem), source_path, build_path, options, term)
    }

    pub fn with_fs(
        fs: Arc<dyn FileSystem>,
        source_path: impl Into<PathBuf>,
        build_path: impl Into<PathBuf>,
        options: CmakeOptions,
        term: Terminal,
    ) -> Result<Self, BuildError> {
        let source_path = source_path.into();
        let build_path = build_path.into();
        if !source_path.is_absolute() {
            return Err(BuildError::RelativePath {
                what: "Watch",
                path: source_path,
            });
        }
        if !build_path.is_absolute() {
            return Err(BuildError::RelativePath {
                what: "Build",
                path: build_path,
            });
        }
        Ok(Self {
            fs,
            source_path,
            build_path,
            options,
            term,
        })
    }

    pub fn build_path(&self) -> &Path {
        &self.build_path
    }

    /// Remove the build area when asked to always clean, or when it no
    /// longer matches what cmake would produce. Returns whether it was removed.
    pub fn clean(&self) -> Result<bool, BuildError> {
        if !self.fs.exists(&self.build_path) {
            return Ok(false);
        }
        let reason = if self.options.always_clean {
            Some("clean requested")
        } else {
            self.outdated_reason()
        };
        match reason {
            Some(reason) => {
                info!(build = %self.build_path.display(), reason, "removing build area");
                self.fs.remove_dir_all(&self.build_path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn outdated_reason(&self) -> Option<&'static str> {
        if !self.has_generated_files() {
            return Some("no generated build files");
        }

        let cache = self.build_path.join("CMakeCache.txt");
        let Ok(content) = self.fs.read_to_string(&cache) else {
            return None;
        };
        for line in content.lines() {
            if line.contains("CMAKE_COMMAND:INTERNAL") {
                if let Some((_, cmake)) = line.trim_end().split_once('=') {
                    if !self.fs.exists(Path::new(cmake)) {
                        return Some("cmake executable changed");
                    }
                }
            }
            if line.contains("ENABLE_TESTS:BOOL=OFF")
                && self
                    .options
                    .defines
                    .iter()
                    .any(|d| d.contains("ENABLE_TESTS") && d.contains("ON"))
            {
                return Some("tests were disabled");
            }
        }
        None
    }

    fn has_generated_files(&self) -> bool {
        if GENERATED
            .iter()
            .any(|name| self.fs.exists(&self.build_path.join(name)))
        {
            return true;
        }
        self.fs
            .read_dir(&self.build_path)
            .map(|entries| {
                entries
                    .iter()
                    .any(|p| p.extension().is_some_and(|ext| ext == SOLUTION_EXT))
            })
            .unwrap_or(false)
    }

    /// The configure command, or `None` when the build area is already
    /// generated.
    pub fn generate_command(&self) -> Result<Option<CommandSpec>, BuildError> {
        if !self.fs.exists(&self.source_path.join("CMakeLists.txt")) {
            return Err(BuildError::MissingCMakeLists(self.source_path.clone()));
        }
        if self.fs.exists(&self.build_path.join("CMakeFiles")) {
            return Ok(None);
        }

        let mut cmd = CommandSpec::new("cmake");
        if let Some(generator) = &self.options.generator {
            cmd = cmd.arg("-G").arg(generator);
        }
        cmd = cmd
            .arg(format!("-H{}", self.source_path.display()))
            .arg(format!("-B{}", self.build_path.display()));
        // Multi-config generators (MSVC) ignore it and take --config instead.
        if let Some(config) = &self.options.build_config {
            if !cfg!(windows) {
                cmd = cmd.arg(format!("-DCMAKE_BUILD_TYPE={config}"));
            }
        }
        for define in &self.options.defines {
            cmd = cmd.arg(format!("-D{define}"));
        }
        Ok(Some(cmd))
    }

    pub fn build_command(&self) -> CommandSpec {
        let mut cmd = CommandSpec::new("cmake")
            .arg("--build")
            .arg(&self.build_path);
        if let Some(config) = &self.options.build_config {
            if cfg!(windows) {
                cmd = cmd.arg("--config").arg(config);
            }
        }
        cmd
    }

    async fn execute(&self, cmd: CommandSpec) -> Result<(), BuildError> {
        self.term
            .writeln_at(Verbosity::Commands, &format!("execute: {cmd}"));
        let cmd = cmd.stdin(Redirect::Null);
        let code = call(&cmd)
            .await
            .map_err(|e| BuildError::Exec(e.to_string()))?;
        if code != 0 {
            warn!(command = %cmd, exit_code = code, "build command failed");
            return Err(BuildError::CommandFailed {
                command: cmd.to_string(),
                code,
            });
        }
        Ok(())
    }

    async fn run_steps(&mut self) -> Result<(), BuildError> {
        self.clean()?;
        if let Some(cmd) = self.generate_command()? {
            self.execute(cmd).await?;
        } else {
            debug!(build = %self.build_path.display(), "build area already generated");
        }
        self.execute(self.build_command()).await
    }
}

impl Builder for CmakeBuilder {
    fn build(&mut self) -> Pin<Box<dyn Future<Output = Result<(), BuildError>> + Send + '_>> {
        Box::pin(self.run_steps())
    }
}
