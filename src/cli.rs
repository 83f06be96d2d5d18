// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// Command-line arguments for `ttt`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "ttt",
    version,
    about = "Watch, build, and test a cmake enabled source area.",
    long_about = None
)]
pub struct CliArgs {
    /// Source path to watch.
    #[arg(value_name = "WATCH_PATH")]
    pub watch_path: PathBuf,

    /// File names or patterns to watch (`*` and `?` wildcards, a trailing
    /// `$` anchors to the end of the path). Default: *.cc *.c *.h
    /// CMakeLists.txt. Quote them to avoid shell expansion.
    #[arg(value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Build area. Default: `<dir>-<config>-build` in the current directory.
    #[arg(short = 'b', long, value_name = "PATH")]
    pub build_path: Option<PathBuf>,

    /// cmake generator, e.g. "Ninja".
    #[arg(short = 'g', long, value_name = "NAME")]
    pub generator: Option<String>,

    /// Build configuration, e.g. Release, Debug. Default: Debug.
    #[arg(short = 'c', long, value_name = "CONFIG")]
    pub build_config: Option<String>,

    /// Always remove the existing build area before building.
    #[arg(long)]
    pub clean: bool,

    /// Watch mode: repeat the build and test cycle on every change.
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// cmake `-DVAR=VALUE` define. Repeatable.
    #[arg(short = 'D', value_name = "VAR=VALUE", action = ArgAction::Append)]
    pub define: Vec<String>,

    /// Exclude files and directories by name or pattern. Repeatable.
    #[arg(short = 'x', long, value_name = "PATTERN", action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// More v's, more output: -v echoes test output, -vv also commands.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Optional TOML config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Milliseconds between polls of the watch area. Default: 1000.
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// File name prefix of test sources. Default: test_.
    #[arg(long, value_name = "PREFIX")]
    pub test_prefix: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TTT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
