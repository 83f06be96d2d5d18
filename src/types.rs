// src/types.rs

//! Small value types shared across modules.

use std::fmt;

/// Which output channel of a child process a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single test case ended.
///
/// `Crashed` is kept apart from `Failed` because a crash (an SEH exception on
/// Windows) carries no assertion diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Passed,
    Failed,
    Crashed,
}

impl OutcomeKind {
    pub fn is_failure(self) -> bool {
        !matches!(self, OutcomeKind::Passed)
    }
}

/// Which part of a cycle a reporter session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Build,
    Test,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Build => f.write_str("build"),
            Session::Test => f.write_str("test"),
        }
    }
}

/// Amount of terminal output, threaded explicitly through constructors.
///
/// - `Quiet` (0): group headers and one glyph per test.
/// - `Trace` (1): additionally echo every line the test binary prints.
/// - `Commands` (2): additionally print every command line executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Quiet,
    Trace,
    Commands,
}

impl Verbosity {
    /// Map a `-v` occurrence count to a verbosity level.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Quiet,
            1 => Verbosity::Trace,
            _ => Verbosity::Commands,
        }
    }
}
