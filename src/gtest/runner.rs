// src/gtest/runner.rs

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use tracing::info;

use crate::errors::Result;
use crate::exec::{streamed_call, CommandSpec};
use crate::gtest::grammar::FILTER_FLAG;
use crate::gtest::parser::{GTestParser, TestRunResult};
use crate::term::Terminal;
use crate::types::Verbosity;
use crate::watch::TestBinary;

/// Runs one test binary, optionally restricted to some of its tests.
///
/// This is the seam the executor is tested through; production code uses
/// [`GTestRunner`].
pub trait SuiteRunner: Send {
    fn run_suite<'a>(
        &'a mut self,
        binary: &'a TestBinary,
        filter: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<TestRunResult>> + Send + 'a>>;
}

/// Command line running `executable`, limited to `filter` when non-empty.
pub fn gtest_command(executable: &Path, filter: &[String]) -> CommandSpec {
    let cmd = CommandSpec::new(executable);
    if filter.is_empty() {
        cmd
    } else {
        cmd.arg(format!("{FILTER_FLAG}{}", filter.join(":")))
    }
}

/// Executes real gtest binaries through [`streamed_call`], parsing their
/// output as it arrives.
#[derive(Debug, Clone)]
pub struct GTestRunner {
    term: Terminal,
}

impl GTestRunner {
    pub fn new(term: Terminal) -> Self {
        Self { term }
    }
}

impl SuiteRunner for GTestRunner {
    fn run_suite<'a>(
        &'a mut self,
        binary: &'a TestBinary,
        filter: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<TestRunResult>> + Send + 'a>> {
        Box::pin(async move {
            let cmd = gtest_command(&binary.executable, filter);
            self.term
                .writeln_at(Verbosity::Commands, &format!("Executing: {cmd}"));
            info!(exe = %binary.executable.display(), filtered = filter.len(), "running test binary");

            let mut parser =
                GTestParser::new(&binary.source, &binary.executable, self.term.clone());
            let output = streamed_call(&cmd, Some(&mut parser)).await?;
            parser.finish(output.exit_code)
        })
    }
}
