// src/gtest/parser.rs

//! Line-driven state machine turning googletest console output into
//! per-test outcomes, with live progress on the terminal.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{Result, TttError};
use crate::exec::LineListener;
use crate::gtest::grammar;
use crate::term::Terminal;
use crate::types::{OutcomeKind, Stream, Verbosity};

/// First captured stdout line of a test that died from an SEH exception.
pub const SEH_MARKER: &str = "SEH Exception";

/// How a single test case ended plus what it printed while running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub kind: OutcomeKind,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

/// Everything learned from one execution of one test binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestRunResult {
    /// `"group.test"` -> outcome, in the order the tests ran.
    pub results: Vec<(String, TestOutcome)>,
    pub passes: usize,
    pub fails: usize,
    /// Total reported by the binary's summary line; 0 without one.
    pub elapsed_ms: u64,
}

impl TestRunResult {
    /// Names of failed and crashed tests, in encounter order.
    pub fn failures(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|(_, outcome)| outcome.kind.is_failure())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn outcome(&self, name: &str) -> Option<&TestOutcome> {
        self.results
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    fn record(&mut self, name: String, outcome: TestOutcome) {
        if outcome.kind.is_failure() {
            self.fails += 1;
        } else {
            self.passes += 1;
        }
        match self.results.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = outcome,
            None => self.results.push((name, outcome)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    WaitingTestcase,
    WaitingTest,
    InTest,
}

/// Consumes the output of one gtest binary, line by line.
#[derive(Debug)]
pub struct GTestParser {
    source: PathBuf,
    executable: PathBuf,
    term: Terminal,
    state: ParserState,
    group: Option<String>,
    test: Option<String>,
    stdout: Vec<String>,
    stderr: Vec<String>,
    result: TestRunResult,
    corruption: Option<String>,
}

impl GTestParser {
    pub fn new(source: impl Into<PathBuf>, executable: impl Into<PathBuf>, term: Terminal) -> Self {
        Self {
            source: source.into(),
            executable: executable.into(),
            term,
            state: ParserState::WaitingTestcase,
            group: None,
            test: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            result: TestRunResult::default(),
            corruption: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Forget everything seen so far; the parser is ready for a new run.
    pub fn reset(&mut self) {
        self.state = ParserState::WaitingTestcase;
        self.group = None;
        self.test = None;
        self.stdout.clear();
        self.stderr.clear();
        self.result = TestRunResult::default();
        self.corruption = None;
    }

    pub fn results(&self) -> &[(String, TestOutcome)] {
        &self.result.results
    }

    pub fn failures(&self) -> Vec<String> {
        self.result.failures()
    }

    pub fn passes(&self) -> usize {
        self.result.passes
    }

    pub fn fails(&self) -> usize {
        self.result.fails
    }

    pub fn run_time_ms(&self) -> u64 {
        self.result.elapsed_ms
    }

    /// Feed one line of output.
    pub fn feed(&mut self, stream: Stream, line: &str) {
        match self.state {
            ParserState::WaitingTestcase => {
                if let Some(group) = grammar::testcase_start(line) {
                    self.begin_testcase(group);
                    return;
                }
                if let Some(ms) = grammar::elapsed_ms(line) {
                    self.result.elapsed_ms = ms;
                    return;
                }
            }
            ParserState::WaitingTest => {
                if grammar::testcase_end(line) {
                    self.end_testcase();
                    return;
                }
                if let Some(name) = grammar::test_start(line) {
                    self.begin_test(name);
                    return;
                }
            }
            ParserState::InTest => {
                if let Some(failed) = grammar::test_end(line) {
                    let kind = if failed { OutcomeKind::Failed } else { OutcomeKind::Passed };
                    self.end_test(kind, None);
                    return;
                }
            }
        }

        self.other_line(stream, line);

        if self.state == ParserState::InTest && grammar::is_seh_crash(line) {
            self.end_test(OutcomeKind::Crashed, Some(SEH_MARKER.to_string()));
        }
    }

    /// Close the run once the process exited with `exit_code`.
    ///
    /// A test still running at this point never finished: it is recorded as
    /// crashed. Returns the collected results, or the first corruption seen.
    pub fn finish(mut self, exit_code: i32) -> Result<TestRunResult> {
        if self.state == ParserState::InTest {
            warn!(
                exe = %self.executable.display(),
                test = self.test.as_deref().unwrap_or(""),
                exit_code,
                "test binary exited in the middle of a test"
            );
            self.end_test(
                OutcomeKind::Crashed,
                Some(format!("Abnormal termination (exit code {exit_code})")),
            );
            self.term.writeln("");
        }

        match self.corruption {
            Some(reason) => Err(TttError::CorruptOutput {
                exe: self.executable.display().to_string(),
                reason,
            }),
            None => Ok(self.result),
        }
    }

    fn begin_testcase(&mut self, group: &str) {
        self.group = non_empty(group);
        self.term
            .write(&format!("{} :: {} ", self.source.display(), group));
        self.state = ParserState::WaitingTest;
    }

    fn end_testcase(&mut self) {
        self.group = None;
        self.term.writeln("");
        self.state = ParserState::WaitingTestcase;
    }

    fn begin_test(&mut self, name: &str) {
        self.test = non_empty(name);
        self.stdout.clear();
        self.stderr.clear();
        self.state = ParserState::InTest;
    }

    fn end_test(&mut self, kind: OutcomeKind, synthetic: Option<String>) {
        self.state = ParserState::WaitingTest;

        let mut stdout = std::mem::take(&mut self.stdout);
        let stderr = std::mem::take(&mut self.stderr);

        let name = match (&self.group, self.test.take()) {
            (Some(_), Some(name)) => name,
            (None, _) => return self.corrupt("test finished outside of a test case"),
            (_, None) => return self.corrupt("test finished without a test name"),
        };

        if let Some(line) = synthetic {
            stdout.insert(0, line);
        }

        self.term.write(match kind {
            OutcomeKind::Passed => ".",
            OutcomeKind::Failed => "F",
            OutcomeKind::Crashed => "X",
        });
        debug!(test = %name, ?kind, "test finished");

        self.result.record(name, TestOutcome { kind, stdout, stderr });
    }

    fn other_line(&mut self, stream: Stream, line: &str) {
        self.term.writeln_at(Verbosity::Trace, line);
        match stream {
            Stream::Stdout => self.stdout.push(line.to_string()),
            Stream::Stderr => self.stderr.push(line.to_string()),
        }
    }

    fn corrupt(&mut self, reason: &str) {
        warn!(exe = %self.executable.display(), reason, "corrupted test output");
        if self.corruption.is_none() {
            self.corruption = Some(reason.to_string());
        }
    }
}

impl LineListener for GTestParser {
    fn on_line(&mut self, stream: Stream, line: &str) {
        self.feed(stream, line);
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
