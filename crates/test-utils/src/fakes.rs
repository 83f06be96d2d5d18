use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ttt::build::{BuildError, Builder};
use ttt::engine::{ChangeSource, TestStage};
use ttt::errors::{Result, TttError};
use ttt::executor::AggregateResult;
use ttt::gtest::{GTestParser, SuiteRunner, TestRunResult};
use ttt::report::Reporter;
use ttt::term::Terminal;
use ttt::types::{Session, Stream};
use ttt::watch::{TestBinary, WatchState};

/// Ordered record of calls made on the fakes, shared between them so the
/// interleaving of poll / build / test / reporter calls can be asserted.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the calls named in `keep`, in order.
    pub fn filtered(&self, keep: &[&str]) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| keep.contains(&c.as_str()))
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// Watcher double: every poll reports a change unless told otherwise.
#[derive(Debug)]
pub struct FakeWatcher {
    log: CallLog,
    changes: Arc<AtomicBool>,
    fail_poll: Arc<AtomicBool>,
    binaries: Vec<TestBinary>,
}

impl FakeWatcher {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            changes: Arc::new(AtomicBool::new(true)),
            fail_poll: Arc::new(AtomicBool::new(false)),
            binaries: Vec::new(),
        }
    }

    /// Handle toggling whether polls report a change.
    pub fn changes(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.changes)
    }

    /// Handle toggling whether polls fail.
    pub fn fail_poll(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_poll)
    }

    pub fn with_binaries(mut self, binaries: Vec<TestBinary>) -> Self {
        self.binaries = binaries;
        self
    }
}

impl ChangeSource for FakeWatcher {
    fn poll(&mut self) -> Result<WatchState> {
        self.log.record("poll");
        if self.fail_poll.load(Ordering::SeqCst) {
            return Err(TttError::IoError(std::io::Error::other("watch area vanished")));
        }
        let mut state = WatchState::default();
        if self.changes.load(Ordering::SeqCst) {
            state.inserts.insert(PathBuf::from("/src/change.cc"));
        }
        Ok(state)
    }

    fn test_binaries(&self) -> Result<Vec<TestBinary>> {
        Ok(self.binaries.clone())
    }
}

/// Builder double that succeeds unless told to fail, optionally slowly.
#[derive(Debug)]
pub struct FakeBuilder {
    log: CallLog,
    fail: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl FakeBuilder {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail: Arc::new(AtomicBool::new(false)),
            delay: None,
        }
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail)
    }
}

impl Builder for FakeBuilder {
    fn build(&mut self) -> Pin<Box<dyn Future<Output = std::result::Result<(), BuildError>> + Send + '_>> {
        Box::pin(async move {
            self.log.record("build");
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(BuildError::CommandFailed {
                    command: "boom".to_string(),
                    code: 2,
                });
            }
            Ok(())
        })
    }
}

/// Test stage double reporting a configurable number of failures.
#[derive(Debug)]
pub struct FakeTestStage {
    log: CallLog,
    failures: Arc<AtomicUsize>,
    fail_with_error: Arc<AtomicBool>,
    filter_clears: Arc<AtomicUsize>,
}

impl FakeTestStage {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            failures: Arc::new(AtomicUsize::new(0)),
            fail_with_error: Arc::new(AtomicBool::new(false)),
            filter_clears: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle setting how many failures the next test runs report.
    pub fn failures(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.failures)
    }

    /// Handle making test runs return an error.
    pub fn fail_with_error(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_with_error)
    }

    pub fn filter_clears(&self) -> usize {
        self.filter_clears.load(Ordering::SeqCst)
    }
}

impl TestStage for FakeTestStage {
    fn test<'a>(
        &'a mut self,
        _binaries: &'a [TestBinary],
    ) -> Pin<Box<dyn Future<Output = Result<AggregateResult>> + Send + 'a>> {
        Box::pin(async move {
            self.log.record("test");
            if self.fail_with_error.load(Ordering::SeqCst) {
                return Err(TttError::CorruptOutput {
                    exe: "/build/test_core".to_string(),
                    reason: "test finished without a test name".to_string(),
                });
            }
            Ok(AggregateResult {
                total_failed: self.failures.load(Ordering::SeqCst),
                ..AggregateResult::default()
            })
        })
    }

    fn clear_filter(&mut self) {
        self.filter_clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Reporter recording the name of every notification.
#[derive(Debug, Clone)]
pub struct RecordingReporter {
    log: CallLog,
}

impl RecordingReporter {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl Reporter for RecordingReporter {
    fn session_start(&mut self, session: Session) {
        self.log.record(format!("session_start:{session}"));
    }

    fn session_end(&mut self, session: Session, _duration: Option<Duration>) {
        self.log.record(format!("session_end:{session}"));
    }

    fn report_build_path(&mut self) {
        self.log.record("report_build_path");
    }

    fn report_change(&mut self, _state: &WatchState) {
        self.log.record("report_change");
    }

    fn report_build_failure(&mut self, _error: &BuildError) {
        self.log.record("report_build_failure");
    }

    fn report_results(&mut self, _results: &AggregateResult) {
        self.log.record("report_results");
    }

    fn report_error(&mut self, _error: &TttError) {
        self.log.record("report_error");
    }

    fn wait_change(&mut self) {
        self.log.record("wait_change");
    }

    fn interrupt_detected(&mut self) {
        self.log.record("interrupt_detected");
    }

    fn halt(&mut self) {
        self.log.record("halt");
    }
}

/// Suite runner replaying canned gtest output through the real parser.
///
/// Each executable has a queue of transcripts; the last one is replayed
/// once the queue is down to it. Every invocation is recorded with the
/// filter it was given.
#[derive(Debug, Default)]
pub struct ScriptedSuiteRunner {
    scripts: BTreeMap<PathBuf, VecDeque<Vec<String>>>,
    calls: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
}

impl ScriptedSuiteRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, executable: impl AsRef<Path>, lines: Vec<String>) -> Self {
        self.scripts
            .entry(executable.as_ref().to_path_buf())
            .or_default()
            .push_back(lines);
        self
    }

    /// `(executable, filter)` for every run so far.
    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn next_script(&mut self, executable: &Path) -> Vec<String> {
        match self.scripts.get_mut(executable) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

impl SuiteRunner for ScriptedSuiteRunner {
    fn run_suite<'a>(
        &'a mut self,
        binary: &'a TestBinary,
        filter: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<TestRunResult>> + Send + 'a>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((binary.executable.clone(), filter.to_vec()));

            let mut parser = GTestParser::new(&binary.source, &binary.executable, Terminal::silent());
            for line in self.next_script(&binary.executable) {
                parser.feed(Stream::Stdout, &line);
            }
            parser.finish(0)
        })
    }
}
