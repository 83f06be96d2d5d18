// src/engine/monitor.rs

use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use super::queue::OperationQueue;
use super::run_state::RunState;
use super::{ChangeSource, Operation, TestStage};
use crate::build::{BuildError, Builder};
use crate::errors::Result;
use crate::executor::AggregateResult;
use crate::report::Reporter;
use crate::types::Session;

pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Pause between two polls. Also the window in which a second interrupt
    /// confirms the wish to exit.
    pub polling_interval: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            polling_interval: DEFAULT_POLLING_INTERVAL,
        }
    }
}

/// Polls for changes; on change builds and tests, notifying the reporters
/// along the way.
///
/// Interrupts arrive on a channel. The first one abandons the current cycle
/// and asks for confirmation; a second one within one polling interval
/// stops the loop.
pub struct Monitor<W, B, T> {
    watcher: W,
    builder: B,
    tester: T,
    reporters: Vec<Box<dyn Reporter>>,
    operations: OperationQueue,
    run_state: RunState,
    last_failed: usize,
    options: MonitorOptions,
}

impl<W, B, T> fmt::Debug for Monitor<W, B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("operations", &self.operations)
            .field("run_state", &self.run_state)
            .field("last_failed", &self.last_failed)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<W, B, T> Monitor<W, B, T>
where
    W: ChangeSource,
    B: Builder,
    T: TestStage,
{
    /// Build a monitor. The watcher is polled once here so the first loop
    /// iteration only sees changes made after startup.
    pub fn new(
        mut watcher: W,
        builder: B,
        tester: T,
        reporters: Vec<Box<dyn Reporter>>,
        options: MonitorOptions,
    ) -> Result<Self> {
        watcher.poll()?;
        Ok(Self {
            watcher,
            builder,
            tester,
            reporters,
            operations: OperationQueue::new(),
            run_state: RunState::new(),
            last_failed: 0,
            options,
        })
    }

    pub fn is_active(&self) -> bool {
        self.run_state.is_active()
    }

    pub fn watcher(&self) -> &W {
        &self.watcher
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn tester(&self) -> &T {
        &self.tester
    }

    pub fn operations(&self) -> &OperationQueue {
        &self.operations
    }

    /// Loop until stopped by a confirmed interrupt. Returns an error only
    /// when the watch area can no longer be polled.
    pub async fn run(&mut self, interrupts: &mut mpsc::Receiver<()>) -> Result<()> {
        info!(interval_ms = self.options.polling_interval.as_millis() as u64, "watching for changes");
        while self.run_state.is_active() {
            self.step(interrupts).await?;
        }
        info!("monitor stopped");
        Ok(())
    }

    /// One loop iteration: check for changes (running a cycle if needed),
    /// then pause for the polling interval.
    ///
    /// An interrupt drops the cycle in flight, killing its build or test
    /// process; a terminal Ctrl-C has already reached that child anyway.
    pub async fn step(&mut self, interrupts: &mut mpsc::Receiver<()>) -> Result<()> {
        let interrupted = tokio::select! {
            biased;
            checked = self.check_for_changes() => {
                checked?;
                false
            }
            Some(()) = interrupts.recv() => true,
        };

        let interrupted = interrupted
            || tokio::select! {
                biased;
                Some(()) = interrupts.recv() => true,
                _ = sleep(self.options.polling_interval) => false,
            };

        if interrupted {
            self.handle_interrupt(interrupts).await;
        }
        Ok(())
    }

    /// Build and test once, regardless of changes. Every error is returned.
    pub async fn run_once(&mut self) -> Result<AggregateResult> {
        self.build_step().await?;
        let results = self.test_step().await?;
        self.operations.clear();
        Ok(results)
    }

    async fn check_for_changes(&mut self) -> Result<()> {
        let state = self.watcher.poll()?;
        let forced = self.run_state.take_forced();
        if !state.has_changes() && !forced {
            return Ok(());
        }

        info!(
            inserts = state.inserts.len(),
            updates = state.updates.len(),
            deletes = state.deletes.len(),
            forced,
            "starting cycle"
        );
        self.operations.push_cycle(state);
        if let Err(e) = self.drain_operations().await {
            error!(error = %e, "cycle abandoned");
            self.notify(|r| r.report_error(&e));
        }
        self.operations.clear();
        self.notify(|r| r.wait_change());
        Ok(())
    }

    async fn drain_operations(&mut self) -> Result<()> {
        while let Some(op) = self.operations.pop() {
            debug!(?op, "running operation");
            match op {
                Operation::ReportChange(state) => self.notify(|r| r.report_change(&state)),
                Operation::Build => {
                    // Already reported; nothing else of this cycle runs.
                    if self.build_step().await.is_err() {
                        return Ok(());
                    }
                }
                Operation::Test => {
                    if let Err(e) = self.test_step().await {
                        self.operations.clear();
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }

    async fn build_step(&mut self) -> std::result::Result<(), BuildError> {
        self.notify(|r| r.session_start(Session::Build));
        self.notify(|r| r.report_build_path());

        let started = Instant::now();
        let outcome = self.builder.build().await;
        let elapsed = started.elapsed();

        if let Err(e) = &outcome {
            warn!(error = %e, "build failed");
            self.notify(|r| r.report_build_failure(e));
            self.operations.clear();
        }
        self.notify(|r| r.session_end(Session::Build, Some(elapsed)));
        outcome
    }

    async fn test_step(&mut self) -> Result<AggregateResult> {
        let binaries = self.watcher.test_binaries()?;

        self.notify(|r| r.session_start(Session::Test));
        let results = self.tester.test(&binaries).await?;
        self.notify(|r| r.report_results(&results));
        self.notify(|r| r.session_end(Session::Test, None));

        // A clean run right after failures may have been a filtered one;
        // confirm with a full run.
        if results.total_failed == 0 && self.last_failed > 0 {
            debug!(previously_failed = self.last_failed, "failures fixed; queueing full test run");
            self.operations.push(Operation::Test);
        }
        self.last_failed = results.total_failed;
        Ok(results)
    }

    async fn handle_interrupt(&mut self, interrupts: &mut mpsc::Receiver<()>) {
        info!("interrupt received");
        self.operations.clear();
        self.tester.clear_filter();
        self.notify(|r| r.interrupt_detected());

        match timeout(self.options.polling_interval, interrupts.recv()).await {
            Ok(Some(())) => {
                info!("second interrupt received; stopping");
                self.notify(|r| r.halt());
                self.run_state.stop();
            }
            Ok(None) | Err(_) => self.run_state.allow_once(),
        }
    }

    fn notify(&mut self, mut f: impl FnMut(&mut dyn Reporter)) {
        for reporter in &mut self.reporters {
            f(reporter.as_mut());
        }
    }
}
