// src/engine/mod.rs

//! Control loop of ttt.
//!
//! This module ties together:
//! - the watcher (something that can be polled for changes)
//! - the builder
//! - the test stage (the executor and its failure filter)
//! - the reporters observing each cycle
//!
//! The loop itself lives in [`monitor`]; the queue of pending steps in
//! [`queue`]; the active / run-once flags in [`run_state`].

pub mod monitor;
pub mod queue;
pub mod run_state;

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::executor::{AggregateResult, TestExecutor};
use crate::gtest::SuiteRunner;
use crate::watch::{TestBinary, WatchState};

pub use monitor::{Monitor, MonitorOptions, DEFAULT_POLLING_INTERVAL};
pub use queue::OperationQueue;
pub use run_state::RunState;

/// One step of a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Tell the reporters what the poll found.
    ReportChange(WatchState),
    Build,
    Test,
}

/// Anything that can be polled for source changes and knows where the test
/// binaries are.
pub trait ChangeSource: Send {
    fn poll(&mut self) -> Result<WatchState>;
    fn test_binaries(&self) -> Result<Vec<TestBinary>>;
}

/// Runs the tests of a cycle.
pub trait TestStage: Send {
    fn test<'a>(
        &'a mut self,
        binaries: &'a [TestBinary],
    ) -> Pin<Box<dyn Future<Output = Result<AggregateResult>> + Send + 'a>>;

    /// Forget which tests failed, so the next run is a full one.
    fn clear_filter(&mut self);
}

impl<R: SuiteRunner> TestStage for TestExecutor<R> {
    fn test<'a>(
        &'a mut self,
        binaries: &'a [TestBinary],
    ) -> Pin<Box<dyn Future<Output = Result<AggregateResult>> + Send + 'a>> {
        Box::pin(self.run(binaries))
    }

    fn clear_filter(&mut self) {
        TestExecutor::clear_filter(self);
    }
}
