// src/report/mod.rs

//! Observers of the monitor loop.
//!
//! The monitor calls every registered [`Reporter`] at fixed points of a
//! cycle. All methods default to doing nothing, so a reporter implements
//! only what it renders.

pub mod terminal;

use std::time::Duration;

use crate::build::BuildError;
use crate::errors::TttError;
use crate::executor::AggregateResult;
use crate::types::Session;
use crate::watch::WatchState;

pub use terminal::{pad_line, TerminalReporter};

pub trait Reporter: Send {
    fn session_start(&mut self, _session: Session) {}

    fn session_end(&mut self, _session: Session, _duration: Option<Duration>) {}

    fn report_build_path(&mut self) {}

    fn report_change(&mut self, _state: &WatchState) {}

    fn report_build_failure(&mut self, _error: &BuildError) {}

    fn report_results(&mut self, _results: &AggregateResult) {}

    /// A cycle was abandoned because of an error other than a failed build.
    fn report_error(&mut self, _error: &TttError) {}

    fn wait_change(&mut self) {}

    fn interrupt_detected(&mut self) {}

    fn halt(&mut self) {}
}
