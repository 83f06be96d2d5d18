// src/engine/queue.rs

use std::collections::VecDeque;

use tracing::debug;

use super::Operation;
use crate::watch::WatchState;

/// Steps waiting to run in the current cycle, consumed front to back.
#[derive(Debug, Default)]
pub struct OperationQueue {
    pending: VecDeque<Operation>,
}

impl OperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: Operation) {
        self.pending.push_back(op);
    }

    /// Queue a full cycle: report the change, build, test.
    pub fn push_cycle(&mut self, state: WatchState) {
        self.push(Operation::ReportChange(state));
        self.push(Operation::Build);
        self.push(Operation::Test);
    }

    pub fn pop(&mut self) -> Option<Operation> {
        self.pending.pop_front()
    }

    /// Drop every pending step.
    pub fn clear(&mut self) {
        if !self.pending.is_empty() {
            debug!(dropped = self.pending.len(), "clearing pending operations");
        }
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.pending.iter()
    }
}
