// src/executor.rs

//! Runs every discovered test binary and folds the outcomes into one
//! aggregate, re-running only the failing tests until they pass.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::errors::Result;
use crate::gtest::{SuiteRunner, TestRunResult};
use crate::types::OutcomeKind;
use crate::watch::TestBinary;

/// A failed or crashed test with what it printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub name: String,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub kind: OutcomeKind,
}

/// Totals over all binaries executed in one test step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub total_runtime_secs: f64,
    pub total_passed: usize,
    pub total_failed: usize,
    pub failures: Vec<FailureRecord>,
}

impl AggregateResult {
    fn absorb(&mut self, run: &TestRunResult) {
        self.total_runtime_secs += run.elapsed_ms as f64 / 1000.0;
        self.total_passed += run.passes;
        self.total_failed += run.fails;
        self.failures.extend(
            run.results
                .iter()
                .filter(|(_, outcome)| outcome.kind.is_failure())
                .map(|(name, outcome)| FailureRecord {
                    name: name.clone(),
                    stdout: outcome.stdout.clone(),
                    stderr: outcome.stderr.clone(),
                    kind: outcome.kind,
                }),
        );
    }
}

/// Executes test binaries through a [`SuiteRunner`], keeping a filter of
/// the tests that failed last time.
///
/// While the filter holds entries only those binaries run, each limited to
/// its failing tests, and the first binary still failing ends the pass.
#[derive(Debug)]
pub struct TestExecutor<R> {
    runner: R,
    filter: BTreeMap<PathBuf, Vec<String>>,
}

impl<R: SuiteRunner> TestExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            filter: BTreeMap::new(),
        }
    }

    /// Executable -> failing test names from its most recent run.
    pub fn filter(&self) -> &BTreeMap<PathBuf, Vec<String>> {
        &self.filter
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn run(&mut self, binaries: &[TestBinary]) -> Result<AggregateResult> {
        let filtering = !self.filter.is_empty();
        let mut aggregate = AggregateResult::default();
        let mut failing = BTreeMap::new();

        for binary in binaries {
            let names = match self.filter.get(&binary.executable) {
                Some(names) => names.clone(),
                None if filtering => continue,
                None => Vec::new(),
            };

            let run = self.runner.run_suite(binary, &names).await?;
            aggregate.absorb(&run);

            let failures = run.failures();
            debug!(
                exe = %binary.executable.display(),
                passes = run.passes,
                fails = run.fails,
                "test binary finished"
            );
            if failures.is_empty() {
                continue;
            }
            failing.insert(binary.executable.clone(), failures);
            if filtering {
                break;
            }
        }

        self.filter = failing;
        info!(
            passed = aggregate.total_passed,
            failed = aggregate.total_failed,
            filtered = self.filter.len(),
            "test step finished"
        );
        Ok(aggregate)
    }
}
