// src/report/terminal.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::build::BuildError;
use crate::errors::TttError;
use crate::executor::{AggregateResult, FailureRecord};
use crate::report::Reporter;
use crate::term::Terminal;
use crate::types::{OutcomeKind, Session};
use crate::watch::WatchState;

/// Lines padded with [`pad_line`] never exceed this many columns.
pub const TERMINAL_MAX_WIDTH: usize = 78;

/// Centre `text` between runs of `pad`, separated by one space on each side,
/// so the result is `width` columns wide (capped at [`TERMINAL_MAX_WIDTH`]).
/// Odd padding goes to the right.
///
/// ```
/// use ttt::report::pad_line;
/// assert_eq!(pad_line("hello", '*', 10), "* hello **");
/// assert_eq!(pad_line("hello", '*', 11), "** hello **");
/// ```
pub fn pad_line(text: &str, pad: char, width: usize) -> String {
    let width = width.min(TERMINAL_MAX_WIDTH);
    if width == 0 {
        return text.to_string();
    }
    let total = width.saturating_sub(text.chars().count() + 2);
    let left = total / 2;
    let right = total - left;
    format!(
        "{} {} {}",
        pad.to_string().repeat(left),
        text,
        pad.to_string().repeat(right)
    )
}

fn local_timestamp() -> String {
    chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string()
}

/// Human readable progress on the terminal running ttt.
pub struct TerminalReporter {
    term: Terminal,
    watch_path: PathBuf,
    build_path: PathBuf,
    clock: fn() -> String,
}

impl TerminalReporter {
    pub fn new(watch_path: impl Into<PathBuf>, build_path: impl Into<PathBuf>, term: Terminal) -> Self {
        Self {
            term,
            watch_path: watch_path.into(),
            build_path: build_path.into(),
            clock: local_timestamp,
        }
    }

    /// Replace the source of the "Since:" timestamp.
    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    fn line(&self, text: &str) {
        self.term.writeln(text);
    }

    fn padded(&self, text: &str, pad: char) {
        self.term.writeln(&pad_line(text, pad, TERMINAL_MAX_WIDTH));
    }

    fn report_failures(&self, failures: &[FailureRecord]) {
        self.padded("FAILURES", '=');
        for failure in failures {
            self.padded(&failure.name, '_');
            match failure.kind {
                OutcomeKind::Crashed => {
                    let details = failure.stdout.get(1..).unwrap_or_default();
                    self.line(&details.join("\n"));
                    let marker = failure.stdout.first().map(String::as_str).unwrap_or("");
                    self.padded(&format!(" !!! {marker} !!!"), '_');
                }
                _ => {
                    let start = find_source_line(&failure.stdout, &self.watch_path);
                    let (extra, details) = failure.stdout.split_at(start);
                    self.line(&details.join("\n"));
                    if !extra.is_empty() {
                        self.padded("Additional output", '-');
                        self.line(&extra.join("\n"));
                    }
                    if !failure.stderr.is_empty() {
                        self.padded("Captured stderr", '-');
                        self.line(&failure.stderr.join("\n"));
                    }
                    let locator = details
                        .first()
                        .map(|l| strip_path(l, &self.watch_path))
                        .unwrap_or("");
                    self.padded(strip_trailer(locator), '_');
                }
            }
        }
    }
}

impl Reporter for TerminalReporter {
    fn session_start(&mut self, session: Session) {
        self.padded(&format!("{session} session starts"), '=');
    }

    fn session_end(&mut self, session: Session, duration: Option<Duration>) {
        let mut text = format!("{session} session ends");
        if let Some(d) = duration {
            text.push_str(&format!("; time to complete: {:.3}s", d.as_secs_f64()));
        }
        self.padded(&text, '=');
    }

    fn report_build_path(&mut self) {
        self.line(&format!("### Building:   {}", self.build_path.display()));
    }

    fn report_change(&mut self, state: &WatchState) {
        for (label, paths) in [
            ("CREATED", &state.inserts),
            ("MODIFIED", &state.updates),
            ("DELETED", &state.deletes),
        ] {
            for path in paths {
                self.line(&format!("# {label} {}", path.display()));
            }
        }
        self.line(&format!(
            "### Scan time: {:10.3}s",
            state.walk_time.as_secs_f64()
        ));
    }

    fn report_build_failure(&mut self, error: &BuildError) {
        self.line(&format!("### Build failed: {error}"));
    }

    fn report_results(&mut self, results: &AggregateResult) {
        let shortstats = format!(
            "{} passed in {:.3} seconds",
            results.total_passed, results.total_runtime_secs
        );
        if results.total_failed > 0 {
            self.report_failures(&results.failures);
            self.padded(&format!("{} failed, {shortstats}", results.total_failed), '=');
        } else {
            self.padded(&shortstats, '=');
        }
    }

    fn report_error(&mut self, error: &TttError) {
        self.line(&format!("### Error: {error}"));
    }

    fn wait_change(&mut self) {
        self.padded("waiting for changes", '#');
        self.line(&format!("### Since:      {}", (self.clock)()));
        self.line(&format!("### Watching:   {}", self.watch_path.display()));
        self.line(&format!("### Build at:   {}", self.build_path.display()));
        self.line(&format!("### Using ttt:  {}", env!("CARGO_PKG_VERSION")));
    }

    fn interrupt_detected(&mut self) {
        self.line("");
        self.line("Interrupt again to exit.");
    }

    fn halt(&mut self) {
        self.line("");
        self.line("Watching stopped.");
    }
}

/// Index of the first line mentioning the watch root: where the assertion
/// diagnostics start. Anything before it is output the test printed itself.
fn find_source_line(lines: &[String], watch_path: &Path) -> usize {
    let root = watch_path.to_string_lossy();
    lines
        .iter()
        .position(|l| l.contains(root.as_ref()))
        .unwrap_or(0)
}

/// `/src/proj/test/test_core.cc:12: Failure` -> `test/test_core.cc:12: Failure`.
fn strip_path<'a>(line: &'a str, watch_path: &Path) -> &'a str {
    let root = watch_path.to_string_lossy();
    match line.find(root.as_ref()) {
        Some(idx) => line
            .get(idx + root.len() + 1..)
            .unwrap_or(line),
        None => line,
    }
}

/// `test/test_core.cc:12: Failure` -> `test/test_core.cc:12`.
fn strip_trailer(locator: &str) -> &str {
    match locator.find(' ') {
        Some(idx) if idx > 0 => {
            let mut head = locator[..idx].chars();
            head.next_back();
            head.as_str()
        }
        _ => locator,
    }
}
