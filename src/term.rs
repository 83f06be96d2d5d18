// src/term.rs

//! Verbosity-aware line output shared by the reporter and the test parser.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::types::Verbosity;

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Writes text to an output stream when the text's level is at or below the
/// configured verbosity.
///
/// Cloning is cheap; clones share the same sink.
#[derive(Clone)]
pub struct Terminal {
    verbosity: Verbosity,
    sink: Option<Sink>,
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("verbosity", &self.verbosity)
            .field("silent", &self.sink.is_none())
            .finish()
    }
}

impl Terminal {
    pub fn stdout(verbosity: Verbosity) -> Self {
        Self::to_writer(std::io::stdout(), verbosity)
    }

    pub fn to_writer(writer: impl Write + Send + 'static, verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            sink: Some(Arc::new(Mutex::new(Box::new(writer)))),
        }
    }

    /// A terminal that discards everything.
    pub fn silent() -> Self {
        Self {
            verbosity: Verbosity::Quiet,
            sink: None,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn write_at(&self, level: Verbosity, text: &str) {
        if level > self.verbosity {
            return;
        }
        if let Some(sink) = &self.sink {
            if let Ok(mut w) = sink.lock() {
                let _ = w.write_all(text.as_bytes()).and_then(|_| w.flush());
            }
        }
    }

    pub fn writeln_at(&self, level: Verbosity, text: &str) {
        self.write_at(level, &format!("{text}\n"));
    }

    pub fn write(&self, text: &str) {
        self.write_at(Verbosity::Quiet, text);
    }

    pub fn writeln(&self, text: &str) {
        self.writeln_at(Verbosity::Quiet, text);
    }
}
