// src/gtest/mod.rs

//! googletest support: output grammar, parser and the binary runner.

pub mod grammar;
pub mod parser;
pub mod runner;

pub use parser::{GTestParser, TestOutcome, TestRunResult, SEH_MARKER};
pub use runner::{gtest_command, GTestRunner, SuiteRunner};
