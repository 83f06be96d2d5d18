// src/gtest/grammar.rs

//! Recognisers for the googletest console output.
//!
//! A run with one passing and one failing test looks like:
//!
//! ```text
//! Running main() from gtest_main.cc
//! [==========] Running 2 tests from 1 test case.
//! [----------] Global test environment set-up.
//! [----------] 2 tests from core
//! [ RUN      ] core.ok
//! [       OK ] core.ok (0 ms)
//! [ RUN      ] core.second
//! /src/test/test_core.cc:12: Failure
//! Value of: 4
//! Expected: ok()
//! Which is: 42
//! [  FAILED  ] core.second (0 ms)
//! [----------] 2 tests from core (1 ms total)
//!
//! [----------] Global test environment tear-down
//! [==========] 2 tests from 1 test case ran. (1 ms total)
//! [  PASSED  ] 1 test.
//! [  FAILED  ] 1 test, listed below:
//! [  FAILED  ] core.second
//! ```
//!
//! A "test case" (newer releases: "test suite") is a group of tests.

use std::sync::LazyLock;

use regex::Regex;

static TESTCASE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[-{10}\] \d+ tests? from (.*?)$").expect("valid regex"));

static TESTCASE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[-{10}\] \d+ tests? from (.*?) \(\d+ ms total\)$").expect("valid regex")
});

static TEST_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[ RUN      \] (.*?)$").expect("valid regex"));

static TEST_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[  (FAILED |     OK) \] (.*?)$").expect("valid regex"));

static ELAPSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[={10}\] \d+ tests? from \d+ test (?:cases?|suites?) ran\. \((\d+) ms total\)$")
        .expect("valid regex")
});

static SEH_CRASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SEH exception with code 0x[0-9A-Fa-f]+ thrown in").expect("valid regex")
});

/// Command line option restricting a run to the named tests.
pub const FILTER_FLAG: &str = "--gtest_filter=";

/// `[----------] N tests from GROUP` -> `GROUP`.
pub fn testcase_start(line: &str) -> Option<&str> {
    TESTCASE_START
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `[----------] N tests from GROUP (T ms total)`.
pub fn testcase_end(line: &str) -> bool {
    TESTCASE_END.is_match(line)
}

/// `[ RUN      ] NAME` -> `NAME`.
pub fn test_start(line: &str) -> Option<&str> {
    TEST_START
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

/// `[       OK ] NAME (T ms)` / `[  FAILED  ] NAME (T ms)` -> failed?
pub fn test_end(line: &str) -> Option<bool> {
    TEST_END
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str() == "FAILED ")
}

/// `[==========] N tests from M test cases ran. (T ms total)` -> `T`.
pub fn elapsed_ms(line: &str) -> Option<u64> {
    ELAPSED
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A Windows structured exception escaped the test body.
pub fn is_seh_crash(line: &str) -> bool {
    SEH_CRASH.is_match(line)
}
