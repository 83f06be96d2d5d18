/// A line printed by googletest on Windows when a structured exception
/// escapes a test.
pub const SEH_LINE: &str =
    "unknown file: error: SEH exception with code 0xc0000005 thrown in the test body.";

#[derive(Debug, Clone)]
enum Case {
    Pass(String),
    Fail(String, Vec<String>),
    Crash(String),
}

/// Builder for the console output of a googletest binary.
///
/// ```ignore
/// let lines = Transcript::new()
///     .group("core")
///     .pass("ok")
///     .fail("second", &["test_core.cc:12: Failure"])
///     .lines();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    groups: Vec<(String, Vec<Case>)>,
    elapsed_ms: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new test case; following tests belong to it.
    pub fn group(mut self, name: &str) -> Self {
        self.groups.push((name.to_string(), Vec::new()));
        self
    }

    pub fn pass(self, test: &str) -> Self {
        self.case(Case::Pass(test.to_string()))
    }

    pub fn fail(self, test: &str, diagnostics: &[&str]) -> Self {
        self.case(Case::Fail(
            test.to_string(),
            diagnostics.iter().map(|s| s.to_string()).collect(),
        ))
    }

    pub fn crash(self, test: &str) -> Self {
        self.case(Case::Crash(test.to_string()))
    }

    pub fn elapsed_ms(mut self, ms: u64) -> Self {
        self.elapsed_ms = ms;
        self
    }

    fn case(mut self, case: Case) -> Self {
        if self.groups.is_empty() {
            self.groups.push(("suite".to_string(), Vec::new()));
        }
        if let Some((_, cases)) = self.groups.last_mut() {
            cases.push(case);
        }
        self
    }

    pub fn lines(&self) -> Vec<String> {
        let total: usize = self.groups.iter().map(|(_, c)| c.len()).sum();
        let mut out = vec![
            "Running main() from gtest_main.cc".to_string(),
            format!(
                "[==========] Running {} from {}.",
                plural(total, "test"),
                plural(self.groups.len(), "test case")
            ),
            "[----------] Global test environment set-up.".to_string(),
        ];

        let mut failed = Vec::new();
        for (group, cases) in &self.groups {
            out.push(format!("[----------] {} from {group}", plural(cases.len(), "test")));
            for case in cases {
                match case {
                    Case::Pass(name) => {
                        out.push(format!("[ RUN      ] {group}.{name}"));
                        out.push(format!("[       OK ] {group}.{name} (0 ms)"));
                    }
                    Case::Fail(name, diagnostics) => {
                        out.push(format!("[ RUN      ] {group}.{name}"));
                        out.extend(diagnostics.iter().cloned());
                        out.push(format!("[  FAILED  ] {group}.{name} (0 ms)"));
                        failed.push(format!("{group}.{name}"));
                    }
                    Case::Crash(name) => {
                        out.push(format!("[ RUN      ] {group}.{name}"));
                        out.push(SEH_LINE.to_string());
                        out.push(format!("[  FAILED  ] {group}.{name} (0 ms)"));
                        failed.push(format!("{group}.{name}"));
                    }
                }
            }
            out.push(format!(
                "[----------] {} from {group} (0 ms total)",
                plural(cases.len(), "test")
            ));
            out.push(String::new());
        }

        out.push("[----------] Global test environment tear-down".to_string());
        out.push(format!(
            "[==========] {} from {} ran. ({} ms total)",
            plural(total, "test"),
            plural(self.groups.len(), "test case"),
            self.elapsed_ms
        ));
        out.push(format!("[  PASSED  ] {}.", plural(total - failed.len(), "test")));
        if !failed.is_empty() {
            out.push(format!(
                "[  FAILED  ] {}, listed below:",
                plural(failed.len(), "test")
            ));
            for name in &failed {
                out.push(format!("[  FAILED  ] {name}"));
            }
            out.push(String::new());
            out.push(format!(" {} FAILED TEST{}", failed.len(), if failed.len() == 1 { "" } else { "S" }));
        }
        out
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
