// src/model/status.rs

//! Test result status codes.

use std::fmt;

/// Outcome of a single test method, ordered by severity.
///
/// The numeric codes are part of the model: when a test reports several
/// sub-results, the one with the highest code wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestStatus {
    Pass = 100,
    Skip = 200,
    ExpectedFail = 300,
    UnexpectedSuccess = 400,
    Fail = 500,
    Error = 600,
}

impl TestStatus {
    /// Statuses that count as a failed run.
    pub const FAILING: [TestStatus; 3] = [
        TestStatus::Fail,
        TestStatus::UnexpectedSuccess,
        TestStatus::Error,
    ];

    /// All statuses, least severe first.
    pub const ALL: [TestStatus; 6] = [
        TestStatus::Pass,
        TestStatus::Skip,
        TestStatus::ExpectedFail,
        TestStatus::UnexpectedSuccess,
        TestStatus::Fail,
        TestStatus::Error,
    ];

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn is_failing(self) -> bool {
        Self::FAILING.contains(&self)
    }

    /// Plural label used in run summaries ("3 failures").
    pub fn label(self) -> &'static str {
        match self {
            TestStatus::Pass => "passed",
            TestStatus::Skip => "skipped",
            TestStatus::ExpectedFail => "expected failures",
            TestStatus::UnexpectedSuccess => "unexpected successes",
            TestStatus::Fail => "failures",
            TestStatus::Error => "errors",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestStatus::Pass => "PASS",
            TestStatus::Skip => "SKIP",
            TestStatus::ExpectedFail => "EXPECTED_FAIL",
            TestStatus::UnexpectedSuccess => "UNEXPECTED_SUCCESS",
            TestStatus::Fail => "FAIL",
            TestStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Last recorded execution result of a test method.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub status: TestStatus,
    pub output: String,
    pub error: Option<String>,
    /// Wall-clock duration in seconds.
    pub duration: f64,
}
