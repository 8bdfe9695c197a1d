// src/encoder/context.rs

//! Per-test execution context: output capture and sub-results.

use std::fmt;

use crate::protocol::WireStatus;

/// Result of one sub-test, recorded at the moment it finished.
#[derive(Debug, Clone, PartialEq)]
pub struct SubResult {
    pub label: String,
    pub status: WireStatus,
    pub error: Option<String>,
    pub end_time: f64,
    /// Everything the test had written when the sub-test finished.
    pub output: String,
}

/// Why a sub-test did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubFailure {
    /// An assertion failed.
    Fail(String),
    /// Anything else went wrong.
    Error(String),
}

/// Handed to a test body while it runs.
///
/// Everything the body writes here is captured and reported in the test's
/// result frame instead of being printed.
#[derive(Debug)]
pub struct TestContext {
    output: String,
    subresults: Vec<SubResult>,
    clock: fn() -> f64,
}

impl TestContext {
    pub(crate) fn new(clock: fn() -> f64) -> Self {
        Self {
            output: String::new(),
            subresults: Vec::new(),
            clock,
        }
    }

    /// Output captured so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Run one labelled sub-test and record its outcome.
    ///
    /// Returns `true` when the sub-test passed.
    pub fn subtest<F>(&mut self, label: &str, body: F) -> bool
    where
        F: FnOnce(&mut TestContext) -> Result<(), SubFailure>,
    {
        let outcome = body(self);
        let (status, error) = match outcome {
            Ok(()) => (WireStatus::Ok, None),
            Err(SubFailure::Fail(msg)) => (WireStatus::Fail, Some(msg)),
            Err(SubFailure::Error(msg)) => (WireStatus::Error, Some(msg)),
        };
        self.subresults.push(SubResult {
            label: label.to_string(),
            status,
            error,
            end_time: (self.clock)(),
            output: self.output.clone(),
        });
        status == WireStatus::Ok
    }

    pub fn subresults(&self) -> &[SubResult] {
        &self.subresults
    }

    /// Add text the body printed outside the context.
    pub(crate) fn append_output(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub(crate) fn any_subtest_failed(&self) -> bool {
        self.subresults.iter().any(|s| s.status != WireStatus::Ok)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<SubResult>) {
        (self.output, self.subresults)
    }
}

impl fmt::Write for TestContext {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}
