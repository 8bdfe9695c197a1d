// src/encoder/suite.rs

//! Running tests and streaming their results.
//!
//! How tests are discovered is up to the embedding executor; this module
//! only needs them as [`TestCase`] values grouped into [`Suite`]s.

use std::fs::File;
use std::io::Write;

use tracing::{debug, info};

use crate::encoder::capture;
use crate::encoder::context::TestContext;
use crate::encoder::result::{PathStyle, PipedResult, TestInfo};
use crate::errors::Result;

/// Final outcome of a test body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
    Error(String),
    Skip(String),
    ExpectedFailure(String),
    UnexpectedSuccess,
}

/// A runnable test.
pub trait TestCase {
    fn info(&self) -> TestInfo;

    fn run(&self, ctx: &mut TestContext) -> Outcome;
}

type SetUpHook = Box<dyn Fn() -> std::result::Result<(), String>>;

/// Tests sharing one optional setup hook.
pub struct Suite {
    pub name: String,
    set_up: Option<SetUpHook>,
    tests: Vec<Box<dyn TestCase>>,
}

impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("has_set_up", &self.set_up.is_some())
            .field("tests", &self.test_ids())
            .finish()
    }
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            set_up: None,
            tests: Vec::new(),
        }
    }

    /// Hook run once before the suite's tests. If it fails, every test in
    /// the suite is reported as an error without running.
    pub fn with_set_up<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> std::result::Result<(), String> + 'static,
    {
        self.set_up = Some(Box::new(hook));
        self
    }

    pub fn with_test<T: TestCase + 'static>(mut self, test: T) -> Self {
        self.tests.push(Box::new(test));
        self
    }

    pub fn push(&mut self, test: Box<dyn TestCase>) {
        self.tests.push(test);
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn test_ids(&self) -> Vec<String> {
        self.tests.iter().map(|t| t.info().id).collect()
    }
}

/// Whether `label` selects the test `test_id`.
///
/// A label selects a test by exact id; a label without dots selects every
/// test of that module, and a label with one dot every test of that
/// `module.Case`.
pub fn matches_label(test_id: &str, label: &str) -> bool {
    if test_id == label {
        return true;
    }
    match label.matches('.').count() {
        0 => test_id.split('.').next() == Some(label),
        1 => test_id
            .rsplit_once('.')
            .is_some_and(|(parent, _)| parent == label),
        _ => false,
    }
}

/// Keep only tests selected by at least one label, dropping suites left
/// empty. An empty label list keeps everything.
pub fn select_tests(suites: &mut Vec<Suite>, labels: &[String]) {
    if labels.is_empty() {
        return;
    }
    for suite in suites.iter_mut() {
        suite.tests.retain(|test| {
            let id = test.info().id;
            labels.iter().any(|label| matches_label(&id, label))
        });
    }
    suites.retain(|suite| !suite.is_empty());
}

/// Runs suites and writes their results as protocol frames.
#[derive(Debug)]
pub struct PipedRunner<W: Write> {
    result: PipedResult<W>,
    capture_stdout: bool,
}

impl PipedRunner<File> {
    /// Runner for an executor process.
    ///
    /// Frames go to the process's stdout, and whatever a test body prints to
    /// stdout is captured into that test's result instead.
    pub fn for_stdout() -> Result<Self> {
        let stream = capture::stdout_handle()?;
        Ok(Self::new(stream).capture_stdout(true))
    }
}

impl<W: Write> PipedRunner<W> {
    pub fn new(stream: W) -> Self {
        Self {
            result: PipedResult::new(stream),
            capture_stdout: false,
        }
    }

    pub fn with_clock(stream: W, clock: fn() -> f64) -> Self {
        Self {
            result: PipedResult::with_clock(stream, clock),
            capture_stdout: false,
        }
    }

    /// Redirect the process's stdout into each test's output while its body
    /// runs. Requires that `stream` is not the redirected stdout itself.
    pub fn capture_stdout(mut self, enabled: bool) -> Self {
        self.capture_stdout = enabled;
        self
    }

    pub fn with_path_style(mut self, style: PathStyle) -> Self {
        self.result = self.result.with_path_style(style);
        self
    }

    pub fn into_inner(self) -> W {
        self.result.into_inner()
    }

    /// Run every suite in order and close the stream.
    ///
    /// Returns the number of tests reported.
    pub fn run(&mut self, suites: &[Suite]) -> Result<usize> {
        let mut reported = 0;
        for suite in suites {
            reported += self.run_suite(suite)?;
        }
        self.result.stop_run()?;
        info!(tests = reported, "test run complete");
        Ok(reported)
    }

    fn run_suite(&mut self, suite: &Suite) -> Result<usize> {
        if let Some(set_up) = &suite.set_up {
            if let Err(err) = set_up() {
                debug!(suite = %suite.name, error = %err, "suite setup failed");
                let message = format!("Suite setup for {} failed: {err}", suite.name);
                for test in &suite.tests {
                    self.result.add_error(&test.info(), &message, "")?;
                }
                return Ok(suite.tests.len());
            }
        }

        for test in &suite.tests {
            self.run_test(test.as_ref())?;
        }
        Ok(suite.tests.len())
    }

    fn run_test(&mut self, test: &dyn TestCase) -> Result<()> {
        let info = test.info();
        self.result.start_test(&info)?;

        let mut ctx = TestContext::new(self.result.clock());
        let outcome = if self.capture_stdout {
            let (outcome, printed) = capture::capture_stdout(|| test.run(&mut ctx))?;
            ctx.append_output(&printed);
            outcome
        } else {
            test.run(&mut ctx)
        };
        let subtest_failed = ctx.any_subtest_failed();
        let (output, mut subresults) = ctx.into_parts();

        // Without a final line, the last sub-result carries the whole output.
        if matches!(outcome, Outcome::Success) && subtest_failed {
            if let Some(last) = subresults.last_mut() {
                last.output.clone_from(&output);
            }
        }

        for sub in &subresults {
            self.result.add_sub_test(&info, sub)?;
        }

        let reported = match outcome {
            // A failed sub-test already settled the outcome of the test.
            Outcome::Success if subtest_failed => Ok(()),
            Outcome::Success => self.result.add_success(&info, &output),
            Outcome::Failure(err) => self.result.add_failure(&info, &err, &output),
            Outcome::Error(err) => self.result.add_error(&info, &err, &output),
            Outcome::Skip(reason) => self.result.add_skip(&info, &reason, &output),
            Outcome::ExpectedFailure(err) => self.result.add_expected_failure(&info, &err, &output),
            Outcome::UnexpectedSuccess => self.result.add_unexpected_success(&info, &output),
        };
        self.result.stop_test();
        reported
    }
}
