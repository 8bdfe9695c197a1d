// src/encoder/result.rs

//! Frame-writing result collector.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::trace;

use crate::encoder::context::SubResult;
use crate::encoder::docstring::describe;
use crate::errors::Result;
use crate::protocol::{FinishFrame, Marker, StartFrame, WireStatus};

/// Seconds since the Unix epoch.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// What the encoder needs to know about a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInfo {
    /// Dotted identity, e.g. `package.module.Case.test_name`.
    pub id: String,
    /// Raw documentation text, if any.
    pub doc: Option<String>,
}

impl TestInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// How a test id is turned into the path written in its start frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathStyle {
    /// The test id unchanged.
    #[default]
    Full,
    /// `<package>.<Case>.<method>`, where `<package>` is the segment just
    /// before a `tests` segment. Ids without one are reported unchanged.
    Package,
}

impl PathStyle {
    pub fn apply(self, id: &str) -> String {
        if self == PathStyle::Full {
            return id.to_string();
        }
        let segments: Vec<&str> = id.split('.').collect();
        let n = segments.len();
        match segments.iter().position(|s| *s == "tests") {
            Some(idx) if idx >= 1 && n >= 3 => {
                format!("{}.{}.{}", segments[idx - 1], segments[n - 2], segments[n - 1])
            }
            _ => id.to_string(),
        }
    }
}

/// Writes every test lifecycle callback to `stream` as protocol frames.
///
/// Write and serialization errors are returned to the caller; the run is
/// expected to stop on them.
#[derive(Debug)]
pub struct PipedResult<W: Write> {
    stream: W,
    first: bool,
    current: Option<String>,
    clock: fn() -> f64,
    path_style: PathStyle,
}

impl<W: Write> PipedResult<W> {
    pub fn new(stream: W) -> Self {
        Self::with_clock(stream, unix_now)
    }

    /// Use `clock` instead of the system time for every timestamp.
    pub fn with_clock(stream: W, clock: fn() -> f64) -> Self {
        Self {
            stream,
            first: true,
            current: None,
            clock,
            path_style: PathStyle::Full,
        }
    }

    pub fn with_path_style(mut self, style: PathStyle) -> Self {
        self.path_style = style;
        self
    }

    pub fn clock(&self) -> fn() -> f64 {
        self.clock
    }

    /// Identity of the test between its start and its final result.
    pub fn current_test(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.stream
    }

    pub fn start_test(&mut self, test: &TestInfo) -> Result<()> {
        self.current = Some(test.id.clone());

        let marker = if self.first {
            self.first = false;
            Marker::StartOfResults
        } else {
            Marker::Separator
        };
        writeln!(self.stream, "{}", marker.as_str())?;

        let frame = StartFrame {
            path: self.path_style.apply(&test.id),
            start_time: (self.clock)(),
        };
        self.write_frame(&frame)
    }

    pub fn add_success(&mut self, test: &TestInfo, output: &str) -> Result<()> {
        self.finish(test, WireStatus::Ok, None, output)
    }

    pub fn add_failure(&mut self, test: &TestInfo, error: &str, output: &str) -> Result<()> {
        self.finish(test, WireStatus::Fail, Some(error), output)
    }

    /// Report an error. When no test is open (the error came from setup
    /// code that ran before the test started) a start frame is written
    /// first so the record stays well formed.
    pub fn add_error(&mut self, test: &TestInfo, error: &str, output: &str) -> Result<()> {
        if self.current.is_none() {
            self.start_test(test)?;
        }
        self.finish(test, WireStatus::Error, Some(error), output)
    }

    pub fn add_skip(&mut self, test: &TestInfo, reason: &str, output: &str) -> Result<()> {
        self.finish(test, WireStatus::Skip, Some(reason), output)
    }

    pub fn add_expected_failure(&mut self, test: &TestInfo, error: &str, output: &str) -> Result<()> {
        self.finish(test, WireStatus::ExpectedFail, Some(error), output)
    }

    pub fn add_unexpected_success(&mut self, test: &TestInfo, output: &str) -> Result<()> {
        self.finish(test, WireStatus::UnexpectedSuccess, None, output)
    }

    /// Report one sub-result. The test stays open: more sub-results or a
    /// final result may follow without a separator.
    pub fn add_sub_test(&mut self, test: &TestInfo, sub: &SubResult) -> Result<()> {
        let frame = FinishFrame {
            status: sub.status,
            end_time: sub.end_time,
            description: describe(test.doc.as_deref()),
            output: sub.output.clone(),
            error: sub.error.clone(),
        };
        self.write_frame(&frame)
    }

    /// Forget the open test, whether or not a final result was written.
    pub fn stop_test(&mut self) {
        self.current = None;
    }

    /// Close the result stream.
    pub fn stop_run(&mut self) -> Result<()> {
        writeln!(self.stream, "{}", Marker::EndOfResults.as_str())?;
        self.stream.flush()?;
        Ok(())
    }

    fn finish(&mut self, test: &TestInfo, status: WireStatus, error: Option<&str>, output: &str) -> Result<()> {
        let frame = FinishFrame {
            status,
            end_time: (self.clock)(),
            description: describe(test.doc.as_deref()),
            output: output.to_string(),
            error: error.map(str::to_string),
        };
        self.write_frame(&frame)?;
        self.current = None;
        Ok(())
    }

    fn write_frame<T: Serialize>(&mut self, frame: &T) -> Result<()> {
        let line = serde_json::to_string(frame)?;
        trace!(frame = %line, "writing frame");
        writeln!(self.stream, "{line}")?;
        self.stream.flush()?;
        Ok(())
    }
}
