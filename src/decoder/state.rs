// src/decoder/state.rs

//! Incremental decoder for the executor's stdout.
//!
//! This is a synchronous, IO-free state machine: feed it cleaned stdout
//! lines one at a time and it updates the [`Project`] and pushes the
//! resulting [`RunEvent`]s. The process supervisor drives it from its poll
//! step; tests drive it with canned line sequences.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::decoder::aggregate::aggregate;
use crate::decoder::eta::{estimate_remaining, format_remaining};
use crate::decoder::{Flow, RunEvent};
use crate::model::{Project, TestResult, TestStatus};
use crate::protocol::{strip_escape_prefix, FinishFrame, Marker, StartFrame};

/// Error text recorded when a record has a start line but no result line.
pub const NO_RESULT_MESSAGE: &str = "Test did not report a result";

/// Where the decoder is in the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderState {
    /// Before the start-of-results marker; lines are banner chatter.
    Preamble,
    /// Inside the results section, no record open.
    BetweenFrames,
    /// A record is open for `start.path`; `results` holds its raw result lines.
    Accumulating {
        start: StartFrame,
        results: Vec<String>,
    },
}

/// Decoder state plus the run statistics it maintains.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecoderState,
    total_count: usize,
    completed_count: usize,
    /// Start time of the first completed test.
    start_time: Option<f64>,
    result_count: BTreeMap<TestStatus, usize>,
    finished: bool,
}

impl FrameDecoder {
    /// `total_count` is the number of tests expected in this run (0 if
    /// unknown); it only feeds the remaining-time estimate.
    pub fn new(total_count: usize) -> Self {
        Self {
            state: DecoderState::Preamble,
            total_count,
            completed_count: 0,
            start_time: None,
            result_count: BTreeMap::new(),
            finished: false,
        }
    }

    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    /// Path of the test whose record is currently open.
    pub fn current_test(&self) -> Option<&str> {
        match &self.state {
            DecoderState::Accumulating { start, .. } => Some(&start.path),
            _ => None,
        }
    }

    /// Whether the end-of-results marker has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn result_count(&self, status: TestStatus) -> usize {
        self.result_count.get(&status).copied().unwrap_or(0)
    }

    pub fn result_counts(&self) -> &BTreeMap<TestStatus, usize> {
        &self.result_count
    }

    /// Number of tests that ended in a failing status.
    pub fn any_failed(&self) -> usize {
        TestStatus::FAILING
            .iter()
            .map(|status| self.result_count(*status))
            .sum()
    }

    /// Feed every line in order, stopping at the first one that ends the
    /// run.
    pub fn feed_lines<I, S>(&mut self, lines: I, project: &mut Project, events: &mut Vec<RunEvent>) -> Flow
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            let flow = self.feed_line(line.as_ref(), project, events);
            if flow != Flow::Continue {
                return flow;
            }
        }
        Flow::Continue
    }

    /// Consume one stdout line.
    pub fn feed_line(&mut self, line: &str, project: &mut Project, events: &mut Vec<RunEvent>) -> Flow {
        match Marker::from_line(line) {
            Some(marker) => self.on_marker(marker, project, events),
            None => self.on_content(line, project, events),
        }
    }

    fn on_marker(&mut self, marker: Marker, project: &mut Project, events: &mut Vec<RunEvent>) -> Flow {
        let previous = std::mem::replace(&mut self.state, DecoderState::BetweenFrames);
        match previous {
            DecoderState::Preamble => {
                debug!(?marker, "preamble finished; results section started");
            }
            DecoderState::BetweenFrames => {
                // Nothing buffered since the last marker.
            }
            DecoderState::Accumulating { start, results } => {
                self.complete_record(start, results, project, events);
            }
        }

        if marker == Marker::EndOfResults {
            info!(
                completed = self.completed_count,
                failed = self.any_failed(),
                "end of test results"
            );
            self.finished = true;
            self.state = DecoderState::Preamble;
            return Flow::Finished;
        }
        Flow::Continue
    }

    fn on_content(&mut self, line: &str, project: &mut Project, events: &mut Vec<RunEvent>) -> Flow {
        match &mut self.state {
            DecoderState::Preamble => {
                events.push(RunEvent::TestStatusUpdate {
                    update: line.to_string(),
                });
                return Flow::Continue;
            }
            DecoderState::Accumulating { results, .. } => {
                results.push(strip_escape_prefix(line).to_string());
                return Flow::Continue;
            }
            DecoderState::BetweenFrames => {}
        }
        self.open_record(strip_escape_prefix(line), project, events)
    }

    /// First line after a marker: resolve the test and open its record.
    fn open_record(&mut self, line: &str, project: &mut Project, events: &mut Vec<RunEvent>) -> Flow {
        let start: StartFrame = match serde_json::from_str(line) {
            Ok(start) => start,
            Err(e) => {
                warn!(line = %line, error = %e, "malformed start frame");
                return Flow::Aborted(format!("Malformed result frame: {line}"));
            }
        };
        if let Err(e) = project.confirm_exists(&start.path, None) {
            warn!(path = %start.path, error = %e, "start frame names an unusable test path");
            return Flow::Aborted(format!("Malformed result frame: {line}"));
        }

        debug!(test = %start.path, "test started");
        events.push(RunEvent::TestStart {
            test_path: start.path.clone(),
        });
        self.state = DecoderState::Accumulating {
            start,
            results: Vec::new(),
        };
        Flow::Continue
    }

    fn complete_record(
        &mut self,
        start: StartFrame,
        results: Vec<String>,
        project: &mut Project,
        events: &mut Vec<RunEvent>,
    ) {
        let finishes: Vec<Result<FinishFrame, String>> = results
            .iter()
            .map(|raw| {
                serde_json::from_str::<FinishFrame>(raw).map_err(|e| {
                    warn!(test = %start.path, line = %raw, error = %e, "malformed result frame");
                    format!("Malformed result frame: {raw}")
                })
            })
            .collect();

        let (status, error) = if finishes.is_empty() {
            warn!(test = %start.path, "record closed without any result line");
            (TestStatus::Error, Some(NO_RESULT_MESSAGE.to_string()))
        } else {
            aggregate(finishes.iter().map(|finish| match finish {
                Ok(frame) => frame.status_and_error(),
                Err(msg) => (TestStatus::Error, Some(msg.clone())),
            }))
        };

        // Timing, description and output come from the last well-formed line.
        let last = finishes.iter().rev().find_map(|f| f.as_ref().ok());
        let end_time = last.map_or(start.start_time, |f| f.end_time);
        let description = last.map(|f| f.description.clone());
        let output = last.map(|f| f.output.clone()).unwrap_or_default();

        self.completed_count += 1;
        *self.result_count.entry(status).or_insert(0) += 1;

        let first_start = *self.start_time.get_or_insert(start.start_time);
        let remaining = estimate_remaining(
            first_start,
            end_time,
            self.completed_count,
            self.total_count,
        );
        let remaining_time = format_remaining(remaining);

        let result = TestResult {
            status,
            output,
            error,
            duration: end_time - start.start_time,
        };
        if let Err(e) = project.record_result(&start.path, description, result) {
            warn!(test = %start.path, error = %e, "could not record result");
        }

        debug!(
            test = %start.path,
            %status,
            completed = self.completed_count,
            total = self.total_count,
            remaining = %remaining_time,
            "test finished"
        );
        events.push(RunEvent::TestEnd {
            test_path: start.path,
            result: status,
            remaining_time,
        });
    }
}
