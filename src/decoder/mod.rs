// src/decoder/mod.rs

//! Consumer side of the result protocol.
//!
//! - [`state`] holds the incremental [`FrameDecoder`] state machine.
//! - [`aggregate`] folds sub-results into one status.
//! - [`eta`] estimates and formats the remaining time of a run.
//!
//! Nothing here performs IO; the process supervisor in `runner` feeds the
//! decoder with lines taken from its reader queues.

pub mod aggregate;
pub mod eta;
pub mod state;

pub use aggregate::aggregate;
pub use eta::{estimate_remaining, format_remaining};
pub use state::{DecoderState, FrameDecoder, NO_RESULT_MESSAGE};

use crate::events::Event;
use crate::model::TestStatus;

/// What the caller should do after feeding lines to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Keep feeding lines.
    Continue,
    /// The end-of-results marker was seen.
    Finished,
    /// The stream broke the protocol; the run cannot be followed further.
    Aborted(String),
}

/// Progress events published while a run is supervised.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// A start frame was read for `test_path`.
    TestStart { test_path: String },
    /// The record for `test_path` is complete.
    TestEnd {
        test_path: String,
        result: TestStatus,
        remaining_time: String,
    },
    /// Free-form executor output seen before the results section.
    TestStatusUpdate { update: String },
    /// The run is over. `error` carries stderr text or a protocol error.
    SuiteEnd { error: Option<String> },
    /// The executor stopped without finishing the run.
    SuiteError { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunEventKind {
    TestStart,
    TestEnd,
    TestStatusUpdate,
    SuiteEnd,
    SuiteError,
}

impl Event for RunEvent {
    type Kind = RunEventKind;

    fn kind(&self) -> RunEventKind {
        match self {
            RunEvent::TestStart { .. } => RunEventKind::TestStart,
            RunEvent::TestEnd { .. } => RunEventKind::TestEnd,
            RunEvent::TestStatusUpdate { .. } => RunEventKind::TestStatusUpdate,
            RunEvent::SuiteEnd { .. } => RunEventKind::SuiteEnd,
            RunEvent::SuiteError { .. } => RunEventKind::SuiteError,
        }
    }
}
