// src/protocol/frame.rs

//! JSON payloads carried between markers.

use serde::{Deserialize, Serialize};

use crate::model::TestStatus;

/// First line of every record: which test is starting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartFrame {
    pub path: String,
    /// Seconds since the Unix epoch.
    pub start_time: f64,
}

/// Status codes as written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "F")]
    Fail,
    #[serde(rename = "E")]
    Error,
    #[serde(rename = "s")]
    Skip,
    #[serde(rename = "x")]
    ExpectedFail,
    #[serde(rename = "u")]
    UnexpectedSuccess,
}

impl From<WireStatus> for TestStatus {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Ok => TestStatus::Pass,
            WireStatus::Fail => TestStatus::Fail,
            WireStatus::Error => TestStatus::Error,
            WireStatus::Skip => TestStatus::Skip,
            WireStatus::ExpectedFail => TestStatus::ExpectedFail,
            WireStatus::UnexpectedSuccess => TestStatus::UnexpectedSuccess,
        }
    }
}

/// A (sub-)result line following a [`StartFrame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishFrame {
    pub status: WireStatus,
    pub end_time: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub output: String,
    /// Traceback for failures and errors, reason for skips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FinishFrame {
    /// Model status and error text for this line.
    ///
    /// Skip reasons are prefixed with `Skipped: `; passes and unexpected
    /// successes never carry error text.
    pub fn status_and_error(&self) -> (TestStatus, Option<String>) {
        let status = TestStatus::from(self.status);
        let error = match self.status {
            WireStatus::Ok | WireStatus::UnexpectedSuccess => None,
            WireStatus::Skip => Some(format!(
                "Skipped: {}",
                self.error.as_deref().unwrap_or_default()
            )),
            WireStatus::Fail | WireStatus::Error | WireStatus::ExpectedFail => self.error.clone(),
        };
        (status, error)
    }
}
