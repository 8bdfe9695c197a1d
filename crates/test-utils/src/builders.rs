#![allow(dead_code)]

use pipetest::config::ExecutorSection;
use pipetest::model::Project;
use pipetest::protocol::Marker;
use serde_json::json;

/// Project with a dummy executor, for driving the model and decoder.
pub fn project() -> Project {
    Project::new(ExecutorSection::new("executor"))
}

/// Builder for canned executor stdout, one entry per line.
///
/// Markers are placed the way the encoder places them: start-of-results
/// before the first record, a separator before every later one.
#[derive(Debug, Default)]
pub struct FrameScript {
    lines: Vec<String>,
    started: bool,
}

impl FrameScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-form text before the results section.
    pub fn banner(mut self, text: &str) -> Self {
        self.lines.push(text.to_string());
        self
    }

    /// Open a record for `path`.
    pub fn start(mut self, path: &str, start_time: f64) -> Self {
        let marker = if self.started {
            Marker::Separator
        } else {
            self.started = true;
            Marker::StartOfResults
        };
        self.lines.push(marker.as_str().to_string());
        self.lines
            .push(json!({ "path": path, "start_time": start_time }).to_string());
        self
    }

    /// One result line with an empty description and output.
    pub fn finish(self, status: &str, end_time: f64, error: Option<&str>) -> Self {
        self.finish_with(status, end_time, "d", "", error)
    }

    pub fn finish_with(
        mut self,
        status: &str,
        end_time: f64,
        description: &str,
        output: &str,
        error: Option<&str>,
    ) -> Self {
        let mut frame = json!({
            "status": status,
            "end_time": end_time,
            "description": description,
            "output": output,
        });
        if let Some(error) = error {
            frame["error"] = json!(error);
        }
        self.lines.push(frame.to_string());
        self
    }

    /// A raw line, written as-is.
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.lines.push(marker.as_str().to_string());
        self
    }

    pub fn end(self) -> Self {
        self.marker(Marker::EndOfResults)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn build(self) -> Vec<String> {
        self.lines
    }

    /// The script as stdout bytes, newline-terminated.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for line in &self.lines {
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
        }
        out
    }
}
