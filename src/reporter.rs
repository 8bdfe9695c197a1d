// src/reporter.rs

//! Plain-text progress output for the command-line front end.

use crate::decoder::{RunEvent, RunEventKind};
use crate::events::EventRegistry;
use crate::model::TestStatus;
use crate::runner::RunSummary;

/// Bind console printers for every run event.
pub fn attach(events: &mut EventRegistry<RunEvent>) {
    events.bind(RunEventKind::TestStatusUpdate, |event| {
        if let RunEvent::TestStatusUpdate { update } = event {
            println!("{update}");
        }
    });
    events.bind(RunEventKind::TestEnd, |event| {
        if let RunEvent::TestEnd {
            test_path,
            result,
            remaining_time,
        } = event
        {
            println!("{:<18} {test_path} ({remaining_time} remaining)", result.to_string());
        }
    });
    events.bind(RunEventKind::SuiteEnd, |event| {
        if let RunEvent::SuiteEnd { error: Some(error) } = event {
            eprintln!("{error}");
        }
    });
    events.bind(RunEventKind::SuiteError, |event| {
        if let RunEvent::SuiteError { error } = event {
            eprintln!("test run failed:\n{error}");
        }
    });
}

/// One-line summary such as `Ran 4 tests: 3 passed, 1 failures`.
pub fn summary_line(summary: &RunSummary) -> String {
    let parts: Vec<String> = TestStatus::ALL
        .iter()
        .filter_map(|status| {
            summary
                .counts
                .get(status)
                .filter(|n| **n > 0)
                .map(|n| format!("{n} {}", status.label()))
        })
        .collect();

    let noun = if summary.completed == 1 { "test" } else { "tests" };
    if parts.is_empty() {
        format!("Ran {} {noun}", summary.completed)
    } else {
        format!("Ran {} {noun}: {}", summary.completed, parts.join(", "))
    }
}
