// src/decoder/aggregate.rs

//! Folding several sub-results of one test into a single result.

use crate::model::TestStatus;

/// Combine the sub-results reported for one test.
///
/// The most severe status wins (`Pass` when there are no sub-results), and
/// every non-empty error text is kept, separated by a blank line.
pub fn aggregate<I>(subresults: I) -> (TestStatus, Option<String>)
where
    I: IntoIterator<Item = (TestStatus, Option<String>)>,
{
    let mut status = TestStatus::Pass;
    let mut errors: Vec<String> = Vec::new();

    for (sub_status, sub_error) in subresults {
        status = status.max(sub_status);
        if let Some(err) = sub_error.filter(|e| !e.is_empty()) {
            errors.push(err);
        }
    }

    let error = if errors.is_empty() {
        None
    } else {
        Some(errors.join("\n\n"))
    };
    (status, error)
}
