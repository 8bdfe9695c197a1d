// src/protocol/mod.rs

//! Wire format of the result stream.
//!
//! The executor writes free-form text until it emits the start-of-results
//! marker. From then on the stream is a sequence of records separated by
//! marker lines:
//!
//! ```text
//! \x02
//! {"path": "pkg.Case.test_a", "start_time": 1.0}
//! {"status": "OK", "end_time": 1.5, "description": "...", "output": ""}
//! \x1f
//! {"path": "pkg.Case.test_b", "start_time": 1.5}
//! {"status": "F", "end_time": 1.7, "description": "...", "output": "", "error": "..."}
//! \x03
//! ```
//!
//! A record is one [`StartFrame`] line followed by one or more
//! [`FinishFrame`] lines (several when the test reports sub-results).

pub mod frame;
pub mod marker;

pub use frame::{FinishFrame, StartFrame, WireStatus};
pub use marker::{clean_line, strip_escape_prefix, Marker};
