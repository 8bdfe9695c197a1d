// src/encoder/mod.rs

//! Producer side of the result protocol, used inside the test-executing
//! process.
//!
//! - [`result`] turns lifecycle callbacks into frames ([`PipedResult`]).
//! - [`suite`] runs [`TestCase`]s and drives the callbacks ([`PipedRunner`]).
//! - [`context`] collects a running test's output and sub-results.
//! - [`capture`] redirects stdout while a test body runs.
//! - [`docstring`] derives descriptions from documentation text.

pub mod capture;
pub mod context;
pub mod docstring;
pub mod result;
pub mod suite;

pub use context::{SubFailure, SubResult, TestContext};
pub use docstring::{describe, trim_docstring, NO_DESCRIPTION};
pub use result::{unix_now, PathStyle, PipedResult, TestInfo};
pub use suite::{matches_label, select_tests, Outcome, PipedRunner, Suite, TestCase};
