// src/runner/mod.rs

//! Process supervision for the controlling side.
//!
//! - [`supervisor`] owns the executor child process and exposes the
//!   non-blocking [`Runner::poll`] step.
//! - [`reader`] holds the background tasks that turn the child's pipes into
//!   line queues. They are the only part of the controller that blocks.

pub mod reader;
pub mod supervisor;

pub use crate::decoder::{RunEvent, RunEventKind};
pub use supervisor::{RunOutcome, RunSummary, Runner, UNEXPECTED_END_MESSAGE};
