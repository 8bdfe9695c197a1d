// src/model/mod.rs

//! In-memory test hierarchy: Project -> Module* -> Case -> Method.
//!
//! - [`status`] defines the severity-ordered status codes and result record.
//! - [`node`] defines the tree nodes and the node-level events.
//! - [`project`] owns the tree and implements lazy creation, refresh sweeps,
//!   active/inactive cascading and result recording.

pub mod node;
pub mod project;
pub mod status;

pub use node::{NodeEvent, NodeEventKind, NodeKind, TestContainer, TestMethod, TestNode};
pub use project::Project;
pub use status::{TestResult, TestStatus};
