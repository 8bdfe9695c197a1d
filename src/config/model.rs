// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [executor]
/// program = "python"
/// args = ["-m", "pipetest_exec"]
///
/// [runner]
/// poll_interval_ms = 100
/// testdir = "tests"
/// ```
///
/// Only `executor.program` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    pub executor: ExecutorSection,

    #[serde(default)]
    pub runner: RunnerSection,
}

/// Validated configuration. Construct via `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub executor: ExecutorSection,
    pub runner: RunnerSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(executor: ExecutorSection, runner: RunnerSection) -> Self {
        Self { executor, runner }
    }
}

/// `[executor]` section: how to launch the test-executing process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutorSection {
    /// Program to run.
    pub program: String,

    /// Arguments placed before the test directory flag and labels.
    #[serde(default)]
    pub args: Vec<String>,

    /// Flag that introduces the test directory.
    #[serde(default = "default_testdir_flag")]
    pub testdir_flag: String,
}

impl ExecutorSection {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            testdir_flag: default_testdir_flag(),
        }
    }
}

fn default_testdir_flag() -> String {
    "--testdir".to_string()
}

/// `[runner]` section: supervisor behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerSection {
    /// Interval between two poll steps.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Directory handed to the executor.
    #[serde(default = "default_testdir")]
    pub testdir: String,

    /// Number of tests the run is expected to report; 0 when unknown.
    #[serde(default)]
    pub expected_count: usize,
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_testdir() -> String {
    ".".to_string()
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            testdir: default_testdir(),
            expected_count: 0,
        }
    }
}
