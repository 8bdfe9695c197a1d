// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::Parser;

use crate::config::default_config_path;
use crate::types::LogLevel;

/// Command-line arguments for `pipetest`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipetest",
    version,
    about = "Run a test executor in a child process and follow its results live.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Directory handed to the executor. Overrides `[runner].testdir`.
    #[arg(long, value_name = "DIR")]
    pub testdir: Option<String>,

    /// Interval between two poll steps. Overrides `[runner].poll_interval_ms`.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Number of tests the run will report, for the remaining-time estimate.
    #[arg(long, value_name = "N")]
    pub expected_count: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPETEST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the executor command line without running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Test labels to run (module, module.Case or full test id).
    /// Runs everything when omitted.
    #[arg(value_name = "LABEL", trailing_var_arg = true)]
    pub labels: Vec<String>,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
