// src/lib.rs

pub mod cli;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod events;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod reporter;
pub mod runner;
pub mod types;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::ConfigFile;
use crate::model::Project;
use crate::runner::Runner;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (with CLI overrides)
/// - the test project model
/// - the executor process supervisor
/// - console progress output
/// - Ctrl-C handling
///
/// Returns whether the run completed without failing tests.
pub async fn run(args: CliArgs) -> Result<bool> {
    let mut cfg = load_and_validate(&args.config)?;
    apply_overrides(&mut cfg, &args);

    let mut project = Project::new(cfg.executor.clone());
    let testdir = PathBuf::from(&cfg.runner.testdir);

    if args.dry_run {
        print_dry_run(&project, &args.labels, &testdir);
        return Ok(true);
    }

    let mut runner = Runner::spawn(
        &project,
        cfg.runner.expected_count,
        &args.labels,
        &testdir,
    )?;
    reporter::attach(runner.events_mut());

    let interval = Duration::from_millis(cfg.runner.poll_interval_ms);
    info!(?interval, labels = ?args.labels, "following executor output");

    let summary = tokio::select! {
        summary = runner.run_to_completion(&mut project, interval) => Some(summary),
        _ = interrupted() => None,
    };

    let Some(summary) = summary else {
        warn!("interrupted; stopping executor");
        runner.terminate();
        return Ok(false);
    };

    println!("{}", reporter::summary_line(&summary));
    debug!(?summary, "run summary");
    Ok(summary.is_success())
}

fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) {
    if let Some(ref testdir) = args.testdir {
        cfg.runner.testdir = testdir.clone();
    }
    if let Some(ms) = args.poll_interval_ms {
        cfg.runner.poll_interval_ms = ms.max(1);
    }
    if let Some(count) = args.expected_count {
        cfg.runner.expected_count = count;
    }
}

/// Resolves on Ctrl-C. Never resolves if the signal cannot be listened to.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Dry-run output: the command line that would be executed.
fn print_dry_run(project: &Project, labels: &[String], testdir: &Path) {
    println!("pipetest dry-run");
    println!("  executor: {}", project.executor().program);
    println!("  testdir: {}", testdir.display());
    if labels.is_empty() {
        println!("  labels: (all tests)");
    } else {
        println!("  labels: {labels:?}");
    }
    println!("  command: {}", project.execute_commandline(labels, testdir).join(" "));

    debug!("dry-run complete (no execution)");
}
