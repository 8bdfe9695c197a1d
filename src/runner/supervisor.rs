// src/runner/supervisor.rs

//! Owner of the executor process and its output queues.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::decoder::{Flow, FrameDecoder, RunEvent};
use crate::events::EventRegistry;
use crate::model::{Project, TestStatus};
use crate::runner::reader::spawn_line_reader;

/// Error text for a run whose executor vanished without explanation.
pub const UNEXPECTED_END_MESSAGE: &str = "Test output ended unexpectedly";

/// How a supervised run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The end-of-results marker was seen.
    Completed,
    /// The output broke the protocol and the executor was stopped.
    Aborted,
    /// The executor exited before finishing the run.
    Crashed,
}

/// Statistics of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub completed: usize,
    pub failed: usize,
    pub counts: BTreeMap<TestStatus, usize>,
}

impl RunSummary {
    /// True if the run completed and no test ended in a failing status.
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Completed && self.failed == 0
    }
}

/// Supervises one executor process.
///
/// Two reader tasks drain the child's stdout and stderr into queues;
/// [`poll`](Runner::poll) takes whatever is queued without blocking, feeds
/// it to the [`FrameDecoder`] and publishes the resulting [`RunEvent`]s.
pub struct Runner {
    child: Child,
    pid: Option<u32>,
    stdout: mpsc::UnboundedReceiver<String>,
    stderr: mpsc::UnboundedReceiver<String>,
    stdout_closed: bool,
    stderr_closed: bool,
    exited: bool,
    decoder: FrameDecoder,
    error_buffer: Vec<String>,
    events: EventRegistry<RunEvent>,
    outcome: Option<RunOutcome>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("pid", &self.pid)
            .field("decoder", &self.decoder)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Launch the executor for `project` and start reading its output.
    ///
    /// `count` is the number of tests expected (0 if unknown). Must be called
    /// from within a Tokio runtime.
    pub fn spawn(project: &Project, count: usize, labels: &[String], testdir: &Path) -> Result<Self> {
        let argv = project.execute_commandline(labels, testdir);
        let (program, args) = argv
            .split_first()
            .context("executor command line is empty")?;

        info!(program = %program, ?args, "starting executor process");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning executor process '{program}'"))?;

        Self::from_child(child, count)
    }

    /// Supervise an already spawned child whose stdout and stderr are piped.
    pub fn from_child(mut child: Child, count: usize) -> Result<Self> {
        let stdout = child
            .stdout
            .take()
            .context("executor stdout is not piped")?;
        let stderr = child
            .stderr
            .take()
            .context("executor stderr is not piped")?;

        let pid = child.id();
        debug!(?pid, "executor process running");

        Ok(Self {
            child,
            pid,
            stdout: spawn_line_reader(stdout, "stdout"),
            stderr: spawn_line_reader(stderr, "stderr"),
            stdout_closed: false,
            stderr_closed: false,
            exited: false,
            decoder: FrameDecoder::new(count),
            error_buffer: Vec::new(),
            events: EventRegistry::new(),
            outcome: None,
        })
    }

    pub fn events_mut(&mut self) -> &mut EventRegistry<RunEvent> {
        &mut self.events
    }

    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    /// How the run ended, once it has.
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    /// Whether the executor process has not exited yet.
    pub fn is_running(&mut self) -> bool {
        !self.check_exited()
    }

    /// Number of tests so far that ended in a failing status.
    pub fn any_failed(&self) -> usize {
        self.decoder.any_failed()
    }

    /// Forcibly stop the executor.
    ///
    /// The reader tasks finish on their own once the pipes close.
    pub fn terminate(&mut self) {
        if self.check_exited() {
            debug!(pid = ?self.pid, "terminate requested but executor already exited");
            return;
        }
        info!(pid = ?self.pid, "terminating executor process");
        if let Err(e) = self.child.start_kill() {
            warn!(pid = ?self.pid, error = %e, "failed to kill executor process");
        }
    }

    /// One non-blocking supervision step.
    ///
    /// Returns `true` while the caller should keep polling.
    pub fn poll(&mut self, project: &mut Project) -> bool {
        if self.outcome.is_some() {
            return false;
        }

        let lines = self.drain_stdout();
        self.drain_stderr();

        let exited_before = self.exited;
        let exited = self.check_exited();

        let mut events = Vec::new();
        let flow = self.decoder.feed_lines(&lines, project, &mut events);
        for event in &events {
            self.events.emit(event);
        }

        match flow {
            Flow::Finished => {
                let error = self.stderr_text();
                self.finish(RunOutcome::Completed, RunEvent::SuiteEnd { error });
                false
            }
            Flow::Aborted(reason) => {
                warn!(pid = ?self.pid, %reason, "protocol violation; abandoning run");
                self.terminate();
                self.finish(RunOutcome::Aborted, RunEvent::SuiteEnd { error: Some(reason) });
                false
            }
            Flow::Continue => {
                // Declare the executor gone only once both pipes are fully
                // consumed, or it was already seen exiting on an earlier
                // step and nothing more arrived.
                let drained = (self.stdout_closed && self.stderr_closed)
                    || (exited_before && lines.is_empty());
                if exited && drained {
                    let error = self
                        .stderr_text()
                        .unwrap_or_else(|| UNEXPECTED_END_MESSAGE.to_string());
                    warn!(pid = ?self.pid, "executor stopped before the end of the results");
                    self.finish(RunOutcome::Crashed, RunEvent::SuiteError { error });
                    false
                } else {
                    true
                }
            }
        }
    }

    /// Poll on a fixed interval until the run is over.
    pub async fn run_to_completion(&mut self, project: &mut Project, interval: Duration) -> RunSummary {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if !self.poll(project) {
                break;
            }
        }
        self.summary()
    }

    /// Current statistics. The outcome is `Crashed` while the run is still
    /// in progress.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            outcome: self.outcome.unwrap_or(RunOutcome::Crashed),
            completed: self.decoder.completed_count(),
            failed: self.decoder.any_failed(),
            counts: self.decoder.result_counts().clone(),
        }
    }

    fn finish(&mut self, outcome: RunOutcome, event: RunEvent) {
        info!(
            pid = ?self.pid,
            ?outcome,
            completed = self.decoder.completed_count(),
            failed = self.decoder.any_failed(),
            "run finished"
        );
        self.outcome = Some(outcome);
        self.events.emit(&event);
    }

    fn drain_stdout(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            match self.stdout.try_recv() {
                Ok(line) => lines.push(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.stdout_closed = true;
                    break;
                }
            }
        }
        lines
    }

    fn drain_stderr(&mut self) {
        loop {
            match self.stderr.try_recv() {
                Ok(line) => self.error_buffer.push(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.stderr_closed = true;
                    break;
                }
            }
        }
    }

    fn stderr_text(&self) -> Option<String> {
        if self.error_buffer.is_empty() {
            None
        } else {
            Some(self.error_buffer.join("\n"))
        }
    }

    fn check_exited(&mut self) -> bool {
        if self.exited {
            return true;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = ?self.pid, code = ?status.code(), "executor process exited");
                self.exited = true;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(pid = ?self.pid, error = %e, "could not query executor status");
                self.exited = true;
            }
        }
        self.exited
    }
}
