//! External scraping worker: one process per request, scoped to a region key.
//!
//! The process prints a JSON array of places on stdout and free-text diagnostics on stderr.
//! Callers race [`ScraperWorker::run`] against a deadline; the spawned child is killed when that
//! future is dropped.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use wayfare_core::config::WorkerConfig;
use wayfare_core::recommendation::LiveBatchError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// Reasons a live fetch is abandoned in favour of stored data.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkerFailure {
    #[error("failed to spawn worker: {0}")]
    Spawn(String),
    #[error("worker exited with status {code:?}")]
    NonZeroExit { code: Option<i32>, stderr: String },
    #[error("worker output could not be parsed: {0}")]
    Parse(LiveBatchError),
    #[error("worker did not finish within {0:?}")]
    Timeout(Duration),
    #[error("worker output rejected: {0}")]
    Rejected(LiveBatchError),
}

impl WorkerFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Spawn(_) => "spawn",
            Self::NonZeroExit { .. } => "non_zero_exit",
            Self::Parse(_) => "parse",
            Self::Timeout(_) => "timeout",
            Self::Rejected(_) => "rejected",
        }
    }
}

impl From<LiveBatchError> for WorkerFailure {
    fn from(value: LiveBatchError) -> Self {
        match value {
            LiveBatchError::Empty | LiveBatchError::MissingImage => Self::Rejected(value),
            LiveBatchError::Malformed(_)
            | LiveBatchError::NotAnArray
            | LiveBatchError::NonObjectItem(_) => Self::Parse(value),
        }
    }
}

#[async_trait]
pub trait ScraperWorker: Send + Sync {
    /// Runs the worker for `key` to completion and collects both output streams.
    async fn run(&self, key: &str) -> Result<WorkerOutput, WorkerFailure>;
}

#[derive(Clone, Debug)]
pub struct ProcessWorker {
    program: String,
    args: Vec<String>,
}

impl ProcessWorker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

#[async_trait]
impl ScraperWorker for ProcessWorker {
    async fn run(&self, key: &str) -> Result<WorkerOutput, WorkerFailure> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(key)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|error| WorkerFailure::Spawn(format!("{}: {error}", self.program)))?;

        Ok(WorkerOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}
