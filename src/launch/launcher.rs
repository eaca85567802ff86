//! Multi-worker launcher invocation.
//!
//! Starts `num_gpus` local workers through a torchrun-compatible launcher,
//! each re-running this binary flagged as a spawned worker.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use super::accelerator::VISIBLE_DEVICES_ENV;
use crate::error::{FinetuneError, Result};

/// Environment marker exported to every spawned worker.
pub const WORKER_MARKER_ENV: &str = "IS_TORCHRUN";

/// CLI flag that marks a process as a spawned worker.
pub const WORKER_FLAG: &str = "--spawned-worker";

pub const DEFAULT_LAUNCHER: &str = "torchrun";

/// Builds and runs the launcher command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerLauncher {
    /// Launcher executable (`torchrun` by default)
    pub program: String,
    /// Executable each worker runs
    pub worker_exe: PathBuf,
    /// Arguments passed to every worker after the executable
    pub worker_args: Vec<OsString>,
}

impl WorkerLauncher {
    pub fn new(program: impl Into<String>, worker_exe: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), worker_exe: worker_exe.into(), worker_args: Vec::new() }
    }

    /// Append arguments forwarded to each worker.
    #[must_use]
    pub fn with_worker_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.worker_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Launcher arguments for a standalone single-node run.
    pub fn args(&self, workers: usize) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--standalone".into(),
            format!("--nproc_per_node={workers}").into(),
            "--nnodes=1".into(),
            "--no-python".into(),
            self.worker_exe.clone().into_os_string(),
        ];
        args.extend(self.worker_args.iter().cloned());
        args
    }

    /// Fully configured command; device visibility is left to the launcher.
    pub fn command(&self, workers: usize) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(workers))
            .env(WORKER_MARKER_ENV, "1")
            .env_remove(VISIBLE_DEVICES_ENV);
        cmd
    }

    /// Run the launcher to completion and return its exit code.
    ///
    /// A launcher killed by a signal reports code 1.
    pub fn launch(&self, workers: usize) -> Result<i32> {
        tracing::info!(
            "Running {} with args: {:?}",
            self.program,
            self.args(workers)
        );

        let status = self.command(workers).status().map_err(|e| FinetuneError::Launch {
            program: self.program.clone(),
            message: e.to_string(),
        })?;

        Ok(status.code().unwrap_or(1))
    }
}
