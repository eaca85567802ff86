//! End-to-end job workflow
//!
//! ```text
//! START → resolve → dataset check → prepare output → plan
//!       → build parameters → hand-off → DONE
//! ```
//!
//! Any stage error moves the job to FAILED and is returned to the caller,
//! which reports it once. Building parameters cannot fail. A spawn plan hands
//! the whole run to the launcher and finishes with the launcher's exit code.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{EnvSource, RunConfig};
use crate::dataset::{ensure_dataset_ready, DatasetReport};
use crate::error::{FinetuneError, Result};
use crate::launch::{
    available_accelerators, plan_execution, ExecutionPlan, WorkerLauncher, VISIBLE_DEVICES_ENV,
};
use crate::params::{
    build_training_parameters, TrainingParameters, PRETRAINED_ACTION_HORIZON,
};

/// File the parameter set is written to inside the output directory.
pub const TRAINING_ARGS_FILE: &str = "training_args.json";

/// Workflow stage, used to attribute failures in the job log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    DatasetCheck,
    PrepareOutput,
    Plan,
    HandOff,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolve => "resolve",
            Self::DatasetCheck => "dataset check",
            Self::PrepareOutput => "prepare output",
            Self::Plan => "plan",
            Self::HandOff => "hand-off",
        };
        f.write_str(name)
    }
}

/// Note which stage failed; the error itself is reported by the caller.
fn at_stage<T>(stage: Stage, result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        tracing::debug!("Stage '{stage}' failed");
        e
    })
}

/// Entry-point settings that do not come from the job environment.
#[derive(Debug, Clone, Default)]
pub struct WorkflowOptions {
    /// This process was started by the launcher
    pub spawned_worker: bool,
    /// Override for accelerator detection
    pub available_accelerators: Option<usize>,
    /// Launcher program used for spawn plans
    pub launcher: Option<String>,
    /// Executable each spawned worker runs; defaults to the current executable
    pub worker_exe: Option<PathBuf>,
    /// Arguments each spawned worker receives
    pub worker_args: Vec<OsString>,
    /// External trainer command line, split on whitespace
    pub trainer: Option<String>,
}

/// Result of a workflow that reached its terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Parameters were handed to the trainer in this process
    HandedOff { params_path: PathBuf, trainer_ran: bool },
    /// Run was delegated to the launcher, which exited with this code
    Launched { workers: usize, exit_code: i32 },
}

impl Outcome {
    /// Process exit code for this outcome.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::HandedOff { .. } => 0,
            Self::Launched { exit_code, .. } => *exit_code,
        }
    }
}

/// Everything known after the pre-flight stages.
#[derive(Debug, Clone)]
pub struct Preflight {
    pub config: RunConfig,
    pub dataset: DatasetReport,
    pub plan: ExecutionPlan,
}

/// The fine-tuning job, bound to an environment source.
pub struct Workflow<'a, E: EnvSource> {
    env: &'a E,
    options: WorkflowOptions,
}

impl<'a, E: EnvSource> Workflow<'a, E> {
    pub fn new(env: &'a E, options: WorkflowOptions) -> Self {
        Self { env, options }
    }

    /// Resolve, gate on the dataset, prepare the output dir and plan.
    pub fn preflight(&self) -> Result<Preflight> {
        tracing::info!("GR00T fine-tuning job starting");

        let config = at_stage(Stage::Resolve, RunConfig::resolve(self.env))?;
        let dataset = at_stage(Stage::DatasetCheck, ensure_dataset_ready(&config))?;
        at_stage(Stage::PrepareOutput, prepare_output(&config.output_dir))?;

        let available =
            self.options.available_accelerators.unwrap_or_else(available_accelerators);
        let spawned = self.options.spawned_worker;
        let plan = at_stage(Stage::Plan, plan_execution(&config, available, spawned))?;

        Ok(Preflight { config, dataset, plan })
    }

    /// Run the job to its terminal state.
    pub fn run(&self) -> Result<Outcome> {
        let Preflight { config, plan, .. } = self.preflight()?;

        if let ExecutionPlan::Spawn(workers) = plan {
            let exit_code = at_stage(Stage::HandOff, self.launch_workers(workers))?;
            tracing::info!("Launcher exited with code {exit_code}");
            return Ok(Outcome::Launched { workers, exit_code });
        }

        let params = self.parameters(&config);

        let handoff = TrainerHandOff::new(self.options.trainer.clone());
        at_stage(Stage::HandOff, handoff.hand_off(&params, config.num_gpus == 1))
    }

    fn parameters(&self, config: &RunConfig) -> TrainingParameters {
        let params = build_training_parameters(config, config.data_config.action_horizon());

        let head = &params.model.action_head;
        if head.recreated {
            tracing::info!(
                "Recreating action head with action_horizon {} (was {PRETRAINED_ACTION_HORIZON})",
                head.action_horizon
            );
        }
        let args = &params.training_args;
        tracing::info!(
            "Schedule: {} steps, {} warmup, {} checkpoints",
            args.max_steps,
            args.warmup_steps(),
            args.checkpoint_count()
        );
        params
    }

    fn launch_workers(&self, workers: usize) -> Result<i32> {
        let worker_exe = match &self.options.worker_exe {
            Some(exe) => exe.clone(),
            None => std::env::current_exe()
                .map_err(|e| FinetuneError::io("locating current executable", e))?,
        };
        let program = self
            .options
            .launcher
            .clone()
            .unwrap_or_else(|| crate::launch::DEFAULT_LAUNCHER.to_string());

        WorkerLauncher::new(program, worker_exe)
            .with_worker_args(self.options.worker_args.iter().cloned())
            .launch(workers)
    }
}

fn prepare_output(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| FinetuneError::io(format!("creating output directory {}", dir.display()), e))
}

/// Hands a parameter set to the external trainer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainerHandOff {
    /// Trainer command line; `None` stops after writing the parameter file
    pub command: Option<String>,
}

impl TrainerHandOff {
    pub fn new(command: Option<String>) -> Self {
        Self { command: command.filter(|c| !c.trim().is_empty()) }
    }

    /// Write the parameter file and start the trainer if one is configured.
    ///
    /// `single_device` pins the trainer to device 0.
    pub fn hand_off(&self, params: &TrainingParameters, single_device: bool) -> Result<Outcome> {
        let params_path = write_training_args(params)?;
        tracing::info!("Training parameters written to {}", params_path.display());

        let Some(command) = &self.command else {
            return Ok(Outcome::HandedOff { params_path, trainer_ran: false });
        };

        let mut cmd = trainer_command(command, &params_path, single_device)?;
        let program = cmd.get_program().to_string_lossy().into_owned();
        tracing::info!("Starting trainer: {command}");

        let status = cmd.status().map_err(|e| FinetuneError::Launch {
            program: program.clone(),
            message: e.to_string(),
        })?;
        if !status.success() {
            return Err(FinetuneError::Trainer { program, code: status.code() });
        }

        tracing::info!("Training completed");
        Ok(Outcome::HandedOff { params_path, trainer_ran: true })
    }
}

/// Distinguishes temp files of concurrent writers within one process.
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Serialize `params` into `<output_dir>/training_args.json`.
///
/// Uses write-to-temp + rename, so a trainer started by a sibling worker
/// only ever reads a complete file.
pub fn write_training_args(params: &TrainingParameters) -> Result<PathBuf> {
    let path = params.training_args.output_dir.join(TRAINING_ARGS_FILE);
    let json = params.to_json_pretty()?;

    let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let temp_path = path.with_extension(format!("json.{}.{sequence}.tmp", std::process::id()));
    fs::write(&temp_path, json)
        .map_err(|e| FinetuneError::io(format!("writing {}", temp_path.display()), e))?;

    if let Err(e) = fs::rename(&temp_path, &path) {
        let _ = fs::remove_file(&temp_path);
        return Err(FinetuneError::io(format!("replacing {}", path.display()), e));
    }
    Ok(path)
}

fn trainer_command(command: &str, params_path: &Path, single_device: bool) -> Result<Command> {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(FinetuneError::Launch {
            program: String::new(),
            message: "empty trainer command".to_string(),
        });
    };

    let mut cmd = Command::new(program);
    cmd.args(parts).arg("--training-args").arg(params_path);
    if single_device {
        cmd.env(VISIBLE_DEVICES_ENV, "0");
    }
    Ok(cmd)
}
