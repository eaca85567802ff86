//! Run command implementation

use crate::cli::{Cli, RunArgs};
use crate::config::ProcessEnv;
use crate::error::Result;
use crate::workflow::{Outcome, Workflow, WorkflowOptions};

pub fn run_job(args: &RunArgs, cli: &Cli) -> Result<i32> {
    let options = WorkflowOptions {
        spawned_worker: args.spawned_worker,
        available_accelerators: args.available_gpus,
        launcher: Some(args.launcher.clone()),
        worker_exe: None,
        worker_args: args.worker_args(cli),
        trainer: args.trainer.clone(),
    };

    let outcome = Workflow::new(&ProcessEnv, options).run()?;
    match &outcome {
        Outcome::HandedOff { params_path, trainer_ran: false } => {
            tracing::info!("No trainer configured; parameters ready at {}", params_path.display());
        }
        Outcome::HandedOff { .. } => {}
        Outcome::Launched { workers, exit_code } => {
            tracing::debug!("{workers} workers finished with exit code {exit_code}");
        }
    }

    Ok(outcome.exit_code())
}
