//! gr00t-finetune CLI
//!
//! Entry point of the fine-tuning container. Job parameters come from the
//! environment; the command line only selects what to do.
//!
//! # Usage
//!
//! ```bash
//! # Full workflow (spawns torchrun workers when NUM_GPUS > 1)
//! gr00t-finetune run --trainer "python -m gr00t_trainer"
//!
//! # Check environment, dataset and GPU plan
//! gr00t-finetune validate --detailed
//!
//! # Print trainer parameters
//! gr00t-finetune params
//! ```

use clap::Parser;
use gr00t_finetune::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Failures are already reported through the log by `run_command`.
    match run_command(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(_) => ExitCode::FAILURE,
    }
}
