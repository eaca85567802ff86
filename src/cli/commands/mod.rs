//! CLI command implementations

mod params;
mod run;
mod validate;

use crate::cli::{Cli, Command};
use crate::error::{FinetuneError, Result};
use crate::logging::{init_logging, LogLevel};

/// Execute a CLI command and return the process exit code
///
/// A failing command is reported here, once, to every log destination.
pub fn run_command(cli: Cli) -> Result<i32> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);
    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    if let Some(path) = init_logging(log_level, log_file) {
        tracing::debug!("Logging to {}", path.display());
    }

    let result = match &cli.command {
        Command::Run(args) => run::run_job(args, &cli),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Params(args) => params::run_params(args, log_level),
    };
    if let Err(e) = &result {
        report_failure(e);
    }
    result
}

fn report_failure(err: &FinetuneError) {
    tracing::error!("Fine-tuning failed [{}]: {err}", err.code());
}
