//! Command-line arguments

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::launch::{DEFAULT_LAUNCHER, WORKER_FLAG, WORKER_MARKER_ENV};
use crate::logging::DEFAULT_LOG_FILE;

/// GR00T fine-tuning job configurator
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "gr00t-finetune")]
#[command(version)]
#[command(
    about = "Validate the environment of a GR00T fine-tuning job and hand it to the trainer"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Append log output to this file
    #[arg(long, global = true, env = "FINETUNE_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log to stdout only
    #[arg(long, global = true)]
    pub no_log_file: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the full fine-tuning workflow
    Run(RunArgs),

    /// Check the environment, dataset and GPU plan without training
    Validate(ValidateArgs),

    /// Print the trainer parameters as JSON
    Params(ParamsArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// This process was started by the multi-worker launcher
    #[arg(long, env = WORKER_MARKER_ENV, value_parser = FalseyValueParser::new())]
    pub spawned_worker: bool,

    /// Override detected GPU count
    #[arg(long, value_name = "N")]
    pub available_gpus: Option<usize>,

    /// Multi-worker launcher program
    #[arg(long, env = "FINETUNE_LAUNCHER", default_value = DEFAULT_LAUNCHER)]
    pub launcher: String,

    /// Trainer command that receives `--training-args <file>`
    #[arg(long, env = "TRAINER_COMMAND")]
    pub trainer: Option<String>,
}

impl RunArgs {
    /// Arguments a spawned worker needs to repeat this run.
    pub fn worker_args(&self, cli: &Cli) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["run".into(), WORKER_FLAG.into()];
        if let Some(n) = self.available_gpus {
            args.push("--available-gpus".into());
            args.push(n.to_string().into());
        }
        if let Some(trainer) = &self.trainer {
            args.push("--trainer".into());
            args.push(trainer.into());
        }
        if cli.verbose {
            args.push("--verbose".into());
        }
        if cli.quiet {
            args.push("--quiet".into());
        }
        if cli.no_log_file {
            args.push("--no-log-file".into());
        } else {
            args.push("--log-file".into());
            args.push(cli.log_file.clone().into_os_string());
        }
        args
    }
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Override detected GPU count
    #[arg(long, value_name = "N")]
    pub available_gpus: Option<usize>,

    /// Evaluate the plan as a spawned worker would
    #[arg(long, env = WORKER_MARKER_ENV, value_parser = FalseyValueParser::new())]
    pub spawned_worker: bool,

    /// Show detailed configuration summary
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the params command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ParamsArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Parse arguments from an iterator (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}
