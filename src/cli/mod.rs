//! CLI module for gr00t-finetune
//!
//! Argument definitions and command handlers. Handlers return the process
//! exit code; the binary only maps it.

mod args;
mod commands;


pub use args::{parse_args, Cli, Command, ParamsArgs, RunArgs, ValidateArgs};
pub use commands::run_command;
