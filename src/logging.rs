//! Logging setup for the job process
//!
//! Events go to stdout and, when it can be opened, to an append-only log file
//! that survives the container. `RUST_LOG` overrides the CLI verbosity.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default process log location inside the training container.
pub const DEFAULT_LOG_FILE: &str = "/workspace/finetune_gr00t.log";

/// Log level for CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Errors only
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    /// Map the global `--quiet`/`--verbose` flags; quiet wins.
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

/// Print a user-facing message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}

/// Install the global subscriber.
///
/// Returns the log file actually in use. When `log_file` cannot be opened the
/// process logs to stdout only and a warning records why. Installing twice is
/// a no-op, which keeps tests that share a process quiet.
pub fn init_logging(level: LogLevel, log_file: Option<&Path>) -> Option<PathBuf> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let (file, open_error) = match log_file.map(|path| (path, open_log_file(path))) {
        Some((path, Ok(file))) => (Some((path.to_path_buf(), file)), None),
        Some((path, Err(e))) => (None, Some(format!("{}: {e}", path.display()))),
        None => (None, None),
    };
    let in_use = file.as_ref().map(|(path, _)| path.clone());
    let file_layer = file.map(|(_, file)| {
        fmt::layer().with_ansi(false).with_target(false).with_writer(Mutex::new(file))
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        if let Some(reason) = open_error {
            tracing::warn!("Log file unavailable, logging to stdout only ({reason})");
        }
    }

    in_use
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
