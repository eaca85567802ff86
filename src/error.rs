//! Error types with actionable diagnostics (Andon principle).
//!
//! Every workflow failure maps to one variant. Messages name the problem and
//! end with a hint line so an operator reading the job log can act on it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fine-tuning workflow operations.
pub type Result<T> = std::result::Result<T, FinetuneError>;

/// Errors that can terminate the fine-tuning workflow.
#[derive(Error, Debug)]
pub enum FinetuneError {
    /// Required environment variables are missing or hold unusable values.
    #[error("{}", describe_config_problems(.missing, .invalid))]
    Config { missing: Vec<String>, invalid: Vec<String> },

    /// Dataset directory was not prepared upstream.
    #[error("Dataset directory not prepared: {path} ({reason})\n  → Ensure the entrypoint script resolved and downloaded the dataset")]
    DatasetNotReady { path: PathBuf, reason: String },

    /// Requested worker count cannot be satisfied by this host.
    #[error("Cannot run with {requested} GPU(s): {available} available\n  → Set NUM_GPUS to a value between 1 and {available}")]
    Resource { requested: i64, available: usize },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Multi-worker launcher could not be started.
    #[error("Failed to start launcher '{program}': {message}\n  → Check that the launcher is installed and on PATH")]
    Launch { program: String, message: String },

    /// External trainer exited unsuccessfully.
    #[error("Trainer '{program}' exited with status {code:?}")]
    Trainer { program: String, code: Option<i32> },
}

impl FinetuneError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Create a configuration error from collected problems.
    pub fn config(missing: Vec<String>, invalid: Vec<String>) -> Self {
        Self::Config { missing, invalid }
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::DatasetNotReady { .. } => "E010",
            Self::Resource { .. } => "E020",
            Self::Io { .. } => "E050",
            Self::Serialization { .. } => "E051",
            Self::Launch { .. } => "E060",
            Self::Trainer { .. } => "E061",
        }
    }
}

impl From<serde_json::Error> for FinetuneError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization { message: value.to_string() }
    }
}

fn describe_config_problems(missing: &[String], invalid: &[String]) -> String {
    let mut lines = Vec::new();
    if !missing.is_empty() {
        lines.push(format!("Missing required environment variables: {}", missing.join(", ")));
    }
    if !invalid.is_empty() {
        lines.push(format!("Invalid environment values: {}", invalid.join("; ")));
    }
    if lines.is_empty() {
        lines.push("Invalid configuration".to_string());
    }
    lines.push("  → Export the listed variables in the job definition and resubmit".to_string());
    lines.join("\n")
}
