//! Run configuration
//!
//! Resolves the fine-tuning run parameters from environment variables into
//! an immutable [`RunConfig`].
//!
//! # Example
//!
//! ```
//! use gr00t_finetune::config::RunConfig;
//! use std::collections::HashMap;
//!
//! let env = HashMap::from([("DATASET_LOCAL_DIR", "/data/so100"), ("NUM_GPUS", "2")]);
//! let config = RunConfig::resolve(&env).unwrap();
//! assert_eq!(config.num_gpus, 2);
//! assert_eq!(config.max_steps, 6000);
//! ```

mod catalog;
mod env;
mod run_config;

#[cfg(test)]
mod proptests;

pub use catalog::{DataConfigKind, EmbodimentTag, DEFAULT_ACTION_HORIZON};
pub use env::{EnvSource, ProcessEnv};
pub use run_config::{RunConfig, DEFAULT_OUTPUT_DIR};

/// Resolve the run configuration from the process environment.
pub fn resolve() -> crate::Result<RunConfig> {
    RunConfig::from_env()
}
