//! # gr00t-finetune
//!
//! Job configurator for fine-tuning the GR00T robot foundation model.
//!
//! A job resolves its run parameters from the environment, checks that the
//! dataset staged by the entrypoint is usable, decides between a single
//! in-process run and a multi-worker launch, and hands a complete parameter
//! set to the external trainer.
//!
//! ## Modules
//!
//! - [`config`]: environment resolution into [`config::RunConfig`]
//! - [`dataset`]: dataset readiness gate and modality description
//! - [`launch`]: execution planning and the multi-worker launcher
//! - [`params`]: trainer parameter assembly
//! - [`workflow`]: the end-to-end job state machine
//! - [`cli`]: command-line entry point

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod launch;
pub mod logging;
pub mod params;
pub mod workflow;

pub use error::{FinetuneError, Result};
