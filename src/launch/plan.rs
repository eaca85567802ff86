//! Execution planning: in-process vs. multi-worker launch.

use serde::Serialize;
use std::fmt;

use crate::config::RunConfig;
use crate::error::{FinetuneError, Result};

/// How the trainer should be run on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionPlan {
    /// Run the trainer in this process
    Direct,
    /// Re-launch through the multi-process launcher with this many local workers
    Spawn(usize),
}

impl ExecutionPlan {
    /// Number of worker processes the plan will start (1 for `Direct`).
    pub const fn worker_count(&self) -> usize {
        match self {
            Self::Direct => 1,
            Self::Spawn(n) => *n,
        }
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Spawn(n) => write!(f, "spawn({n})"),
        }
    }
}

/// Decide how to execute the run.
///
/// `spawned_worker` is true when this process was itself started by the
/// launcher; such processes always run directly so the launcher is never
/// invoked recursively. Decides only, never launches.
pub fn plan_execution(
    config: &RunConfig,
    available_accelerators: usize,
    spawned_worker: bool,
) -> Result<ExecutionPlan> {
    let requested = config.num_gpus;
    let Some(workers) = usize::try_from(requested).ok().filter(|&n| n > 0) else {
        return Err(FinetuneError::Resource { requested, available: available_accelerators });
    };
    if workers > available_accelerators {
        return Err(FinetuneError::Resource { requested, available: available_accelerators });
    }

    let plan = if workers == 1 || spawned_worker {
        ExecutionPlan::Direct
    } else {
        ExecutionPlan::Spawn(workers)
    };
    tracing::info!("Using {workers} GPUs ({plan})");

    Ok(plan)
}
