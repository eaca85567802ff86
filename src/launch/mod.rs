//! Execution planning and multi-worker launch
//!
//! [`plan_execution`] decides whether a run happens in this process or
//! through the data-parallel launcher. [`WorkerLauncher`] performs the
//! launch on the caller's behalf.

mod accelerator;
mod launcher;
mod plan;

pub use accelerator::{
    available_accelerators, cuda_device_count, visible_device_count, VISIBLE_DEVICES_ENV,
};
pub use launcher::{WorkerLauncher, DEFAULT_LAUNCHER, WORKER_FLAG, WORKER_MARKER_ENV};
pub use plan::{plan_execution, ExecutionPlan};
