//! Accelerator discovery
//!
//! Counts local CUDA devices through `nvidia-smi`, restricted by
//! `CUDA_VISIBLE_DEVICES` the same way the CUDA runtime restricts them.
//! Hosts without a usable device report a single one.

use std::process::Command;

/// Environment variable that limits which devices this process may use.
pub const VISIBLE_DEVICES_ENV: &str = "CUDA_VISIBLE_DEVICES";

/// Number of accelerators usable by this process.
///
/// Hosts without `nvidia-smi`, or with every device masked off, report one
/// device so single-worker runs can still be planned.
#[must_use]
pub fn available_accelerators() -> usize {
    let visible = std::env::var(VISIBLE_DEVICES_ENV).ok();
    usable_devices(cuda_device_count(), visible.as_deref())
}

/// Count CUDA devices on the host, or `None` when the query cannot run.
#[must_use]
pub fn cuda_device_count() -> Option<usize> {
    let output = Command::new("nvidia-smi")
        .arg("--query-gpu=name")
        .arg("--format=csv,noheader")
        .output()
        .ok()?;

    if !output.status.success() {
        tracing::debug!("nvidia-smi exited with {}", output.status);
        return None;
    }

    Some(count_device_lines(&String::from_utf8_lossy(&output.stdout)))
}

/// Number of devices listed in a `CUDA_VISIBLE_DEVICES` value.
///
/// An empty value hides every device.
#[must_use]
pub fn visible_device_count(value: &str) -> usize {
    value.split(',').filter(|entry| !entry.trim().is_empty()).count()
}

fn usable_devices(detected: Option<usize>, visible: Option<&str>) -> usize {
    let usable = match (detected, visible) {
        (Some(detected), Some(visible)) => detected.min(visible_device_count(visible)),
        (Some(detected), None) => detected,
        (None, _) => 0,
    };
    if usable == 0 {
        tracing::debug!("No usable CUDA device found, planning for one");
        1
    } else {
        usable
    }
}

/// One non-blank line per device in `--format=csv,noheader` output.
fn count_device_lines(stdout: &str) -> usize {
    stdout.lines().filter(|line| !line.trim().is_empty()).count()
}
