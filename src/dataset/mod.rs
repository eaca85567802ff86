//! Dataset admission
//!
//! Gates the workflow on a dataset directory prepared by an upstream step.
//! This module never downloads or builds datasets. The only repair it makes
//! is writing a default modality description when the selected data
//! configuration expects one and the dataset lacks it.

mod modality;


pub use modality::{
    AnnotationKeys, ArmLayout, ChannelRange, DualCameraKeys, ModalityDescription, SourceKey,
    MODALITY_FILE,
};

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::RunConfig;
use crate::error::{FinetuneError, Result};

/// Outcome of a successful readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetReport {
    /// Dataset was usable as found
    Ready,
    /// A default modality description was written at the given path
    ModalityFileCreated(PathBuf),
}

/// Check that the configured dataset directory exists and is non-empty.
///
/// Writes `meta/modality.json` when the active data configuration expects
/// one and it is absent. An existing file is never touched, so repeated
/// calls leave the directory unchanged after the first.
pub fn ensure_dataset_ready(config: &RunConfig) -> Result<DatasetReport> {
    let root = config.dataset_dir.as_path();
    tracing::info!("Validating dataset...");

    check_populated(root)?;
    tracing::info!("Using dataset directory: {}", root.display());

    if !config.data_config.synthesizes_modality_file() {
        return Ok(DatasetReport::Ready);
    }

    let path = root.join(MODALITY_FILE);
    if write_if_absent(&path, &ModalityDescription::so100_dualcam())? {
        tracing::info!(
            "Created missing modality.json at {} for {}",
            path.display(),
            config.data_config
        );
        Ok(DatasetReport::ModalityFileCreated(path))
    } else {
        Ok(DatasetReport::Ready)
    }
}

fn check_populated(root: &Path) -> Result<()> {
    let not_ready = |reason: &str| FinetuneError::DatasetNotReady {
        path: root.to_path_buf(),
        reason: reason.to_string(),
    };

    if !root.is_dir() {
        return Err(not_ready("directory does not exist"));
    }

    let mut entries = fs::read_dir(root)
        .map_err(|e| FinetuneError::io(format!("listing {}", root.display()), e))?;
    if entries.next().is_none() {
        tracing::warn!("DATASET_LOCAL_DIR is provided but empty: {}", root.display());
        return Err(not_ready("directory is empty"));
    }

    Ok(())
}

/// Returns `true` when the file was written.
fn write_if_absent(path: &Path, description: &ModalityDescription) -> Result<bool> {
    if path.is_file() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| FinetuneError::io(format!("creating {}", parent.display()), e))?;
    }

    let bytes = description.to_json_pretty()?;
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        // Lost a race with a sibling worker; their copy stands.
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(FinetuneError::io(format!("creating {}", path.display()), e)),
    };
    file.write_all(&bytes)
        .map_err(|e| FinetuneError::io(format!("writing {}", path.display()), e))?;

    Ok(true)
}
