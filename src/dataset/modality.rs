//! Modality description file (`meta/modality.json`).
//!
//! Describes which state/action channels, camera streams and annotations a
//! LeRobot-format dataset exposes. Field order is part of the written file.

use serde::{Deserialize, Serialize};

/// Location of the modality description relative to the dataset root.
pub const MODALITY_FILE: &str = "meta/modality.json";

/// Half-open channel index range inside a flat state or action vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub start: usize,
    pub end: usize,
}

impl ChannelRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Key of a column in the source dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceKey {
    pub original_key: String,
}

impl SourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { original_key: key.into() }
    }
}

/// Single-arm manipulator layout: five joints followed by one gripper channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmLayout {
    pub single_arm: ChannelRange,
    pub gripper: ChannelRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualCameraKeys {
    pub wrist: SourceKey,
    pub front: SourceKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationKeys {
    #[serde(rename = "human.task_description")]
    pub task_description: SourceKey,
}

/// Modality description for a dual-camera single-arm dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityDescription {
    pub state: ArmLayout,
    pub action: ArmLayout,
    pub video: DualCameraKeys,
    pub annotation: AnnotationKeys,
}

impl ModalityDescription {
    /// Default layout for SO-100 dual-camera recordings.
    pub fn so100_dualcam() -> Self {
        let arm =
            ArmLayout { single_arm: ChannelRange::new(0, 5), gripper: ChannelRange::new(5, 6) };
        Self {
            state: arm.clone(),
            action: arm,
            video: DualCameraKeys {
                wrist: SourceKey::new("observation.images.wrist"),
                front: SourceKey::new("observation.images.front"),
            },
            annotation: AnnotationKeys { task_description: SourceKey::new("task_index") },
        }
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json_pretty(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }
}
