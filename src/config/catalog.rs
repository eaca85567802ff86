//! Known data configurations and embodiment tags.
//!
//! Values outside these catalogs are still accepted; the workflow only warns
//! about them because the external training framework may register more.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Action horizon used by every bundled data configuration.
pub const DEFAULT_ACTION_HORIZON: usize = 16;

/// Data configuration selecting modality layout and transforms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DataConfigKind {
    #[default]
    So100DualCam,
    FourierGr1ArmsOnly,
    FourierGr1ArmsWaist,
    AgibotGenie1DualCam,
    OxeDroidSingleCam,
    /// Name not in the bundled catalog
    Other(String),
}

impl DataConfigKind {
    /// Every bundled configuration, in catalog order.
    pub const KNOWN: [DataConfigKind; 5] = [
        Self::So100DualCam,
        Self::FourierGr1ArmsOnly,
        Self::FourierGr1ArmsWaist,
        Self::AgibotGenie1DualCam,
        Self::OxeDroidSingleCam,
    ];

    /// Parse a configuration name. Never fails.
    pub fn parse(name: &str) -> Self {
        match name {
            "so100_dualcam" => Self::So100DualCam,
            "fourier_gr1_arms_only" => Self::FourierGr1ArmsOnly,
            "fourier_gr1_arms_waist" => Self::FourierGr1ArmsWaist,
            "agibot_genie1_dualcam" => Self::AgibotGenie1DualCam,
            "oxe_droid_single_cam" => Self::OxeDroidSingleCam,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::So100DualCam => "so100_dualcam",
            Self::FourierGr1ArmsOnly => "fourier_gr1_arms_only",
            Self::FourierGr1ArmsWaist => "fourier_gr1_arms_waist",
            Self::AgibotGenie1DualCam => "agibot_genie1_dualcam",
            Self::OxeDroidSingleCam => "oxe_droid_single_cam",
            Self::Other(name) => name,
        }
    }

    /// Whether the name is part of the bundled catalog.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Number of future action steps the configuration samples per frame.
    pub fn action_horizon(&self) -> usize {
        DEFAULT_ACTION_HORIZON
    }

    /// Whether a default `meta/modality.json` may be synthesized for datasets
    /// recorded with this configuration.
    pub fn synthesizes_modality_file(&self) -> bool {
        matches!(self, Self::So100DualCam)
    }
}

impl fmt::Display for DataConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DataConfigKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<DataConfigKind> for String {
    fn from(value: DataConfigKind) -> Self {
        value.as_str().to_string()
    }
}

/// Robot hardware configuration a dataset or model is calibrated for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EmbodimentTag {
    #[default]
    NewEmbodiment,
    Gr1,
    OxeDroid,
    AgibotGenie1,
    /// Tag not in the bundled catalog
    Other(String),
}

impl EmbodimentTag {
    pub const KNOWN: [EmbodimentTag; 4] =
        [Self::NewEmbodiment, Self::Gr1, Self::OxeDroid, Self::AgibotGenie1];

    pub fn parse(name: &str) -> Self {
        match name {
            "new_embodiment" => Self::NewEmbodiment,
            "gr1" => Self::Gr1,
            "oxe_droid" => Self::OxeDroid,
            "agibot_genie1" => Self::AgibotGenie1,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NewEmbodiment => "new_embodiment",
            Self::Gr1 => "gr1",
            Self::OxeDroid => "oxe_droid",
            Self::AgibotGenie1 => "agibot_genie1",
            Self::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for EmbodimentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EmbodimentTag {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<EmbodimentTag> for String {
    fn from(value: EmbodimentTag) -> Self {
        value.as_str().to_string()
    }
}
