//! Action-head horizon reconciliation.

use serde::{Deserialize, Serialize};

/// Action horizon of the published GR00T N1.5 base checkpoints.
pub const PRETRAINED_ACTION_HORIZON: usize = 16;

/// Shape and trainability of the model's action head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionHeadSpec {
    /// Number of future action steps predicted per inference
    pub action_horizon: usize,
    pub tune_projector: bool,
    pub tune_diffusion_model: bool,
    /// Set when the head was rebuilt for a new horizon; existing weights load non-strictly
    pub recreated: bool,
}

impl ActionHeadSpec {
    pub const fn new(
        action_horizon: usize,
        tune_projector: bool,
        tune_diffusion_model: bool,
    ) -> Self {
        Self { action_horizon, tune_projector, tune_diffusion_model, recreated: false }
    }
}

/// Replacement action head for a data config's horizon.
///
/// Returns `existing` untouched when the horizons already agree. Otherwise the
/// head is rebuilt with `data_horizon`, re-applying the trainability flags from
/// `existing`, since a fresh head starts with default trainability.
#[must_use]
pub fn reconcile_action_head(existing: ActionHeadSpec, data_horizon: usize) -> ActionHeadSpec {
    if existing.action_horizon == data_horizon {
        return existing;
    }
    ActionHeadSpec { action_horizon: data_horizon, recreated: true, ..existing }
}
