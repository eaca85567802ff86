//! Parameter set handed to the external trainer.
//!
//! Field names follow the trainer's argument names so the serialized file
//! can be splatted directly into its constructor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::action_head::ActionHeadSpec;
use crate::config::{DataConfigKind, EmbodimentTag};

/// Seed used for training and dataset mixture sampling.
pub const TRAINING_SEED: u64 = 42;

/// Optimizer implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Optimizer {
    #[default]
    AdamwTorch,
}

/// Learning rate schedule after warmup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LrSchedulerType {
    #[default]
    Cosine,
}

/// When checkpoints are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStrategy {
    #[default]
    Steps,
}

/// Numeric type for model computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeDtype {
    Float32,
    #[default]
    Bfloat16,
}

/// Trainer arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingArguments {
    pub output_dir: PathBuf,
    pub run_name: Option<String>,
    pub remove_unused_columns: bool,
    /// DeepSpeed config path; empty disables DeepSpeed
    pub deepspeed: String,
    pub gradient_checkpointing: bool,
    pub bf16: bool,
    pub tf32: bool,
    pub per_device_train_batch_size: usize,
    pub gradient_accumulation_steps: usize,
    pub dataloader_num_workers: usize,
    pub dataloader_pin_memory: bool,
    pub dataloader_prefetch_factor: usize,
    pub dataloader_persistent_workers: bool,
    pub optim: Optimizer,
    pub adam_beta1: f64,
    pub adam_beta2: f64,
    pub adam_epsilon: f64,
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub warmup_ratio: f64,
    pub lr_scheduler_type: LrSchedulerType,
    pub logging_steps: f64,
    /// Upper bound only; `max_steps` ends the run first
    pub num_train_epochs: u32,
    pub max_steps: u64,
    pub save_strategy: SaveStrategy,
    pub save_steps: u64,
    pub save_total_limit: u32,
    pub report_to: String,
    pub seed: u64,
    pub do_eval: bool,
    pub ddp_find_unused_parameters: bool,
    pub ddp_bucket_cap_mb: u32,
    pub torch_compile_mode: Option<String>,
}

impl TrainingArguments {
    /// Warmup steps implied by `warmup_ratio`, rounded up.
    #[must_use]
    pub fn warmup_steps(&self) -> u64 {
        (self.max_steps as f64 * self.warmup_ratio).ceil() as u64
    }

    /// Number of checkpoints the run will write.
    #[must_use]
    pub fn checkpoint_count(&self) -> u64 {
        if self.save_steps == 0 {
            0
        } else {
            self.max_steps / self.save_steps
        }
    }
}

/// Low-rank adapter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoraAdapter {
    pub rank: u32,
    pub alpha: u32,
    pub dropout: f64,
    /// Restrict adapters to the action head
    pub action_head_only: bool,
}

impl LoraAdapter {
    /// Scaling factor applied to the adapter update (alpha / rank).
    #[must_use]
    pub fn scale(&self) -> f64 {
        if self.rank == 0 {
            0.0
        } else {
            f64::from(self.alpha) / f64::from(self.rank)
        }
    }
}

/// Which weights the run updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FineTuneMethod {
    /// Components selected by the tune flags are trained in full
    Full,
    /// Low-rank adapters on top of frozen weights
    Lora(LoraAdapter),
}

/// Model loading and trainability settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub base_model_path: String,
    pub tune_llm: bool,
    pub tune_visual: bool,
    pub compute_dtype: ComputeDtype,
    /// Action head after reconciling with the data config's horizon
    pub action_head: ActionHeadSpec,
    pub method: FineTuneMethod,
}

/// Dataset construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSettings {
    pub dataset_path: PathBuf,
    pub data_config: DataConfigKind,
    pub embodiment_tag: EmbodimentTag,
    pub video_backend: String,
    pub balance_dataset_weights: bool,
    pub balance_trajectory_weights: bool,
    pub mixture_seed: u64,
}

/// Everything the external trainer needs to start a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParameters {
    pub training_args: TrainingArguments,
    pub model: ModelSettings,
    pub dataset: DatasetSettings,
    pub resume_from_checkpoint: bool,
}

impl TrainingParameters {
    /// Pretty JSON for the hand-off file.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
