//! Run configuration resolved from the process environment.

use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use super::catalog::{DataConfigKind, EmbodimentTag};
use super::env::{EnvSource, ProcessEnv};
use crate::error::{FinetuneError, Result};

pub const DEFAULT_OUTPUT_DIR: &str = "/workspace/checkpoints";
pub const DEFAULT_MAX_STEPS: u64 = 6000;
pub const DEFAULT_SAVE_STEPS: u64 = 2000;
pub const DEFAULT_NUM_GPUS: i64 = 1;
pub const DEFAULT_VIDEO_BACKEND: &str = "torchvision_av";
pub const DEFAULT_BATCH_SIZE: usize = 32;
pub const DEFAULT_LEARNING_RATE: f64 = 1e-4;
pub const DEFAULT_BASE_MODEL_PATH: &str = "nvidia/GR00T-N1.5-3B";
pub const DEFAULT_REPORT_TO: &str = "tensorboard";
pub const DEFAULT_LORA_ALPHA: u32 = 16;
pub const DEFAULT_LORA_DROPOUT: f64 = 0.1;
pub const DEFAULT_WEIGHT_DECAY: f64 = 1e-5;
pub const DEFAULT_WARMUP_RATIO: f64 = 0.05;
pub const DEFAULT_DATALOADER_NUM_WORKERS: usize = 8;
pub const DEFAULT_DATALOADER_PREFETCH_FACTOR: usize = 4;

/// Fully resolved fine-tuning run configuration.
///
/// Constructed once per process at entry and passed by reference to every
/// downstream step. Nothing reads the environment after this is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    /// Local dataset directory prepared by the entrypoint (`DATASET_LOCAL_DIR`)
    pub dataset_dir: PathBuf,
    /// Checkpoint and log directory (`OUTPUT_DIR`)
    pub output_dir: PathBuf,
    pub max_steps: u64,
    pub save_steps: u64,
    /// Requested worker count; validated against the host in planning
    pub num_gpus: i64,
    pub data_config: DataConfigKind,
    pub video_backend: String,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Hub repository id or local path of the pretrained checkpoint
    pub base_model_path: String,
    pub embodiment_tag: EmbodimentTag,
    /// Metrics sink for the trainer (e.g. `tensorboard`, `wandb`)
    pub report_to: String,
    /// Tune the backbone language model
    pub tune_llm: bool,
    /// Tune the backbone vision tower
    pub tune_visual: bool,
    /// Tune the action head projector
    pub tune_projector: bool,
    /// Tune the action head diffusion transformer
    pub tune_diffusion_model: bool,
    /// LoRA rank; zero disables LoRA
    pub lora_rank: u32,
    pub lora_alpha: u32,
    pub lora_dropout: f64,
    /// Apply LoRA to the full model instead of the action head only
    pub lora_full_model: bool,
    pub weight_decay: f64,
    pub warmup_ratio: f64,
    pub dataloader_num_workers: usize,
    pub dataloader_prefetch_factor: usize,
    pub balance_dataset_weights: bool,
    pub balance_trajectory_weights: bool,
    /// Resume the trainer from the latest checkpoint in `output_dir`
    pub resume: bool,
}

impl RunConfig {
    /// Resolve from the real process environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(&ProcessEnv)
    }

    /// Resolve from an explicit environment source.
    ///
    /// Every missing required variable and every unusable value is collected
    /// before failing, so a single error lists all problems.
    pub fn resolve(env: &impl EnvSource) -> Result<Self> {
        let mut reader = EnvReader::new(env);

        let dataset_dir = reader.required_path("DATASET_LOCAL_DIR");
        let config = Self {
            output_dir: reader.path("OUTPUT_DIR", DEFAULT_OUTPUT_DIR),
            max_steps: reader.number("MAX_STEPS", DEFAULT_MAX_STEPS),
            save_steps: reader.number("SAVE_STEPS", DEFAULT_SAVE_STEPS),
            num_gpus: reader.number("NUM_GPUS", DEFAULT_NUM_GPUS),
            data_config: DataConfigKind::parse(
                &reader.string("DATA_CONFIG", DataConfigKind::default().as_str()),
            ),
            video_backend: reader.string("VIDEO_BACKEND", DEFAULT_VIDEO_BACKEND),
            batch_size: reader.number("BATCH_SIZE", DEFAULT_BATCH_SIZE),
            learning_rate: reader.number("LEARNING_RATE", DEFAULT_LEARNING_RATE),
            base_model_path: reader.string("BASE_MODEL_PATH", DEFAULT_BASE_MODEL_PATH),
            embodiment_tag: EmbodimentTag::parse(
                &reader.string("EMBODIMENT_TAG", EmbodimentTag::default().as_str()),
            ),
            report_to: reader.string("REPORT_TO", DEFAULT_REPORT_TO),
            tune_llm: reader.flag("TUNE_LLM", false),
            tune_visual: reader.flag("TUNE_VISUAL", false),
            tune_projector: reader.flag("TUNE_PROJECTOR", true),
            tune_diffusion_model: reader.flag("TUNE_DIFFUSION_MODEL", true),
            lora_rank: reader.number("LORA_RANK", 0),
            lora_alpha: reader.number("LORA_ALPHA", DEFAULT_LORA_ALPHA),
            lora_dropout: reader.number("LORA_DROPOUT", DEFAULT_LORA_DROPOUT),
            lora_full_model: reader.flag("LORA_FULL_MODEL", false),
            weight_decay: reader.number("WEIGHT_DECAY", DEFAULT_WEIGHT_DECAY),
            warmup_ratio: reader.number("WARMUP_RATIO", DEFAULT_WARMUP_RATIO),
            dataloader_num_workers: reader
                .number("DATALOADER_NUM_WORKERS", DEFAULT_DATALOADER_NUM_WORKERS),
            dataloader_prefetch_factor: reader
                .number("DATALOADER_PREFETCH_FACTOR", DEFAULT_DATALOADER_PREFETCH_FACTOR),
            balance_dataset_weights: reader.flag("BALANCE_DATASET_WEIGHTS", true),
            balance_trajectory_weights: reader.flag("BALANCE_TRAJECTORY_WEIGHTS", true),
            resume: reader.flag("RESUME", false),
            dataset_dir,
        };

        let (missing, mut invalid) = reader.finish();
        invalid.extend(config.range_problems());
        if !missing.is_empty() || !invalid.is_empty() {
            return Err(FinetuneError::config(missing, invalid));
        }

        for warning in config.catalog_warnings() {
            tracing::warn!("{warning}");
        }
        tracing::info!("All required parameters validated successfully");

        Ok(config)
    }

    /// Whether LoRA adapters are requested.
    pub fn lora_enabled(&self) -> bool {
        self.lora_rank > 0
    }

    /// Non-fatal notices for values outside the bundled catalogs.
    pub fn catalog_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.data_config.is_known() {
            warnings.push(format!("Data config '{}' may not be supported", self.data_config));
        }
        if !self.embodiment_tag.is_known() {
            warnings.push(format!("Embodiment tag '{}' may not be supported", self.embodiment_tag));
        }
        warnings
    }

    fn range_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.max_steps == 0 {
            problems.push("MAX_STEPS must be greater than 0".to_string());
        }
        if self.save_steps == 0 {
            problems.push("SAVE_STEPS must be greater than 0".to_string());
        }
        if self.batch_size == 0 {
            problems.push("BATCH_SIZE must be greater than 0".to_string());
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            problems.push(format!("LEARNING_RATE must be positive (got {})", self.learning_rate));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            problems.push(format!("WEIGHT_DECAY must be >= 0 (got {})", self.weight_decay));
        }
        if !(0.0..=1.0).contains(&self.warmup_ratio) {
            problems.push(format!("WARMUP_RATIO must be in [0, 1] (got {})", self.warmup_ratio));
        }
        if !(0.0..1.0).contains(&self.lora_dropout) {
            problems.push(format!("LORA_DROPOUT must be in [0, 1) (got {})", self.lora_dropout));
        }
        if self.dataloader_prefetch_factor == 0 {
            problems.push("DATALOADER_PREFETCH_FACTOR must be greater than 0".to_string());
        }

        problems
    }
}

/// Typed reads over an [`EnvSource`] that record problems instead of
/// returning early.
struct EnvReader<'a, E: EnvSource> {
    env: &'a E,
    missing: Vec<String>,
    invalid: Vec<String>,
}

impl<'a, E: EnvSource> EnvReader<'a, E> {
    fn new(env: &'a E) -> Self {
        Self { env, missing: Vec::new(), invalid: Vec::new() }
    }

    fn raw(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    fn required_path(&mut self, key: &str) -> PathBuf {
        match self.raw(key) {
            Some(value) if !value.trim().is_empty() => PathBuf::from(value),
            _ => {
                self.missing.push(key.to_string());
                PathBuf::new()
            }
        }
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    fn path(&self, key: &str, default: &str) -> PathBuf {
        PathBuf::from(self.string(key, default))
    }

    fn number<T>(&mut self, key: &str, default: T) -> T
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(value) = self.raw(key) else {
            return default;
        };
        match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(e) => {
                self.invalid.push(format!("{key}='{value}' ({e})"));
                default
            }
        }
    }

    /// `true` iff the value is "true" in any ASCII case.
    fn flag(&self, key: &str, default: bool) -> bool {
        self.raw(key).map_or(default, |value| value.trim().eq_ignore_ascii_case("true"))
    }

    fn finish(self) -> (Vec<String>, Vec<String>) {
        (self.missing, self.invalid)
    }
}
