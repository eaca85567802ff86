//! Trainer parameter assembly
//!
//! [`build_training_parameters`] maps a resolved [`RunConfig`] onto the
//! parameter set consumed by the external training framework. The mapping is
//! pure: the same config and horizon always produce the same parameters.

mod action_head;
mod training_args;

#[cfg(test)]
mod proptests;

pub use action_head::{reconcile_action_head, ActionHeadSpec, PRETRAINED_ACTION_HORIZON};
pub use training_args::{
    ComputeDtype, DatasetSettings, FineTuneMethod, LoraAdapter, LrSchedulerType, ModelSettings,
    Optimizer, SaveStrategy, TrainingArguments, TrainingParameters, TRAINING_SEED,
};

use crate::config::RunConfig;

/// Adam first-moment decay.
pub const ADAM_BETA1: f64 = 0.95;
/// Adam second-moment decay.
pub const ADAM_BETA2: f64 = 0.999;
pub const ADAM_EPSILON: f64 = 1e-8;
pub const LOGGING_STEPS: f64 = 10.0;
pub const NUM_TRAIN_EPOCHS: u32 = 300;
pub const SAVE_TOTAL_LIMIT: u32 = 5;
pub const DDP_BUCKET_CAP_MB: u32 = 100;

/// Build the trainer parameter set.
///
/// `derived_action_horizon` is the horizon of the active data config. The
/// model section carries the pretrained action head reconciled to it.
#[must_use]
pub fn build_training_parameters(
    config: &RunConfig,
    derived_action_horizon: usize,
) -> TrainingParameters {
    TrainingParameters {
        training_args: training_arguments(config),
        model: model_settings(config, derived_action_horizon),
        dataset: dataset_settings(config),
        resume_from_checkpoint: config.resume,
    }
}

fn training_arguments(config: &RunConfig) -> TrainingArguments {
    TrainingArguments {
        output_dir: config.output_dir.clone(),
        run_name: None,
        remove_unused_columns: false,
        deepspeed: String::new(),
        gradient_checkpointing: false,
        bf16: true,
        tf32: true,
        per_device_train_batch_size: config.batch_size,
        gradient_accumulation_steps: 1,
        dataloader_num_workers: config.dataloader_num_workers,
        dataloader_pin_memory: false,
        dataloader_prefetch_factor: config.dataloader_prefetch_factor,
        dataloader_persistent_workers: config.dataloader_num_workers > 0,
        optim: Optimizer::AdamwTorch,
        adam_beta1: ADAM_BETA1,
        adam_beta2: ADAM_BETA2,
        adam_epsilon: ADAM_EPSILON,
        learning_rate: config.learning_rate,
        weight_decay: config.weight_decay,
        warmup_ratio: config.warmup_ratio,
        lr_scheduler_type: LrSchedulerType::Cosine,
        logging_steps: LOGGING_STEPS,
        num_train_epochs: NUM_TRAIN_EPOCHS,
        max_steps: config.max_steps,
        save_strategy: SaveStrategy::Steps,
        save_steps: config.save_steps,
        save_total_limit: SAVE_TOTAL_LIMIT,
        report_to: config.report_to.clone(),
        seed: TRAINING_SEED,
        do_eval: false,
        ddp_find_unused_parameters: false,
        ddp_bucket_cap_mb: DDP_BUCKET_CAP_MB,
        torch_compile_mode: None,
    }
}

fn model_settings(config: &RunConfig, data_horizon: usize) -> ModelSettings {
    let pretrained = ActionHeadSpec::new(
        PRETRAINED_ACTION_HORIZON,
        config.tune_projector,
        config.tune_diffusion_model,
    );

    let method = if config.lora_enabled() {
        FineTuneMethod::Lora(LoraAdapter {
            rank: config.lora_rank,
            alpha: config.lora_alpha,
            dropout: config.lora_dropout,
            action_head_only: !config.lora_full_model,
        })
    } else {
        FineTuneMethod::Full
    };

    ModelSettings {
        base_model_path: config.base_model_path.clone(),
        tune_llm: config.tune_llm,
        tune_visual: config.tune_visual,
        compute_dtype: ComputeDtype::Bfloat16,
        action_head: reconcile_action_head(pretrained, data_horizon),
        method,
    }
}

fn dataset_settings(config: &RunConfig) -> DatasetSettings {
    DatasetSettings {
        dataset_path: config.dataset_dir.clone(),
        data_config: config.data_config.clone(),
        embodiment_tag: config.embodiment_tag.clone(),
        video_backend: config.video_backend.clone(),
        balance_dataset_weights: config.balance_dataset_weights,
        balance_trajectory_weights: config.balance_trajectory_weights,
        mixture_seed: TRAINING_SEED,
    }
}
