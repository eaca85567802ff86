//! Validate command implementation

use crate::cli::ValidateArgs;
use crate::config::{ProcessEnv, RunConfig};
use crate::dataset::DatasetReport;
use crate::error::Result;
use crate::launch::ExecutionPlan;
use crate::logging::{log, LogLevel};
use crate::params::{build_training_parameters, FineTuneMethod, ModelSettings, TrainingArguments};
use crate::workflow::{Preflight, Workflow, WorkflowOptions};

/// Format model information as a string
pub fn format_model_info(model: &ModelSettings) -> String {
    let head = &model.action_head;
    let mut lines = vec![
        format!("  Base model: {}", model.base_model_path),
        format!(
            "  Tune: llm={} visual={} projector={} diffusion={}",
            model.tune_llm, model.tune_visual, head.tune_projector, head.tune_diffusion_model
        ),
    ];
    if head.recreated {
        lines.push(format!("  Action horizon: {} (head recreated)", head.action_horizon));
    } else {
        lines.push(format!("  Action horizon: {}", head.action_horizon));
    }
    if let FineTuneMethod::Lora(adapter) = &model.method {
        let scope = if adapter.action_head_only { "action head" } else { "full model" };
        lines.push(format!(
            "  LoRA: rank={} alpha={} scale={} dropout={} ({scope})",
            adapter.rank,
            adapter.alpha,
            adapter.scale(),
            adapter.dropout
        ));
    }
    lines.join("\n")
}

/// Format dataset information as a string
pub fn format_data_info(config: &RunConfig, report: &DatasetReport) -> String {
    let mut lines = vec![
        format!("  Dataset: {}", config.dataset_dir.display()),
        format!("  Data config: {}", config.data_config),
        format!("  Embodiment: {}", config.embodiment_tag),
        format!("  Video backend: {}", config.video_backend),
    ];
    if let DatasetReport::ModalityFileCreated(path) = report {
        lines.push(format!("  Created: {}", path.display()));
    }
    lines.join("\n")
}

/// Format training schedule as a string
pub fn format_training_info(args: &TrainingArguments, plan: ExecutionPlan) -> String {
    [
        format!("  Steps: {} ({} warmup)", args.max_steps, args.warmup_steps()),
        format!("  Checkpoints: {} (every {} steps)", args.checkpoint_count(), args.save_steps),
        format!("  Batch size: {}", args.per_device_train_batch_size),
        format!("  Learning rate: {}", args.learning_rate),
        format!("  Workers: {} ({plan})", plan.worker_count()),
        format!("  Output dir: {}", args.output_dir.display()),
    ]
    .join("\n")
}

pub fn run_validate(args: &ValidateArgs, level: LogLevel) -> Result<i32> {
    let options = WorkflowOptions {
        spawned_worker: args.spawned_worker,
        available_accelerators: args.available_gpus,
        ..WorkflowOptions::default()
    };
    let Preflight { config, dataset, plan } = Workflow::new(&ProcessEnv, options).preflight()?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed {
        let params = build_training_parameters(&config, config.data_config.action_horizon());
        log(level, LogLevel::Normal, "");
        log(level, LogLevel::Normal, "Configuration Summary:");
        log(level, LogLevel::Normal, &format_model_info(&params.model));
        log(level, LogLevel::Normal, "");
        log(level, LogLevel::Normal, &format_data_info(&config, &dataset));
        log(level, LogLevel::Normal, "");
        log(level, LogLevel::Normal, &format_training_info(&params.training_args, plan));
    }

    Ok(0)
}
