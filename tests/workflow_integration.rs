//! Integration tests for the fine-tuning job workflow

use gr00t_finetune::config::RunConfig;
use gr00t_finetune::dataset::{ensure_dataset_ready, DatasetReport, MODALITY_FILE};
use gr00t_finetune::launch::{plan_execution, ExecutionPlan};
use gr00t_finetune::params::{build_training_parameters, TrainingParameters};
use gr00t_finetune::workflow::{
    write_training_args, Outcome, Workflow, WorkflowOptions, TRAINING_ARGS_FILE,
};
use gr00t_finetune::FinetuneError;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tempfile::TempDir;

/// Dataset directory with one episode file and no metadata.
fn staged_dataset() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    fs::create_dir_all(dir.path().join("data")).expect("data dir should be created");
    fs::write(dir.path().join("data").join("episode_000000.parquet"), b"PAR1")
        .expect("episode should be written");
    dir
}

fn job_env(dataset: &Path, output: &Path, extra: &[(&str, &str)]) -> HashMap<String, String> {
    let mut env = HashMap::from([
        ("DATASET_LOCAL_DIR".to_string(), dataset.display().to_string()),
        ("OUTPUT_DIR".to_string(), output.display().to_string()),
    ]);
    for (key, value) in extra {
        env.insert((*key).to_string(), (*value).to_string());
    }
    env
}

fn options(available: usize) -> WorkflowOptions {
    WorkflowOptions { available_accelerators: Some(available), ..WorkflowOptions::default() }
}

fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).expect("dir should be readable") {
            let path = entry.expect("entry should be readable").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let bytes = fs::read(&path).expect("file should be readable");
                files.push((path.display().to_string(), bytes));
            }
        }
    }
    files.sort();
    files
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_so100_dataset_gets_modality_file() {
    let dataset = staged_dataset();
    let output = tempfile::tempdir().expect("temp dir should be created");
    let env = job_env(dataset.path(), output.path(), &[("DATA_CONFIG", "so100_dualcam")]);
    let config = RunConfig::resolve(&env).expect("config should resolve");

    let report = ensure_dataset_ready(&config).expect("dataset should be ready");
    let path = dataset.path().join(MODALITY_FILE);
    assert_eq!(report, DatasetReport::ModalityFileCreated(path.clone()));

    let written: serde_json::Value =
        serde_json::from_slice(&fs::read(&path).expect("modality file should exist"))
            .expect("modality file should be JSON");
    assert_eq!(written["state"]["single_arm"]["end"], 5);
    assert_eq!(written["action"]["gripper"]["start"], 5);
    assert_eq!(written["video"]["front"]["original_key"], "observation.images.front");
    assert_eq!(written["annotation"]["human.task_description"]["original_key"], "task_index");
}

#[test]
fn test_custom_modality_file_untouched_and_idempotent() {
    let dataset = staged_dataset();
    let output = tempfile::tempdir().expect("temp dir should be created");
    fs::create_dir_all(dataset.path().join("meta")).expect("meta dir should be created");
    fs::write(dataset.path().join(MODALITY_FILE), "{\"custom\": true}")
        .expect("custom file should be written");

    let env = job_env(dataset.path(), output.path(), &[]);
    let config = RunConfig::resolve(&env).expect("config should resolve");

    let before = snapshot(dataset.path());
    assert_eq!(ensure_dataset_ready(&config).expect("first check"), DatasetReport::Ready);
    assert_eq!(ensure_dataset_ready(&config).expect("second check"), DatasetReport::Ready);
    assert_eq!(snapshot(dataset.path()), before);
}

#[test]
fn test_missing_dataset_variable_fails_resolve() {
    let env: HashMap<String, String> = HashMap::new();
    let err = Workflow::new(&env, options(1)).run().expect_err("workflow should fail");
    match err {
        FinetuneError::Config { missing, .. } => {
            assert_eq!(missing, vec!["DATASET_LOCAL_DIR".to_string()]);
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_empty_dataset_fails_before_output_is_created() {
    let dataset = tempfile::tempdir().expect("temp dir should be created");
    let output_root = tempfile::tempdir().expect("temp dir should be created");
    let output = output_root.path().join("checkpoints");
    let env = job_env(dataset.path(), &output, &[]);

    let err = Workflow::new(&env, options(1)).run().expect_err("workflow should fail");
    assert!(matches!(err, FinetuneError::DatasetNotReady { .. }));
    assert!(!output.exists());
}

// =========================================================================
// Planning
// =========================================================================

#[test]
fn test_plan_matrix_with_four_devices() {
    let dataset = staged_dataset();
    let output = tempfile::tempdir().expect("temp dir should be created");
    let plan_for = |gpus: &str, spawned: bool| {
        let env = job_env(dataset.path(), output.path(), &[("NUM_GPUS", gpus)]);
        let config = RunConfig::resolve(&env).expect("config should resolve");
        plan_execution(&config, 4, spawned)
    };

    assert_eq!(plan_for("1", false).expect("plan"), ExecutionPlan::Direct);
    assert_eq!(plan_for("4", false).expect("plan"), ExecutionPlan::Spawn(4));
    assert_eq!(plan_for("4", true).expect("plan"), ExecutionPlan::Direct);
    assert!(matches!(plan_for("8", false), Err(FinetuneError::Resource { .. })));
    assert!(matches!(plan_for("0", false), Err(FinetuneError::Resource { .. })));
}

#[test]
fn test_resource_error_stops_workflow() {
    let dataset = staged_dataset();
    let output = tempfile::tempdir().expect("temp dir should be created");
    let env = job_env(dataset.path(), output.path(), &[("NUM_GPUS", "8")]);

    let err = Workflow::new(&env, options(4)).run().expect_err("workflow should fail");
    assert!(matches!(err, FinetuneError::Resource { requested: 8, available: 4 }));
    assert!(!output.path().join(TRAINING_ARGS_FILE).exists());
}

// =========================================================================
// Hand-off
// =========================================================================

#[test]
fn test_direct_run_writes_training_args() {
    let dataset = staged_dataset();
    let output_root = tempfile::tempdir().expect("temp dir should be created");
    let output = output_root.path().join("checkpoints");
    let env = job_env(dataset.path(), &output, &[("LORA_RANK", "8"), ("MAX_STEPS", "100")]);

    let outcome = Workflow::new(&env, options(1)).run().expect("workflow should succeed");
    let params_path = output.join(TRAINING_ARGS_FILE);
    assert_eq!(
        outcome,
        Outcome::HandedOff { params_path: params_path.clone(), trainer_ran: false }
    );
    assert_eq!(outcome.exit_code(), 0);

    let json = fs::read_to_string(&params_path).expect("training args should exist");
    let params = TrainingParameters::from_json(&json).expect("training args should parse");
    let config = RunConfig::resolve(&env).expect("config should resolve");
    assert_eq!(params, build_training_parameters(&config, 16));
    assert_eq!(params.training_args.seed, 42);
    assert_eq!(params.training_args.max_steps, 100);
}

#[cfg(unix)]
#[test]
fn test_trainer_exit_status_is_checked() {
    let dataset = staged_dataset();
    let output = tempfile::tempdir().expect("temp dir should be created");
    let env = job_env(dataset.path(), output.path(), &[]);

    let ok = WorkflowOptions { trainer: Some("true".into()), ..options(1) };
    let outcome = Workflow::new(&env, ok).run().expect("trainer should succeed");
    assert!(matches!(outcome, Outcome::HandedOff { trainer_ran: true, .. }));

    let failing = WorkflowOptions { trainer: Some("false".into()), ..options(1) };
    let err = Workflow::new(&env, failing).run().expect_err("trainer should fail");
    assert!(matches!(err, FinetuneError::Trainer { code: Some(1), .. }));
}

#[cfg(unix)]
#[test]
fn test_spawn_propagates_launcher_exit_code() {
    let dataset = staged_dataset();
    let output = tempfile::tempdir().expect("temp dir should be created");
    let env = job_env(dataset.path(), output.path(), &[("NUM_GPUS", "2")]);

    let spawn = |launcher: &str| WorkflowOptions {
        launcher: Some(launcher.into()),
        worker_exe: Some("/bin/true".into()),
        ..options(2)
    };

    let outcome = Workflow::new(&env, spawn("true")).run().expect("launcher should start");
    assert_eq!(outcome, Outcome::Launched { workers: 2, exit_code: 0 });

    let outcome = Workflow::new(&env, spawn("false")).run().expect("launcher should start");
    assert_eq!(outcome.exit_code(), 1);

    // The parent never writes parameters; workers do.
    assert!(!output.path().join(TRAINING_ARGS_FILE).exists());
}

#[test]
fn test_spawned_worker_runs_directly() {
    let dataset = staged_dataset();
    let output = tempfile::tempdir().expect("temp dir should be created");
    let env = job_env(dataset.path(), output.path(), &[("NUM_GPUS", "2")]);

    let worker = WorkflowOptions { spawned_worker: true, ..options(2) };
    let outcome = Workflow::new(&env, worker).run().expect("worker should hand off");
    assert!(matches!(outcome, Outcome::HandedOff { .. }));
    assert!(output.path().join(TRAINING_ARGS_FILE).is_file());
}

#[test]
fn test_concurrent_workers_never_expose_partial_training_args() {
    let dataset = staged_dataset();
    let output = tempfile::tempdir().expect("temp dir should be created");
    let env = job_env(dataset.path(), output.path(), &[("NUM_GPUS", "2")]);
    let config = RunConfig::resolve(&env).expect("config should resolve");
    let params = build_training_parameters(&config, 16);

    let path = write_training_args(&params).expect("initial write should succeed");
    let stop = AtomicBool::new(false);

    let partial_reads = thread::scope(|s| {
        for _ in 0..2 {
            s.spawn(|| {
                while !stop.load(Ordering::Relaxed) {
                    write_training_args(&params).expect("rewrite should succeed");
                }
            });
        }

        let mut partial = 0;
        for _ in 0..2000 {
            let intact = fs::read_to_string(&path)
                .ok()
                .and_then(|json| TrainingParameters::from_json(&json).ok())
                .is_some_and(|read| read == params);
            if !intact {
                partial += 1;
            }
        }
        stop.store(true, Ordering::Relaxed);
        partial
    });
    assert_eq!(partial_reads, 0, "trainer read an incomplete training_args.json");

    let leftovers: Vec<_> = fs::read_dir(output.path())
        .expect("output dir should be readable")
        .map(|entry| entry.expect("entry should be readable").file_name())
        .filter(|name| name != TRAINING_ARGS_FILE)
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}
