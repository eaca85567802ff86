//! Property-based tests for run configuration resolution

use super::*;
use crate::error::FinetuneError;
use proptest::prelude::*;
use std::collections::HashMap;

const NUMERIC_KEYS: [&str; 5] =
    ["MAX_STEPS", "SAVE_STEPS", "BATCH_SIZE", "LORA_RANK", "DATALOADER_PREFETCH_FACTOR"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_positive_steps_round_trip(
        max_steps in 1u64..1_000_000,
        save_steps in 1u64..1_000_000,
        batch_size in 1usize..4096,
    ) {
        let env: HashMap<String, String> = HashMap::from([
            ("DATASET_LOCAL_DIR".to_string(), "/data/x".to_string()),
            ("MAX_STEPS".to_string(), max_steps.to_string()),
            ("SAVE_STEPS".to_string(), save_steps.to_string()),
            ("BATCH_SIZE".to_string(), batch_size.to_string()),
        ]);
        let config = RunConfig::resolve(&env).expect("valid values resolve");
        prop_assert_eq!(config.max_steps, max_steps);
        prop_assert_eq!(config.save_steps, save_steps);
        prop_assert_eq!(config.batch_size, batch_size);
    }

    #[test]
    fn prop_every_unparsable_value_is_reported(
        broken in proptest::sample::subsequence(NUMERIC_KEYS.to_vec(), 1..=NUMERIC_KEYS.len()),
        garbage in "[a-z]{1,8}",
    ) {
        let mut env: HashMap<String, String> = HashMap::new();
        for key in &broken {
            env.insert((*key).to_string(), garbage.clone());
        }

        match RunConfig::resolve(&env) {
            Err(FinetuneError::Config { missing, invalid }) => {
                prop_assert_eq!(missing, vec!["DATASET_LOCAL_DIR".to_string()]);
                prop_assert_eq!(invalid.len(), broken.len());
                for key in &broken {
                    let prefix = format!("{key}=");
                    prop_assert!(invalid.iter().any(|p| p.starts_with(&prefix)));
                }
            }
            other => prop_assert!(false, "expected config error, got {:?}", other),
        }
    }

    #[test]
    fn prop_flags_only_accept_true(value in "[a-zA-Z0-9]{0,6}") {
        let env: HashMap<String, String> = HashMap::from([
            ("DATASET_LOCAL_DIR".to_string(), "/data/x".to_string()),
            ("RESUME".to_string(), value.clone()),
        ]);
        let config = RunConfig::resolve(&env).expect("flags never fail");
        prop_assert_eq!(config.resume, value.eq_ignore_ascii_case("true"));
    }
}
