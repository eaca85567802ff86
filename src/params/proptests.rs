//! Property-based tests for trainer parameter assembly

use super::*;
use proptest::prelude::*;
use std::collections::HashMap;

fn arb_env() -> impl Strategy<Value = HashMap<String, String>> {
    (
        1u64..100_000,
        1u64..10_000,
        1usize..512,
        0u32..64,
        0usize..16,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(max_steps, save_steps, batch, rank, workers, full_model, resume)| {
            HashMap::from([
                ("DATASET_LOCAL_DIR".to_string(), "/data/x".to_string()),
                ("MAX_STEPS".to_string(), max_steps.to_string()),
                ("SAVE_STEPS".to_string(), save_steps.to_string()),
                ("BATCH_SIZE".to_string(), batch.to_string()),
                ("LORA_RANK".to_string(), rank.to_string()),
                ("DATALOADER_NUM_WORKERS".to_string(), workers.to_string()),
                ("LORA_FULL_MODEL".to_string(), full_model.to_string()),
                ("RESUME".to_string(), resume.to_string()),
            ])
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_seed_always_fixed(env in arb_env(), horizon in 1usize..64) {
        let config = RunConfig::resolve(&env).expect("generated env is valid");
        let params = build_training_parameters(&config, horizon);
        prop_assert_eq!(params.training_args.seed, 42);
        prop_assert_eq!(params.dataset.mixture_seed, 42);
    }

    #[test]
    fn prop_build_is_deterministic(env in arb_env(), horizon in 1usize..64) {
        let config = RunConfig::resolve(&env).expect("generated env is valid");
        prop_assert_eq!(
            build_training_parameters(&config, horizon),
            build_training_parameters(&config, horizon)
        );
    }

    #[test]
    fn prop_lora_iff_rank_positive(env in arb_env()) {
        let config = RunConfig::resolve(&env).expect("generated env is valid");
        let params = build_training_parameters(&config, 16);
        let is_lora = matches!(params.model.method, FineTuneMethod::Lora(_));
        prop_assert_eq!(is_lora, config.lora_rank > 0);
    }

    #[test]
    fn prop_model_head_matches_data_horizon(env in arb_env(), horizon in 1usize..64) {
        let config = RunConfig::resolve(&env).expect("generated env is valid");
        let head = build_training_parameters(&config, horizon).model.action_head;
        prop_assert_eq!(head.action_horizon, horizon);
        prop_assert_eq!(head.recreated, horizon != PRETRAINED_ACTION_HORIZON);
    }

    #[test]
    fn prop_reconcile_lands_on_data_horizon(existing in 1usize..64, data in 1usize..64) {
        let head = ActionHeadSpec::new(existing, true, true);
        let new = reconcile_action_head(head, data);
        prop_assert_eq!(new.action_horizon, data);
        prop_assert_eq!(new.recreated, existing != data);
    }
}
