//! Params command implementation

use std::fs;

use crate::cli::ParamsArgs;
use crate::config::RunConfig;
use crate::error::{FinetuneError, Result};
use crate::logging::{log, LogLevel};
use crate::params::build_training_parameters;

pub fn run_params(args: &ParamsArgs, level: LogLevel) -> Result<i32> {
    let config = RunConfig::from_env()?;
    let params = build_training_parameters(&config, config.data_config.action_horizon());
    let json = params.to_json_pretty()?;

    match &args.output {
        Some(path) => {
            fs::write(path, &json)
                .map_err(|e| FinetuneError::io(format!("writing {}", path.display()), e))?;
            log(level, LogLevel::Normal, &format!("Parameters written to {}", path.display()));
        }
        None => println!("{json}"),
    }

    Ok(0)
}
