mod fetch;
mod sources;
mod strategies;

use serde_json::Value;
use wagelens_core::{CoreConfig, Orchestrator};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let config = CoreConfig::from_env().with_cache_strategy(cli.cache_strategy.into());
    let orchestrator = Orchestrator::from_config(&config);

    match &cli.command {
        Command::Fetch(args) => fetch::run(args, &orchestrator).await,
        Command::Sources => sources::run(&orchestrator),
        Command::Strategies => strategies::run(),
    }
}
