use serde::Serialize;
use serde_json::Value;
use wagelens_core::{CacheStrategy, DataCategory};

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct StrategyRow {
    name: &'static str,
    salary_ttl_secs: u64,
    market_ttl_secs: u64,
    confidence_ttl_secs: u64,
    compress: bool,
}

#[derive(Debug, Serialize)]
struct StrategiesReport {
    strategies: Vec<StrategyRow>,
}

pub fn run() -> Result<Value, CliError> {
    let strategies = [
        CacheStrategy::Standard,
        CacheStrategy::Aggressive,
        CacheStrategy::Conservative,
    ]
    .into_iter()
    .map(|strategy| StrategyRow {
        name: strategy.as_str(),
        salary_ttl_secs: strategy.ttl_for(DataCategory::Salary).as_secs(),
        market_ttl_secs: strategy.ttl_for(DataCategory::Market).as_secs(),
        confidence_ttl_secs: strategy.ttl_for(DataCategory::Confidence).as_secs(),
        compress: strategy.compress(),
    })
    .collect();

    let report = StrategiesReport { strategies };
    Ok(serde_json::to_value(report)?)
}
