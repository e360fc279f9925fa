use serde::Serialize;
use serde_json::Value;
use wagelens_core::adapters::SourceHealth;
use wagelens_core::Orchestrator;

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SourcesReport {
    sources: Vec<SourceHealth>,
}

pub fn run(orchestrator: &Orchestrator) -> Result<Value, CliError> {
    let report = SourcesReport {
        sources: orchestrator.source_snapshots(),
    };
    Ok(serde_json::to_value(report)?)
}
