use serde::Serialize;
use serde_json::Value;
use wagelens_core::adapters::FetchParams;
use wagelens_core::{CacheStats, ComprehensiveSalaryData, Location, Occupation, Orchestrator};

use crate::cli::FetchArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct FetchReport {
    #[serde(flatten)]
    data: ComprehensiveSalaryData,
    cache: CacheStats,
}

pub async fn run(args: &FetchArgs, orchestrator: &Orchestrator) -> Result<Value, CliError> {
    let mut params = FetchParams::new(Location::parse(&args.location)?);
    if let Some(occupation) = &args.occupation {
        params = params.with_occupation(Occupation::parse(occupation)?);
    }
    if let Some(year) = args.year {
        params = params.with_year(year);
    }

    let data = if args.refresh {
        orchestrator.refresh_comprehensive_salary_data(&params).await?
    } else {
        orchestrator.get_comprehensive_salary_data(&params).await?
    };

    let report = FetchReport {
        data,
        cache: orchestrator.cache_stats(),
    };
    Ok(serde_json::to_value(report)?)
}
