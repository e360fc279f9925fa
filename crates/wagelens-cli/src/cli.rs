//! CLI argument definitions for wagelens.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Aggregate salary, cost-of-living, and job-market data for a location |
//! | `sources` | Show per-source health (circuit state, rate budget) |
//! | `strategies` | List cache strategies and their TTL tiers |

use clap::{Args, Parser, Subcommand, ValueEnum};
use wagelens_core::CacheStrategy;

/// Location-based compensation data, aggregated across public sources.
#[derive(Debug, Parser)]
#[command(
    name = "wagelens",
    author,
    version,
    about = "Multi-source salary and cost-of-living aggregator"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Cache TTL tier.
    #[arg(long, global = true, value_enum, default_value_t = StrategySelector::Standard)]
    pub cache_strategy: StrategySelector,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategySelector {
    Standard,
    Aggressive,
    Conservative,
}

impl From<StrategySelector> for CacheStrategy {
    fn from(value: StrategySelector) -> Self {
        match value {
            StrategySelector::Standard => Self::Standard,
            StrategySelector::Aggressive => Self::Aggressive,
            StrategySelector::Conservative => Self::Conservative,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate comprehensive salary data for a location.
    Fetch(FetchArgs),
    /// Show source health.
    Sources,
    /// List cache strategies and TTL tiers.
    Strategies,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Metropolitan area, e.g. "Atlanta" or "New York".
    pub location: String,

    /// Occupation title to narrow the figures to.
    #[arg(long)]
    pub occupation: Option<String>,

    /// Data year to request (defaults to the latest available).
    #[arg(long)]
    pub year: Option<i32>,

    /// Bypass the cache read and re-aggregate.
    #[arg(long, default_value_t = false)]
    pub refresh: bool,
}
