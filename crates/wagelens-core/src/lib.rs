//! Core aggregation engine for location-based compensation data.
//!
//! `wagelens-core` fans one request out across several public data sources
//! (wage surveys, census income estimates, macroeconomic series, job board
//! postings), validates and merges what comes back into a single
//! confidence-scored answer, and caches the result under a tiered TTL
//! policy. Every source sits behind its own rate limiter, retry policy, and
//! circuit breaker, and a static baseline table keeps answers flowing
//! through a total outage.
//!
//! The entry point is [`Orchestrator`]:
//!
//! ```no_run
//! use wagelens_core::adapters::FetchParams;
//! use wagelens_core::{CoreConfig, Location, Orchestrator};
//!
//! # async fn example() -> Result<(), wagelens_core::CoreError> {
//! let orchestrator = Orchestrator::from_config(&CoreConfig::from_env());
//! let params = FetchParams::new(Location::parse("Atlanta")?);
//! let data = orchestrator.get_comprehensive_salary_data(&params).await?;
//! println!("confidence: {:.2}", data.overall_confidence_score);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cache;
pub mod circuit;
pub mod confidence;
pub mod config;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod http;
pub mod orchestrator;
pub mod outliers;
pub mod persistence;
pub mod rate_limit;
pub mod retry;
pub mod source;
pub mod validation;

pub use cache::{CacheManager, CacheStats, CacheStrategy, DataCategory};
pub use config::{ApiKeys, CoreConfig};
pub use confidence::{ConfidenceScorer, MergedConfidence};
pub use domain::{
    ComprehensiveSalaryData, CostIndices, CostOfLivingDataPoint, JobMarketDataPoint,
    JobMarketFigures, Location, Occupation, SalaryDataPoint, SalaryFigures, UtcDateTime,
};
pub use error::{CoreError, ValidationError};
pub use orchestrator::Orchestrator;
pub use source::SourceId;
pub use validation::{DataValidator, ValidationLevel, ValidationResult};
