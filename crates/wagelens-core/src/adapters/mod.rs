//! Provider adapters.
//!
//! Each adapter owns its transport plumbing (rate limiter, circuit breaker,
//! retry policy) through a [`RetryingFetcher`] and translates one provider's
//! payload shape into the shared domain types. Backed by a mock transport an
//! adapter serves deterministic offline payloads through the same parse path
//! as live responses.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::domain::{CostOfLivingDataPoint, JobMarketDataPoint, Location, Occupation, SalaryDataPoint};
use crate::circuit::BreakerState;
use crate::{SourceId, ValidationError};

mod census;
mod economic;
mod job_board;
mod wage_survey;

pub use census::CensusAdapter;
pub use economic::EconomicIndicatorAdapter;
pub use job_board::JobBoardAdapter;
pub use wage_survey::WageSurveyAdapter;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What the caller is asking every source for.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchParams {
    pub location: Location,
    pub occupation: Option<Occupation>,
    pub year: Option<i32>,
}

impl FetchParams {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            occupation: None,
            year: None,
        }
    }

    pub fn with_occupation(mut self, occupation: Occupation) -> Self {
        self.occupation = Some(occupation);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Which data categories a source can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceCapabilities {
    pub salary: bool,
    pub cost_of_living: bool,
    pub job_market: bool,
}

/// Point-in-time view of one adapter's plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SourceHealth {
    pub source: SourceId,
    pub breaker: BreakerState,
    pub has_rate_budget: bool,
}

// The offending-source field is named `id` rather than `source` so thiserror
// does not wire it up as the error's cause chain.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{id} is unavailable: {message}")]
    Unavailable { id: SourceId, message: String },

    #[error("{id} returned an unusable payload: {message}")]
    Payload { id: SourceId, message: String },

    #[error("{id} does not provide {category} data")]
    Unsupported {
        id: SourceId,
        category: &'static str,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SourceError {
    pub(crate) fn unavailable(id: SourceId, message: impl Into<String>) -> Self {
        Self::Unavailable {
            id,
            message: message.into(),
        }
    }

    pub(crate) fn payload(id: SourceId, message: impl Into<String>) -> Self {
        Self::Payload {
            id,
            message: message.into(),
        }
    }
}

/// Contract every provider adapter implements.
///
/// Categories outside a source's [`SourceCapabilities`] return
/// [`SourceError::Unsupported`].
pub trait SalarySource: Send + Sync {
    fn id(&self) -> SourceId;

    fn capabilities(&self) -> SourceCapabilities;

    fn fetch_salary<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<SalaryDataPoint, SourceError>>;

    fn fetch_cost_of_living<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<CostOfLivingDataPoint, SourceError>>;

    fn fetch_job_market<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<JobMarketDataPoint, SourceError>>;

    fn health(&self) -> SourceHealth;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_errors_name_the_offending_source() {
        let error = SourceError::unavailable(SourceId::Census, "HTTP 503");
        assert_eq!(error.to_string(), "census is unavailable: HTTP 503");
        assert!(std::error::Error::source(&error).is_none());

        let error = SourceError::Unsupported {
            id: SourceId::WageSurvey,
            category: "job-market",
        };
        assert_eq!(error.to_string(), "wage_survey does not provide job-market data");
    }

    #[test]
    fn fetch_params_builder() {
        let params = FetchParams::new(Location::parse("Atlanta").expect("valid"))
            .with_occupation(Occupation::parse("Nurse").expect("valid"))
            .with_year(2024);

        assert_eq!(params.location.as_str(), "Atlanta");
        assert_eq!(params.occupation.as_ref().map(|o| o.as_str()), Some("Nurse"));
        assert_eq!(params.year, Some(2024));
    }
}
