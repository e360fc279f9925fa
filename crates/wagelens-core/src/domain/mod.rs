//! Canonical domain models for salary, cost-of-living, and job-market data.

mod location;
mod models;
mod timestamp;

pub use location::{Location, Occupation};
pub use models::{
    ComprehensiveSalaryData, CostIndices, CostOfLivingDataPoint, JobMarketDataPoint,
    JobMarketFigures, SalaryDataPoint, SalaryFigures,
};
pub use timestamp::UtcDateTime;

pub(crate) use models::clamp01;
