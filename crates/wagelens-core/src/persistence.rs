//! Benchmark persistence seam.
//!
//! The orchestrator hands finished data points to a [`BenchmarkSink`] after
//! every successful aggregation. Persistence is fire-and-forget: a sink
//! failure is logged by the caller and never fails the request.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::domain::{CostOfLivingDataPoint, JobMarketDataPoint, SalaryDataPoint};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
#[error("persistence failure: {message}")]
pub struct SinkError {
    message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Where finished benchmarks go.
pub trait BenchmarkSink: Send + Sync {
    fn save_salary_benchmark<'a>(
        &'a self,
        point: &'a SalaryDataPoint,
    ) -> BoxFuture<'a, Result<(), SinkError>>;

    fn save_cost_of_living<'a>(
        &'a self,
        point: &'a CostOfLivingDataPoint,
    ) -> BoxFuture<'a, Result<(), SinkError>>;

    fn save_job_market<'a>(
        &'a self,
        point: &'a JobMarketDataPoint,
    ) -> BoxFuture<'a, Result<(), SinkError>>;

    fn save_confidence_score<'a>(
        &'a self,
        location: &'a str,
        occupation: Option<&'a str>,
        score: f64,
    ) -> BoxFuture<'a, Result<(), SinkError>>;
}

/// Discards everything. The default sink when no warehouse is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl BenchmarkSink for NoopSink {
    fn save_salary_benchmark<'a>(
        &'a self,
        _point: &'a SalaryDataPoint,
    ) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async { Ok(()) })
    }

    fn save_cost_of_living<'a>(
        &'a self,
        _point: &'a CostOfLivingDataPoint,
    ) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async { Ok(()) })
    }

    fn save_job_market<'a>(
        &'a self,
        _point: &'a JobMarketDataPoint,
    ) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async { Ok(()) })
    }

    fn save_confidence_score<'a>(
        &'a self,
        _location: &'a str,
        _occupation: Option<&'a str>,
        _score: f64,
    ) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async { Ok(()) })
    }
}
