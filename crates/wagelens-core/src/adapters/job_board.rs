//! Job board adapter.
//!
//! Aggregates live posting statistics: posting counts, advertised salary
//! ranges, and a demand score. Advertised salaries also feed the salary
//! merge, at the lowest reliability of the four live sources. Bearer-token
//! auth.

use std::sync::Arc;

use serde::Deserialize;

use crate::adapters::{
    BoxFuture, FetchParams, SalarySource, SourceCapabilities, SourceError, SourceHealth,
};
use crate::domain::{
    CostOfLivingDataPoint, JobMarketDataPoint, JobMarketFigures, SalaryDataPoint, SalaryFigures,
    UtcDateTime,
};
use crate::fetcher::RetryingFetcher;
use crate::http::{ApiAuth, HttpClient, HttpRequest, NoopHttpClient};
use crate::SourceId;

const DEFAULT_BASE_URL: &str = "https://api.jobboard.example.io/v1";

#[derive(Debug, Deserialize)]
struct PostingsPayload {
    job_count: Option<u64>,
    average_salary: Option<f64>,
    salary_range_min: Option<f64>,
    salary_range_max: Option<f64>,
    demand_score: Option<f64>,
    advertised_median: Option<f64>,
    advertised_p25: Option<f64>,
    advertised_p75: Option<f64>,
}

pub struct JobBoardAdapter {
    fetcher: RetryingFetcher,
    auth: ApiAuth,
    base_url: String,
}

impl JobBoardAdapter {
    pub fn new(client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        let auth = match api_key {
            Some(value) => ApiAuth::Header {
                name: String::from("authorization"),
                value: format!("Bearer {value}"),
            },
            None => ApiAuth::None,
        };
        Self {
            fetcher: RetryingFetcher::for_source(SourceId::JobBoard, client),
            auth,
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    pub fn mock() -> Self {
        Self::new(Arc::new(NoopHttpClient), None)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_fetcher(mut self, fetcher: RetryingFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    async fn postings(&self, params: &FetchParams) -> Result<PostingsPayload, SourceError> {
        let raw = if self.fetcher.client().is_mock() {
            mock_postings(params)
        } else {
            let mut url = format!(
                "{}/postings/stats?location={}",
                self.base_url,
                urlencoding::encode(&params.location.cache_token())
            );
            if let Some(occupation) = &params.occupation {
                url.push_str("&title=");
                url.push_str(&urlencoding::encode(&occupation.cache_token()));
            }

            let response = self.fetcher.fetch(HttpRequest::get(url).with_auth(&self.auth)).await;
            match (response.success, response.data) {
                (true, Some(data)) => data,
                (_, _) => {
                    let message = response
                        .error
                        .map(|e| e.message)
                        .unwrap_or_else(|| String::from("empty response"));
                    return Err(SourceError::unavailable(SourceId::JobBoard, message));
                }
            }
        };

        serde_json::from_value(raw)
            .map_err(|error| SourceError::payload(SourceId::JobBoard, error.to_string()))
    }
}

fn mock_postings(_params: &FetchParams) -> serde_json::Value {
    serde_json::json!({
        "job_count": 3_400,
        "average_salary": 66_500.0,
        "salary_range_min": 48_000.0,
        "salary_range_max": 95_000.0,
        "demand_score": 85.0,
        "advertised_median": 66_200.0,
        "advertised_p25": 53_000.0,
        "advertised_p75": 83_000.0,
    })
}

impl SalarySource for JobBoardAdapter {
    fn id(&self) -> SourceId {
        SourceId::JobBoard
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            salary: true,
            cost_of_living: false,
            job_market: true,
        }
    }

    fn fetch_salary<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<SalaryDataPoint, SourceError>> {
        Box::pin(async move {
            let payload = self.postings(params).await?;
            let figures = SalaryFigures {
                median: payload.advertised_median,
                mean: payload.average_salary,
                percentile_25: payload.advertised_p25,
                percentile_75: payload.advertised_p75,
                percentile_90: None,
                sample_size: payload.job_count,
            };
            // Postings reflect the current market, not a survey year.
            let year = params.year.unwrap_or_else(|| UtcDateTime::now().year());
            Ok(SalaryDataPoint::new(
                SourceId::JobBoard,
                params.location.clone(),
                params.occupation.clone(),
                figures,
                year,
            )?)
        })
    }

    fn fetch_cost_of_living<'a>(
        &'a self,
        _params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<CostOfLivingDataPoint, SourceError>> {
        Box::pin(async move {
            Err(SourceError::Unsupported {
                id: SourceId::JobBoard,
                category: "cost-of-living",
            })
        })
    }

    fn fetch_job_market<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<JobMarketDataPoint, SourceError>> {
        Box::pin(async move {
            let payload = self.postings(params).await?;
            let figures = JobMarketFigures {
                job_count: payload.job_count,
                average_salary: payload.average_salary,
                salary_range_min: payload.salary_range_min,
                salary_range_max: payload.salary_range_max,
                demand_score: payload.demand_score,
            };
            Ok(JobMarketDataPoint::new(
                SourceId::JobBoard,
                params.location.clone(),
                params.occupation.clone(),
                figures,
            )?)
        })
    }

    fn health(&self) -> SourceHealth {
        SourceHealth {
            source: SourceId::JobBoard,
            breaker: self.fetcher.breaker().state(),
            has_rate_budget: self.fetcher.limiter().has_budget(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;

    fn params() -> FetchParams {
        FetchParams::new(Location::parse("Atlanta").expect("valid"))
    }

    #[tokio::test]
    async fn mock_postings_become_a_job_market_point() {
        let adapter = JobBoardAdapter::mock();
        let point = adapter
            .fetch_job_market(&params())
            .await
            .expect("job market point");

        assert_eq!(point.source, SourceId::JobBoard);
        assert_eq!(point.figures.job_count, Some(3_400));
        assert_eq!(point.figures.demand_score, Some(85.0));
        assert_eq!(point.confidence_score, SourceId::JobBoard.reliability());
    }

    #[tokio::test]
    async fn advertised_salaries_become_a_salary_point() {
        let adapter = JobBoardAdapter::mock();
        let point = adapter.fetch_salary(&params()).await.expect("salary point");

        assert_eq!(point.figures.median, Some(66_200.0));
        assert_eq!(point.figures.sample_size, Some(3_400));
    }

    #[tokio::test]
    async fn cost_of_living_is_unsupported() {
        let adapter = JobBoardAdapter::mock();
        assert!(matches!(
            adapter.fetch_cost_of_living(&params()).await,
            Err(SourceError::Unsupported { .. })
        ));
    }
}
