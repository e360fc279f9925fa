//! Occupational wage survey adapter.
//!
//! The survey publishes annual wage statistics per metropolitan area and
//! occupation. Salary only; it carries no cost-of-living or posting data.

use std::sync::Arc;

use serde::Deserialize;

use crate::adapters::{
    BoxFuture, FetchParams, SalarySource, SourceCapabilities, SourceError, SourceHealth,
};
use crate::domain::{
    CostOfLivingDataPoint, JobMarketDataPoint, SalaryDataPoint, SalaryFigures, UtcDateTime,
};
use crate::fetcher::RetryingFetcher;
use crate::http::{ApiAuth, HttpClient, HttpRequest, NoopHttpClient};
use crate::SourceId;

const DEFAULT_BASE_URL: &str = "https://data.wagesurvey.example.com/api/v2";

#[derive(Debug, Deserialize)]
struct WagePayload {
    year: i32,
    annual_median: Option<f64>,
    annual_mean: Option<f64>,
    pct_25: Option<f64>,
    pct_75: Option<f64>,
    pct_90: Option<f64>,
    employment_sample: Option<u64>,
}

pub struct WageSurveyAdapter {
    fetcher: RetryingFetcher,
    auth: ApiAuth,
    base_url: String,
}

impl WageSurveyAdapter {
    pub fn new(client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        let auth = match api_key {
            Some(value) => ApiAuth::QueryParam {
                name: String::from("api_key"),
                value,
            },
            None => ApiAuth::None,
        };
        Self {
            fetcher: RetryingFetcher::for_source(SourceId::WageSurvey, client),
            auth,
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    /// Adapter serving deterministic offline payloads.
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

    async fn series(&self, params: &FetchParams) -> Result<WagePayload, SourceError> {
        let raw = if self.fetcher.client().is_mock() {
            mock_payload(params)
        } else {
            let mut url = format!(
                "{}/wages?area={}",
                self.base_url,
                urlencoding::encode(&params.location.cache_token())
            );
            if let Some(occupation) = &params.occupation {
                url.push_str("&occupation=");
                url.push_str(&urlencoding::encode(&occupation.cache_token()));
            }
            if let Some(year) = params.year {
                url.push_str(&format!("&year={year}"));
            }

            let response = self.fetcher.fetch(HttpRequest::get(url).with_auth(&self.auth)).await;
            match (response.success, response.data) {
                (true, Some(data)) => data,
                (_, _) => {
                    let message = response
                        .error
                        .map(|e| e.message)
                        .unwrap_or_else(|| String::from("empty response"));
                    return Err(SourceError::unavailable(SourceId::WageSurvey, message));
                }
            }
        };

        serde_json::from_value(raw)
            .map_err(|error| SourceError::payload(SourceId::WageSurvey, error.to_string()))
    }
}

fn mock_payload(params: &FetchParams) -> serde_json::Value {
    let year = params.year.unwrap_or_else(|| UtcDateTime::now().year() - 1);
    serde_json::json!({
        "area": params.location.cache_token(),
        "year": year,
        "annual_median": 65_000.0,
        "annual_mean": 67_000.0,
        "pct_25": 52_000.0,
        "pct_75": 82_000.0,
        "pct_90": 98_000.0,
        "employment_sample": 1_200,
    })
}

impl SalarySource for WageSurveyAdapter {
    fn id(&self) -> SourceId {
        SourceId::WageSurvey
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            salary: true,
            ..SourceCapabilities::default()
        }
    }

    fn fetch_salary<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<SalaryDataPoint, SourceError>> {
        Box::pin(async move {
            let payload = self.series(params).await?;
            let figures = SalaryFigures {
                median: payload.annual_median,
                mean: payload.annual_mean,
                percentile_25: payload.pct_25,
                percentile_75: payload.pct_75,
                percentile_90: payload.pct_90,
                sample_size: payload.employment_sample,
            };
            Ok(SalaryDataPoint::new(
                SourceId::WageSurvey,
                params.location.clone(),
                params.occupation.clone(),
                figures,
                payload.year,
            )?)
        })
    }

    fn fetch_cost_of_living<'a>(
        &'a self,
        _params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<CostOfLivingDataPoint, SourceError>> {
        Box::pin(async move {
            Err(SourceError::Unsupported {
                id: SourceId::WageSurvey,
                category: "cost-of-living",
            })
        })
    }

    fn fetch_job_market<'a>(
        &'a self,
        _params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<JobMarketDataPoint, SourceError>> {
        Box::pin(async move {
            Err(SourceError::Unsupported {
                id: SourceId::WageSurvey,
                category: "job-market",
            })
        })
    }

    fn health(&self) -> SourceHealth {
        SourceHealth {
            source: SourceId::WageSurvey,
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
    async fn mock_adapter_yields_a_full_salary_point() {
        let adapter = WageSurveyAdapter::mock();
        let point = adapter.fetch_salary(&params()).await.expect("salary point");

        assert_eq!(point.source, SourceId::WageSurvey);
        assert_eq!(point.figures.median, Some(65_000.0));
        assert_eq!(point.figures.sample_size, Some(1_200));
        assert_eq!(point.confidence_score, SourceId::WageSurvey.reliability());
    }

    #[tokio::test]
    async fn unsupported_categories_are_rejected() {
        let adapter = WageSurveyAdapter::mock();
        assert!(matches!(
            adapter.fetch_cost_of_living(&params()).await,
            Err(SourceError::Unsupported { .. })
        ));
        assert!(matches!(
            adapter.fetch_job_market(&params()).await,
            Err(SourceError::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn requested_year_flows_into_the_point() {
        let adapter = WageSurveyAdapter::mock();
        let point = adapter
            .fetch_salary(&params().with_year(2023))
            .await
            .expect("salary point");
        assert_eq!(point.year, 2023);
    }
}
