//! Census household-income adapter.
//!
//! Serves income estimates and regional cost indices from the census survey
//! API. Two endpoints, one key: `/income` for salary figures and
//! `/cost-of-living` for the index table.

use std::sync::Arc;

use serde::Deserialize;

use crate::adapters::{
    BoxFuture, FetchParams, SalarySource, SourceCapabilities, SourceError, SourceHealth,
};
use crate::domain::{
    CostIndices, CostOfLivingDataPoint, JobMarketDataPoint, SalaryDataPoint, SalaryFigures,
    UtcDateTime,
};
use crate::fetcher::RetryingFetcher;
use crate::http::{ApiAuth, HttpClient, HttpRequest, NoopHttpClient};
use crate::SourceId;

const DEFAULT_BASE_URL: &str = "https://api.census-acs.example.gov/v1";

#[derive(Debug, Deserialize)]
struct IncomePayload {
    year: i32,
    median_income: Option<f64>,
    mean_income: Option<f64>,
    income_p25: Option<f64>,
    income_p75: Option<f64>,
    respondents: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CostPayload {
    year: i32,
    overall_index: Option<f64>,
    housing_index: Option<f64>,
    transportation_index: Option<f64>,
    food_index: Option<f64>,
    healthcare_index: Option<f64>,
    utilities_index: Option<f64>,
}

pub struct CensusAdapter {
    fetcher: RetryingFetcher,
    auth: ApiAuth,
    base_url: String,
}

impl CensusAdapter {
    pub fn new(client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        let auth = match api_key {
            Some(value) => ApiAuth::QueryParam {
                name: String::from("key"),
                value,
            },
            None => ApiAuth::None,
        };
        Self {
            fetcher: RetryingFetcher::for_source(SourceId::Census, client),
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

    async fn endpoint(
        &self,
        path: &str,
        params: &FetchParams,
        mock: fn(&FetchParams) -> serde_json::Value,
    ) -> Result<serde_json::Value, SourceError> {
        if self.fetcher.client().is_mock() {
            return Ok(mock(params));
        }

        let mut url = format!(
            "{}/{path}?area={}",
            self.base_url,
            urlencoding::encode(&params.location.cache_token())
        );
        if let Some(year) = params.year {
            url.push_str(&format!("&year={year}"));
        }

        let response = self.fetcher.fetch(HttpRequest::get(url).with_auth(&self.auth)).await;
        match (response.success, response.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => {
                let message = response
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| String::from("empty response"));
                Err(SourceError::unavailable(SourceId::Census, message))
            }
        }
    }
}

fn survey_year(params: &FetchParams) -> i32 {
    params.year.unwrap_or_else(|| UtcDateTime::now().year() - 1)
}

fn mock_income(params: &FetchParams) -> serde_json::Value {
    serde_json::json!({
        "year": survey_year(params),
        "median_income": 63_500.0,
        "mean_income": 66_000.0,
        "income_p25": 51_000.0,
        "income_p75": 80_000.0,
        "respondents": 5_400,
    })
}

fn mock_cost(params: &FetchParams) -> serde_json::Value {
    serde_json::json!({
        "year": survey_year(params),
        "overall_index": 98.5,
        "housing_index": 95.2,
        "transportation_index": 101.3,
        "food_index": 99.0,
        "healthcare_index": 102.1,
        "utilities_index": 97.4,
    })
}

impl SalarySource for CensusAdapter {
    fn id(&self) -> SourceId {
        SourceId::Census
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            salary: true,
            cost_of_living: true,
            job_market: false,
        }
    }

    fn fetch_salary<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<SalaryDataPoint, SourceError>> {
        Box::pin(async move {
            let raw = self.endpoint("income", params, mock_income).await?;
            let payload: IncomePayload = serde_json::from_value(raw)
                .map_err(|error| SourceError::payload(SourceId::Census, error.to_string()))?;

            let figures = SalaryFigures {
                median: payload.median_income,
                mean: payload.mean_income,
                percentile_25: payload.income_p25,
                percentile_75: payload.income_p75,
                percentile_90: None,
                sample_size: payload.respondents,
            };
            Ok(SalaryDataPoint::new(
                SourceId::Census,
                params.location.clone(),
                params.occupation.clone(),
                figures,
                payload.year,
            )?)
        })
    }

    fn fetch_cost_of_living<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<CostOfLivingDataPoint, SourceError>> {
        Box::pin(async move {
            let raw = self.endpoint("cost-of-living", params, mock_cost).await?;
            let payload: CostPayload = serde_json::from_value(raw)
                .map_err(|error| SourceError::payload(SourceId::Census, error.to_string()))?;

            let indices = CostIndices {
                overall: payload.overall_index,
                housing: payload.housing_index,
                transportation: payload.transportation_index,
                food: payload.food_index,
                healthcare: payload.healthcare_index,
                utilities: payload.utilities_index,
            };
            Ok(CostOfLivingDataPoint::new(
                SourceId::Census,
                params.location.clone(),
                indices,
                payload.year,
            )?)
        })
    }

    fn fetch_job_market<'a>(
        &'a self,
        _params: &'a FetchParams,
    ) -> BoxFuture<'a, Result<JobMarketDataPoint, SourceError>> {
        Box::pin(async move {
            Err(SourceError::Unsupported {
                id: SourceId::Census,
                category: "job-market",
            })
        })
    }

    fn health(&self) -> SourceHealth {
        SourceHealth {
            source: SourceId::Census,
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
    async fn mock_income_becomes_a_salary_point() {
        let adapter = CensusAdapter::mock();
        let point = adapter.fetch_salary(&params()).await.expect("salary point");

        assert_eq!(point.source, SourceId::Census);
        assert_eq!(point.figures.median, Some(63_500.0));
        assert_eq!(point.figures.percentile_90, None);
        assert_eq!(point.confidence_score, SourceId::Census.reliability());
    }

    #[tokio::test]
    async fn mock_cost_indices_are_complete() {
        let adapter = CensusAdapter::mock();
        let point = adapter
            .fetch_cost_of_living(&params())
            .await
            .expect("cost point");

        assert_eq!(point.indices.overall, Some(98.5));
        assert_eq!(point.indices.present().len(), 6);
    }

    #[tokio::test]
    async fn job_market_is_unsupported() {
        let adapter = CensusAdapter::mock();
        assert!(matches!(
            adapter.fetch_job_market(&params()).await,
            Err(SourceError::Unsupported { .. })
        ));
    }
}
