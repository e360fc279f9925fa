//! Economic indicator adapter.
//!
//! Wraps a macroeconomic time-series API that publishes regional earnings
//! series and price-parity indices. Authenticates with an `X-API-Key` header.

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

const DEFAULT_BASE_URL: &str = "https://api.econseries.example.org/v3";

#[derive(Debug, Deserialize)]
struct EarningsPayload {
    year: i32,
    median_earnings: Option<f64>,
    mean_earnings: Option<f64>,
    earnings_p25: Option<f64>,
    earnings_p75: Option<f64>,
    observations: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PriceParityPayload {
    year: i32,
    all_items: Option<f64>,
    housing: Option<f64>,
    transportation: Option<f64>,
    food: Option<f64>,
    healthcare: Option<f64>,
    utilities: Option<f64>,
}

pub struct EconomicIndicatorAdapter {
    fetcher: RetryingFetcher,
    auth: ApiAuth,
    base_url: String,
}

impl EconomicIndicatorAdapter {
    pub fn new(client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        let auth = match api_key {
            Some(value) => ApiAuth::Header {
                name: String::from("x-api-key"),
                value,
            },
            None => ApiAuth::None,
        };
        Self {
            fetcher: RetryingFetcher::for_source(SourceId::EconomicIndicator, client),
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

    async fn series(
        &self,
        series: &str,
        params: &FetchParams,
        mock: fn(&FetchParams) -> serde_json::Value,
    ) -> Result<serde_json::Value, SourceError> {
        if self.fetcher.client().is_mock() {
            return Ok(mock(params));
        }

        let mut url = format!(
            "{}/series/{series}?region={}",
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
                Err(SourceError::unavailable(SourceId::EconomicIndicator, message))
            }
        }
    }
}

fn series_year(params: &FetchParams) -> i32 {
    params.year.unwrap_or_else(|| UtcDateTime::now().year() - 1)
}

fn mock_earnings(params: &FetchParams) -> serde_json::Value {
    serde_json::json!({
        "year": series_year(params),
        "median_earnings": 64_800.0,
        "mean_earnings": 66_500.0,
        "earnings_p25": 52_500.0,
        "earnings_p75": 81_500.0,
        "observations": 300,
    })
}

fn mock_price_parity(params: &FetchParams) -> serde_json::Value {
    serde_json::json!({
        "year": series_year(params),
        "all_items": 99.1,
        "housing": 96.8,
        "transportation": 100.6,
        "food": 98.7,
        "healthcare": 101.4,
        "utilities": 98.0,
    })
}

impl SalarySource for EconomicIndicatorAdapter {
    fn id(&self) -> SourceId {
        SourceId::EconomicIndicator
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
            let raw = self.series("regional-earnings", params, mock_earnings).await?;
            let payload: EarningsPayload = serde_json::from_value(raw).map_err(|error| {
                SourceError::payload(SourceId::EconomicIndicator, error.to_string())
            })?;

            let figures = SalaryFigures {
                median: payload.median_earnings,
                mean: payload.mean_earnings,
                percentile_25: payload.earnings_p25,
                percentile_75: payload.earnings_p75,
                percentile_90: None,
                sample_size: payload.observations,
            };
            Ok(SalaryDataPoint::new(
                SourceId::EconomicIndicator,
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
            let raw = self
                .series("regional-price-parity", params, mock_price_parity)
                .await?;
            let payload: PriceParityPayload = serde_json::from_value(raw).map_err(|error| {
                SourceError::payload(SourceId::EconomicIndicator, error.to_string())
            })?;

            let indices = CostIndices {
                overall: payload.all_items,
                housing: payload.housing,
                transportation: payload.transportation,
                food: payload.food,
                healthcare: payload.healthcare,
                utilities: payload.utilities,
            };
            Ok(CostOfLivingDataPoint::new(
                SourceId::EconomicIndicator,
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
                id: SourceId::EconomicIndicator,
                category: "job-market",
            })
        })
    }

    fn health(&self) -> SourceHealth {
        SourceHealth {
            source: SourceId::EconomicIndicator,
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
    async fn mock_earnings_become_a_salary_point() {
        let adapter = EconomicIndicatorAdapter::mock();
        let point = adapter.fetch_salary(&params()).await.expect("salary point");

        assert_eq!(point.source, SourceId::EconomicIndicator);
        assert_eq!(point.figures.median, Some(64_800.0));
        assert_eq!(
            point.confidence_score,
            SourceId::EconomicIndicator.reliability()
        );
    }

    #[tokio::test]
    async fn mock_price_parity_becomes_cost_indices() {
        let adapter = EconomicIndicatorAdapter::mock();
        let point = adapter
            .fetch_cost_of_living(&params())
            .await
            .expect("cost point");

        assert_eq!(point.indices.overall, Some(99.1));
        assert_eq!(point.indices.present().len(), 6);
    }
}
