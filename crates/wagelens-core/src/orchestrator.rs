//! Cache-first aggregation across all configured sources.
//!
//! One request fans out concurrently to every capable source, validates and
//! merges whatever comes back, derives recommendations, and caches the
//! result. A total live-source outage degrades to the static baseline table
//! instead of failing.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::adapters::{
    CensusAdapter, EconomicIndicatorAdapter, FetchParams, JobBoardAdapter, SalarySource,
    SourceError, SourceHealth, WageSurveyAdapter,
};
use crate::cache::{CacheManager, CacheStats, CacheStrategy, DataCategory, MemoryStore};
use crate::confidence::ConfidenceScorer;
use crate::config::CoreConfig;
use crate::domain::{
    ComprehensiveSalaryData, CostOfLivingDataPoint, JobMarketDataPoint, SalaryDataPoint,
    UtcDateTime,
};
use crate::error::CoreError;
use crate::fallback;
use crate::http::ReqwestHttpClient;
use crate::persistence::{BenchmarkSink, NoopSink};
use crate::validation::DataValidator;
use crate::SourceId;

const COMPREHENSIVE_DATA_TYPE: &str = "comprehensive";

/// Thresholds the recommendation pass works from.
const HIGH_DEMAND_SCORE: f64 = 80.0;
const WIDE_SPREAD_RATIO: f64 = 0.5;
const HIGH_COST_INDEX: f64 = 120.0;
const LOW_COST_INDEX: f64 = 90.0;
const LOW_CONFIDENCE: f64 = 0.5;

enum FanoutOutcome {
    Salary(SourceId, Result<SalaryDataPoint, SourceError>),
    CostOfLiving(SourceId, Result<CostOfLivingDataPoint, SourceError>),
    JobMarket(SourceId, Result<JobMarketDataPoint, SourceError>),
}

pub struct Orchestrator {
    sources: Vec<Arc<dyn SalarySource>>,
    validator: DataValidator,
    scorer: ConfidenceScorer,
    cache: CacheManager,
    sink: Arc<dyn BenchmarkSink>,
    fetch_deadline: Duration,
}

pub struct OrchestratorBuilder {
    sources: Vec<Arc<dyn SalarySource>>,
    validator: DataValidator,
    cache: Option<CacheManager>,
    sink: Arc<dyn BenchmarkSink>,
    fetch_deadline: Duration,
}

impl OrchestratorBuilder {
    pub fn with_source(mut self, source: Arc<dyn SalarySource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_validator(mut self, validator: DataValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn BenchmarkSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_fetch_deadline(mut self, deadline: Duration) -> Self {
        self.fetch_deadline = deadline;
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            sources: self.sources,
            validator: self.validator,
            scorer: ConfidenceScorer,
            cache: self
                .cache
                .unwrap_or_else(|| CacheManager::in_memory(CacheStrategy::default())),
            sink: self.sink,
            fetch_deadline: self.fetch_deadline,
        }
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder {
            sources: Vec::new(),
            validator: DataValidator::default(),
            cache: None,
            sink: Arc::new(NoopSink),
            fetch_deadline: Duration::from_secs(30),
        }
    }

    /// Wire up the standard four sources from configuration. A source with an
    /// API key gets a live HTTP transport; the rest serve offline mock data.
    pub fn from_config(config: &CoreConfig) -> Self {
        let keys = &config.api_keys;

        fn keyed<A>(key: Option<&str>, live: impl FnOnce(String) -> A, mock: impl FnOnce() -> A) -> A {
            match key {
                Some(key) => live(key.to_owned()),
                None => mock(),
            }
        }

        let wage_survey = keyed(
            keys.for_source(SourceId::WageSurvey),
            |key| WageSurveyAdapter::new(Arc::new(ReqwestHttpClient::new()), Some(key)),
            WageSurveyAdapter::mock,
        );
        let census = keyed(
            keys.for_source(SourceId::Census),
            |key| CensusAdapter::new(Arc::new(ReqwestHttpClient::new()), Some(key)),
            CensusAdapter::mock,
        );
        let economic = keyed(
            keys.for_source(SourceId::EconomicIndicator),
            |key| EconomicIndicatorAdapter::new(Arc::new(ReqwestHttpClient::new()), Some(key)),
            EconomicIndicatorAdapter::mock,
        );
        let job_board = keyed(
            keys.for_source(SourceId::JobBoard),
            |key| JobBoardAdapter::new(Arc::new(ReqwestHttpClient::new()), Some(key)),
            JobBoardAdapter::mock,
        );

        Self::builder()
            .with_source(Arc::new(wage_survey))
            .with_source(Arc::new(census))
            .with_source(Arc::new(economic))
            .with_source(Arc::new(job_board))
            .with_cache(CacheManager::new(
                Arc::new(MemoryStore::new()),
                config.cache_strategy,
                config.cache_namespace.clone(),
            ))
            .with_fetch_deadline(config.fetch_deadline)
            .build()
    }

    /// Cache-first aggregation for one (location, occupation) pair.
    pub async fn get_comprehensive_salary_data(
        &self,
        params: &FetchParams,
    ) -> Result<ComprehensiveSalaryData, CoreError> {
        let key = self.comprehensive_key(params);
        if let Some(cached) = self.cache.get_json::<ComprehensiveSalaryData>(&key).await {
            debug!(%key, "serving comprehensive data from cache");
            return Ok(cached);
        }
        self.aggregate_and_store(params, &key).await
    }

    /// Bypass the cache read, re-aggregate, and overwrite the cached entry.
    pub async fn refresh_comprehensive_salary_data(
        &self,
        params: &FetchParams,
    ) -> Result<ComprehensiveSalaryData, CoreError> {
        let key = self.comprehensive_key(params);
        self.aggregate_and_store(params, &key).await
    }

    /// Drop every cached entry for a location. Returns removed entry count.
    pub async fn invalidate_location(&self, params: &FetchParams) -> usize {
        self.cache
            .clear(&format!("{}:*", params.location.cache_token()))
            .await
    }

    pub fn source_snapshots(&self) -> Vec<SourceHealth> {
        self.sources.iter().map(|source| source.health()).collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn comprehensive_key(&self, params: &FetchParams) -> String {
        self.cache.key(
            &params.location,
            COMPREHENSIVE_DATA_TYPE,
            params.occupation.as_ref(),
            None,
            params.year,
        )
    }

    async fn aggregate_and_store(
        &self,
        params: &FetchParams,
        key: &str,
    ) -> Result<ComprehensiveSalaryData, CoreError> {
        let data = self.aggregate(params).await?;

        if let Err(error) = self.cache.set_json(key, &data, DataCategory::Salary).await {
            warn!(%key, %error, "failed to cache comprehensive data");
        }
        self.persist(&data).await;

        Ok(data)
    }

    async fn aggregate(&self, params: &FetchParams) -> Result<ComprehensiveSalaryData, CoreError> {
        let mut join_set: JoinSet<FanoutOutcome> = JoinSet::new();
        let deadline = self.fetch_deadline;

        for source in &self.sources {
            let capabilities = source.capabilities();
            if capabilities.salary {
                let source = Arc::clone(source);
                let params = params.clone();
                join_set.spawn(async move {
                    let id = source.id();
                    let result = with_deadline(deadline, id, source.fetch_salary(&params)).await;
                    FanoutOutcome::Salary(id, result)
                });
            }
            if capabilities.cost_of_living {
                let source = Arc::clone(source);
                let params = params.clone();
                join_set.spawn(async move {
                    let id = source.id();
                    let result =
                        with_deadline(deadline, id, source.fetch_cost_of_living(&params)).await;
                    FanoutOutcome::CostOfLiving(id, result)
                });
            }
            if capabilities.job_market {
                let source = Arc::clone(source);
                let params = params.clone();
                join_set.spawn(async move {
                    let id = source.id();
                    let result = with_deadline(deadline, id, source.fetch_job_market(&params)).await;
                    FanoutOutcome::JobMarket(id, result)
                });
            }
        }

        let mut salary_points = Vec::new();
        let mut cost_candidates: Vec<CostOfLivingDataPoint> = Vec::new();
        let mut market_candidates: Vec<JobMarketDataPoint> = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(%error, "fan-out task panicked");
                    continue;
                }
            };

            // Points that fail validation are kept, not discarded: their
            // penalized confidence already marginalizes them in the merge,
            // and a suspect answer still beats the static baseline.
            match outcome {
                FanoutOutcome::Salary(id, Ok(point)) => {
                    let validation = self.validator.validate_salary(&point);
                    if !validation.is_valid {
                        warn!(source = %id, issues = ?validation.issues, "salary point failed validation");
                    }
                    salary_points.push(point.with_validation(validation));
                }
                FanoutOutcome::CostOfLiving(id, Ok(point)) => {
                    let validation = self.validator.validate_cost_of_living(&point);
                    if !validation.is_valid {
                        warn!(source = %id, issues = ?validation.issues, "cost-of-living point failed validation");
                    }
                    cost_candidates.push(point.with_validation(validation));
                }
                FanoutOutcome::JobMarket(id, Ok(point)) => {
                    let validation = self.validator.validate_job_market(&point);
                    if !validation.is_valid {
                        warn!(source = %id, issues = ?validation.issues, "job-market point failed validation");
                    }
                    market_candidates.push(point.with_validation(validation));
                }
                FanoutOutcome::Salary(id, Err(error))
                | FanoutOutcome::CostOfLiving(id, Err(error))
                | FanoutOutcome::JobMarket(id, Err(error)) => {
                    warn!(source = %id, %error, "source fetch failed");
                }
            }
        }

        // Deterministic merge order regardless of task completion order.
        salary_points.sort_by(|a, b| {
            b.source
                .reliability()
                .partial_cmp(&a.source.reliability())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        // Valid candidates win over suspect ones; reliability breaks ties.
        let cost_of_living = cost_candidates.into_iter().max_by(|a, b| {
            let rank = |p: &CostOfLivingDataPoint| {
                (
                    p.validation.as_ref().is_some_and(|v| v.is_valid),
                    p.source.reliability(),
                )
            };
            rank(a)
                .partial_cmp(&rank(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let job_market = market_candidates.into_iter().max_by(|a, b| {
            let rank = |p: &JobMarketDataPoint| {
                (
                    p.validation.as_ref().is_some_and(|v| v.is_valid),
                    p.source.reliability(),
                )
            };
            rank(a)
                .partial_cmp(&rank(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut used_fallback = false;
        let (salary_points, cost_of_living, job_market) =
            if salary_points.is_empty() && cost_of_living.is_none() && job_market.is_none() {
                info!(location = %params.location, "all live sources failed, using baseline data");
                used_fallback = true;
                let bundle = fallback::baseline_bundle(&params.location, params.occupation.as_ref())?;
                (
                    vec![bundle.salary],
                    Some(bundle.cost_of_living),
                    Some(bundle.job_market),
                )
            } else {
                (salary_points, cost_of_living, job_market)
            };

        let merged = self
            .scorer
            .merge(&salary_points, cost_of_living.as_ref(), job_market.as_ref());

        let recommendations = build_recommendations(
            &salary_points,
            cost_of_living.as_ref(),
            job_market.as_ref(),
            merged.overall_confidence_score,
            used_fallback,
        );

        info!(
            location = %params.location,
            sources = salary_points.len(),
            confidence = merged.overall_confidence_score,
            "aggregated comprehensive salary data"
        );

        Ok(ComprehensiveSalaryData {
            location: params.location.clone(),
            occupation: params.occupation.clone(),
            salary_data: salary_points,
            cost_of_living,
            job_market,
            overall_confidence_score: merged.overall_confidence_score,
            data_quality_score: merged.data_quality_score,
            recommendations,
            last_updated: UtcDateTime::now(),
        })
    }

    async fn persist(&self, data: &ComprehensiveSalaryData) {
        for point in &data.salary_data {
            if let Err(error) = self.sink.save_salary_benchmark(point).await {
                warn!(source = %point.source, %error, "failed to persist salary benchmark");
            }
        }
        if let Some(point) = &data.cost_of_living {
            if let Err(error) = self.sink.save_cost_of_living(point).await {
                warn!(%error, "failed to persist cost-of-living point");
            }
        }
        if let Some(point) = &data.job_market {
            if let Err(error) = self.sink.save_job_market(point).await {
                warn!(%error, "failed to persist job-market point");
            }
        }
        if let Err(error) = self
            .sink
            .save_confidence_score(
                data.location.as_str(),
                data.occupation.as_ref().map(|o| o.as_str()),
                data.overall_confidence_score,
            )
            .await
        {
            warn!(%error, "failed to persist confidence score");
        }
    }
}

async fn with_deadline<T>(
    deadline: Duration,
    source: SourceId,
    future: impl std::future::Future<Output = Result<T, SourceError>>,
) -> Result<T, SourceError> {
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_elapsed) => Err(SourceError::unavailable(source, "fetch deadline exceeded")),
    }
}

fn build_recommendations(
    salary_points: &[SalaryDataPoint],
    cost_of_living: Option<&CostOfLivingDataPoint>,
    job_market: Option<&JobMarketDataPoint>,
    overall_confidence: f64,
    used_fallback: bool,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if used_fallback {
        recommendations.push(String::from(
            "Live sources were unavailable; figures are static regional baselines.",
        ));
    }

    if let Some(demand) = job_market.and_then(|p| p.figures.demand_score) {
        if demand > HIGH_DEMAND_SCORE {
            recommendations.push(format!(
                "Labor demand is high (score {demand:.0}); candidates are well positioned to negotiate."
            ));
        }
    }

    let best_spread = salary_points
        .iter()
        .max_by(|a, b| {
            a.confidence_score
                .partial_cmp(&b.confidence_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .and_then(SalaryDataPoint::spread_ratio);
    if let Some(spread) = best_spread {
        if spread > WIDE_SPREAD_RATIO {
            recommendations.push(format!(
                "Salary spread is wide (p25-p75 is {:.0}% of the median); compensation varies heavily by employer and experience.",
                spread * 100.0
            ));
        }
    }

    if let Some(overall) = cost_of_living.and_then(|p| p.indices.overall) {
        if overall > HIGH_COST_INDEX {
            recommendations.push(format!(
                "Cost of living is well above the national baseline (index {overall:.0}); weigh offers against local prices."
            ));
        } else if overall < LOW_COST_INDEX {
            recommendations.push(format!(
                "Cost of living is below the national baseline (index {overall:.0}); nominal salaries stretch further here."
            ));
        }
    }

    if overall_confidence < LOW_CONFIDENCE {
        recommendations.push(String::from(
            "Confidence in this result is low; treat the figures as indicative only.",
        ));
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BoxFuture, SourceCapabilities};
    use crate::circuit::BreakerState;
    use crate::domain::{Location, SalaryFigures};

    struct FailingSource {
        id: SourceId,
    }

    /// Serves figures that parse fine but fail every sanity check.
    struct SuspectSource;

    impl SalarySource for SuspectSource {
        fn id(&self) -> SourceId {
            SourceId::WageSurvey
        }

        fn capabilities(&self) -> SourceCapabilities {
            SourceCapabilities {
                salary: true,
                cost_of_living: false,
                job_market: false,
            }
        }

        fn fetch_salary<'a>(
            &'a self,
            params: &'a FetchParams,
        ) -> BoxFuture<'a, Result<SalaryDataPoint, SourceError>> {
            Box::pin(async move {
                Ok(SalaryDataPoint::new(
                    SourceId::WageSurvey,
                    params.location.clone(),
                    None,
                    SalaryFigures {
                        median: Some(5_000.0),
                        mean: Some(16_000.0),
                        percentile_25: Some(4_000.0),
                        percentile_75: Some(6_500.0),
                        percentile_90: None,
                        sample_size: Some(4),
                    },
                    2026,
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
                breaker: BreakerState::Closed,
                has_rate_budget: true,
            }
        }
    }

    impl SalarySource for FailingSource {
        fn id(&self) -> SourceId {
            self.id
        }

        fn capabilities(&self) -> SourceCapabilities {
            SourceCapabilities {
                salary: true,
                cost_of_living: true,
                job_market: true,
            }
        }

        fn fetch_salary<'a>(
            &'a self,
            _params: &'a FetchParams,
        ) -> BoxFuture<'a, Result<SalaryDataPoint, SourceError>> {
            Box::pin(async move { Err(SourceError::unavailable(self.id, "outage")) })
        }

        fn fetch_cost_of_living<'a>(
            &'a self,
            _params: &'a FetchParams,
        ) -> BoxFuture<'a, Result<CostOfLivingDataPoint, SourceError>> {
            Box::pin(async move { Err(SourceError::unavailable(self.id, "outage")) })
        }

        fn fetch_job_market<'a>(
            &'a self,
            _params: &'a FetchParams,
        ) -> BoxFuture<'a, Result<JobMarketDataPoint, SourceError>> {
            Box::pin(async move { Err(SourceError::unavailable(self.id, "outage")) })
        }

        fn health(&self) -> SourceHealth {
            SourceHealth {
                source: self.id,
                breaker: BreakerState::Closed,
                has_rate_budget: true,
            }
        }
    }

    fn mock_orchestrator() -> Orchestrator {
        Orchestrator::from_config(&CoreConfig::default())
    }

    fn params() -> FetchParams {
        FetchParams::new(Location::parse("Atlanta").expect("valid"))
    }

    #[tokio::test]
    async fn aggregates_all_four_sources() {
        let orchestrator = mock_orchestrator();
        let data = orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("aggregation succeeds");

        assert_eq!(data.salary_data.len(), 4);
        assert_eq!(
            data.cost_of_living.as_ref().map(|p| p.source),
            Some(SourceId::Census)
        );
        assert_eq!(
            data.job_market.as_ref().map(|p| p.source),
            Some(SourceId::JobBoard)
        );
        assert!((data.overall_confidence_score - 0.81).abs() < 0.02);
    }

    #[tokio::test]
    async fn salary_points_arrive_most_reliable_first() {
        let orchestrator = mock_orchestrator();
        let data = orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("aggregation succeeds");

        let sources: Vec<SourceId> = data.salary_data.iter().map(|p| p.source).collect();
        assert_eq!(
            sources,
            vec![
                SourceId::WageSurvey,
                SourceId::Census,
                SourceId::EconomicIndicator,
                SourceId::JobBoard
            ]
        );
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let orchestrator = mock_orchestrator();
        let first = orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("first aggregation");
        let second = orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("second aggregation");

        assert_eq!(first, second);
        let stats = orchestrator.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn refresh_bypasses_the_cache_read() {
        let orchestrator = mock_orchestrator();
        orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("seed the cache");

        orchestrator
            .refresh_comprehensive_salary_data(&params())
            .await
            .expect("refresh");

        // Refresh never reads, so hit/miss counters are untouched.
        let stats = orchestrator.cache_stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn suspect_data_is_kept_with_penalized_confidence() {
        let orchestrator = Orchestrator::builder()
            .with_source(Arc::new(SuspectSource))
            .with_validator(DataValidator::default().with_current_year(2026))
            .build();

        let data = orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("aggregation succeeds");

        // The implausible point survives with is_valid=false instead of
        // being replaced by baseline data.
        assert_eq!(data.salary_data.len(), 1);
        assert_eq!(data.salary_data[0].source, SourceId::WageSurvey);
        let validation = data.salary_data[0].validation.as_ref().expect("validated");
        assert!(!validation.is_valid);
        assert!(!validation.issues.is_empty());

        // 0.9 reliability prior discounted by the 0.2 validation score.
        assert!((data.salary_data[0].confidence_score - 0.18).abs() < 1e-9);
        assert!((data.overall_confidence_score - 0.18).abs() < 1e-9);
        assert!(data
            .recommendations
            .iter()
            .any(|r| r.contains("Confidence in this result is low")));
        assert!(!data
            .recommendations
            .iter()
            .any(|r| r.contains("static regional baselines")));
    }

    #[test]
    fn configured_namespace_prefixes_cache_keys() {
        let config = CoreConfig {
            cache_namespace: String::from("staging"),
            ..CoreConfig::default()
        };
        let orchestrator = Orchestrator::from_config(&config);

        let key = orchestrator.comprehensive_key(&params());
        assert!(key.starts_with("staging:atlanta:"), "{key}");
    }

    #[tokio::test]
    async fn total_outage_degrades_to_baseline_data() {
        let orchestrator = Orchestrator::builder()
            .with_source(Arc::new(FailingSource {
                id: SourceId::WageSurvey,
            }))
            .with_source(Arc::new(FailingSource {
                id: SourceId::Census,
            }))
            .build();

        let data = orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("fallback data");

        assert_eq!(data.salary_data.len(), 1);
        assert_eq!(data.salary_data[0].source, SourceId::Fallback);
        assert!((data.overall_confidence_score - 0.3).abs() < 1e-9);
        assert!(data
            .recommendations
            .iter()
            .any(|r| r.contains("static regional baselines")));
        assert!(data
            .recommendations
            .iter()
            .any(|r| r.contains("Confidence in this result is low")));
    }

    #[tokio::test]
    async fn high_demand_triggers_a_negotiation_recommendation() {
        let orchestrator = mock_orchestrator();
        let data = orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("aggregation succeeds");

        assert!(data
            .recommendations
            .iter()
            .any(|r| r.contains("well positioned to negotiate")));
    }

    #[tokio::test]
    async fn invalidate_location_clears_cached_entries() {
        let orchestrator = mock_orchestrator();
        orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("seed the cache");

        assert_eq!(orchestrator.invalidate_location(&params()).await, 1);

        orchestrator
            .get_comprehensive_salary_data(&params())
            .await
            .expect("re-aggregates after invalidation");
        assert_eq!(orchestrator.cache_stats().misses, 2);
    }

    #[tokio::test]
    async fn source_snapshots_cover_every_source() {
        let orchestrator = mock_orchestrator();
        let snapshots = orchestrator.source_snapshots();
        assert_eq!(snapshots.len(), 4);
        assert!(snapshots.iter().all(|s| s.breaker == BreakerState::Closed));
        assert!(snapshots.iter().all(|s| s.has_rate_budget));
    }
}
