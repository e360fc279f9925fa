//! One logical fetch against a named source: rate-limit gate, per-attempt
//! timeout, and retry with backoff.
//!
//! `RetryingFetcher::fetch` never fails at the type level — every outcome,
//! including exhausted retries, comes back as a [`FetchResponse`] value so
//! callers above it can degrade instead of propagating errors.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::circuit::SourceBreaker;
use crate::http::{HttpClient, HttpRequest};
use crate::rate_limit::SlidingWindowLimiter;
use crate::retry::RetryPolicy;
use crate::SourceId;

/// Bound on consecutive rate-limiter denials inside one fetch.
const MAX_RATE_WAITS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Circuit breaker is open; no request was sent.
    CircuitOpen,
    /// Rate budget never became available.
    RateLimited,
    /// 2xx response with a malformed body. Not retried.
    Parse,
    /// 4xx other than 429. Not retried.
    ClientError,
    /// Transport failure that is not worth retrying.
    Transport,
    /// Retry budget exhausted on transient failures.
    RetriesExhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

/// Value-level outcome of one logical fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<FetchError>,
    pub status_code: Option<u16>,
    pub rate_limit_remaining: Option<u32>,
}

impl FetchResponse {
    fn completed(data: serde_json::Value, status: u16, rate_limit_remaining: Option<u32>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status_code: Some(status),
            rate_limit_remaining,
        }
    }

    fn failed(kind: FetchErrorKind, message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(FetchError {
                kind,
                message: message.into(),
            }),
            status_code: status,
            rate_limit_remaining: None,
        }
    }
}

/// Issues one logical request to a source with rate-limit-aware waiting,
/// per-attempt timeouts, and bounded retry-with-backoff.
pub struct RetryingFetcher {
    source: SourceId,
    client: Arc<dyn HttpClient>,
    limiter: SlidingWindowLimiter,
    breaker: SourceBreaker,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(
        source: SourceId,
        client: Arc<dyn HttpClient>,
        limiter: SlidingWindowLimiter,
        breaker: SourceBreaker,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            client,
            limiter,
            breaker,
            policy,
        }
    }

    pub fn for_source(source: SourceId, client: Arc<dyn HttpClient>) -> Self {
        Self::new(
            source,
            client,
            SlidingWindowLimiter::for_source(source),
            SourceBreaker::default(),
            RetryPolicy::default(),
        )
    }

    pub fn client(&self) -> &Arc<dyn HttpClient> {
        &self.client
    }

    pub fn limiter(&self) -> &SlidingWindowLimiter {
        &self.limiter
    }

    pub fn breaker(&self) -> &SourceBreaker {
        &self.breaker
    }

    pub async fn fetch(&self, request: HttpRequest) -> FetchResponse {
        if !self.breaker.call_permitted() {
            return FetchResponse::failed(
                FetchErrorKind::CircuitOpen,
                format!("{} circuit breaker is open", self.source),
                None,
            );
        }

        let mut last_status = None;

        for attempt in 0..=self.policy.max_retries {
            if !self.wait_for_rate_budget().await {
                return FetchResponse::failed(
                    FetchErrorKind::RateLimited,
                    format!("{} rate budget did not free up", self.source),
                    None,
                );
            }

            let attempt_request = request.clone().with_timeout(self.policy.request_timeout);
            let outcome =
                tokio::time::timeout(self.policy.request_timeout, self.client.execute(attempt_request))
                    .await;

            match outcome {
                Err(_elapsed) => {
                    self.breaker.record(false);
                    debug!(source = %self.source, attempt, "request timed out");
                    self.backoff(attempt).await;
                }
                Ok(Err(error)) => {
                    self.breaker.record(false);
                    if !error.retryable() {
                        return FetchResponse::failed(
                            FetchErrorKind::Transport,
                            error.message().to_owned(),
                            None,
                        );
                    }
                    debug!(source = %self.source, attempt, error = error.message(), "transport error");
                    self.backoff(attempt).await;
                }
                Ok(Ok(response)) => {
                    last_status = Some(response.status);

                    if response.is_success() {
                        // Upstream answered; a bad body is a contract problem,
                        // not an availability problem.
                        self.breaker.record(true);
                        return match serde_json::from_str(&response.body) {
                            Ok(data) => FetchResponse::completed(
                                data,
                                response.status,
                                response.rate_limit_remaining,
                            ),
                            Err(error) => FetchResponse::failed(
                                FetchErrorKind::Parse,
                                format!("parse error: {error}"),
                                Some(response.status),
                            ),
                        };
                    }

                    if response.status == 429 {
                        let wait = response
                            .retry_after
                            .map(Duration::from_secs)
                            .unwrap_or(self.policy.retry_after_default);
                        debug!(source = %self.source, attempt, wait_s = wait.as_secs(), "throttled upstream");
                        tokio::time::sleep(wait).await;
                        continue;
                    }

                    if RetryPolicy::is_client_error(response.status) {
                        return FetchResponse::failed(
                            FetchErrorKind::ClientError,
                            format!("{} returned status {}", self.source, response.status),
                            Some(response.status),
                        );
                    }

                    // 5xx and anything else unexpected: transient.
                    self.breaker.record(false);
                    debug!(source = %self.source, attempt, status = response.status, "server error");
                    self.backoff(attempt).await;
                }
            }
        }

        FetchResponse::failed(FetchErrorKind::RetriesExhausted, "max retries exceeded", last_status)
    }

    async fn wait_for_rate_budget(&self) -> bool {
        for _ in 0..MAX_RATE_WAITS {
            if self.limiter.acquire() {
                return true;
            }
            let wait = self.limiter.wait_time() + self.policy.rate_limit_buffer;
            debug!(source = %self.source, wait_ms = wait.as_millis() as u64, "waiting for rate budget");
            tokio::time::sleep(wait).await;
        }
        false
    }

    async fn backoff(&self, attempt: u32) {
        if attempt < self.policy.max_retries {
            tokio::time::sleep(self.policy.delay_for_attempt(attempt)).await;
        }
    }
}
