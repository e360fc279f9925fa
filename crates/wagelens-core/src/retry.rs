//! Retry policy with exponential backoff and jitter.

use std::time::Duration;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Fixed delay between retries.
    Fixed { delay: Duration },
    /// `base * factor^attempt`, capped at `max`, with optional +/- 50% jitter.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt as i32);
                let seconds = base.as_secs_f64() * scale;
                let capped = seconds.min(max.as_secs_f64());
                let mut delay = Duration::from_secs_f64(capped);

                if jitter {
                    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let offset = fastrand::u64(0..=(jitter_ms * 2));
                    let total_ms = delay.as_millis() as i64 + (offset as i64 - jitter_ms as i64);
                    delay = Duration::from_millis(total_ms.max(0) as u64);
                }

                delay
            }
        }
    }
}

/// Retry behavior for one logical fetch against a source.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum retries; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    /// Per-attempt request timeout.
    pub request_timeout: Duration,
    /// Sleep applied for HTTP 429 when no Retry-After header is present.
    pub retry_after_default: Duration,
    /// Extra sleep added on top of the rate limiter's reported wait.
    pub rate_limit_buffer: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
            request_timeout: Duration::from_secs(10),
            retry_after_default: Duration::from_secs(60),
            rate_limit_buffer: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Policy with no sleeps, for deterministic tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed {
                delay: Duration::ZERO,
            },
            request_timeout: Duration::from_secs(1),
            retry_after_default: Duration::ZERO,
            rate_limit_buffer: Duration::ZERO,
        }
    }

    /// Whether a status code is a transient server-side failure worth
    /// retrying. 429 is handled separately through Retry-After.
    pub const fn is_retryable_status(status: u16) -> bool {
        status >= 500 && status < 600
    }

    /// 4xx other than 429: a client-side contract violation, never retried.
    pub const fn is_client_error(status: u16) -> bool {
        status >= 400 && status < 500 && status != 429
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
