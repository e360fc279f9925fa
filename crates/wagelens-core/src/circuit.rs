//! Per-source circuit breaker.
//!
//! Repeated upstream failures open the circuit so the fetcher stops spending
//! rate budget on a source that is down; after a cool-down one probe request
//! is admitted (half-open) and its outcome decides whether the circuit
//! closes again.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures that trip the circuit.
    pub trip_after: u32,
    /// How long the circuit stays open before admitting a probe.
    pub cool_down: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            trip_after: 3,
            cool_down: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    failure_streak: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct SourceBreaker {
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl Default for SourceBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

impl SourceBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                failure_streak: 0,
                opened_at: None,
            }),
        }
    }

    /// Whether a call may go out right now. An open circuit past its
    /// cool-down transitions to half-open and admits one probe.
    pub fn call_permitted(&self) -> bool {
        let mut inner = self.inner.lock().expect("breaker lock is not poisoned");
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let cooled = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.config.cool_down)
                    .unwrap_or(false);
                if cooled {
                    inner.state = BreakerState::HalfOpen;
                    inner.opened_at = None;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record the outcome of one upstream call.
    pub fn record(&self, success: bool) {
        let mut inner = self.inner.lock().expect("breaker lock is not poisoned");
        if success {
            inner.state = BreakerState::Closed;
            inner.failure_streak = 0;
            inner.opened_at = None;
            return;
        }

        inner.failure_streak = inner.failure_streak.saturating_add(1);
        if inner.state == BreakerState::HalfOpen || inner.failure_streak >= self.config.trip_after {
            inner.state = BreakerState::Open;
            inner.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self) -> BreakerState {
        self.inner
            .lock()
            .expect("breaker lock is not poisoned")
            .state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_after_consecutive_failures() {
        let breaker = SourceBreaker::new(BreakerConfig {
            trip_after: 2,
            cool_down: Duration::from_secs(60),
        });

        breaker.record(false);
        assert_eq!(breaker.state(), BreakerState::Closed);
        breaker.record(false);
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.call_permitted());
    }

    #[test]
    fn success_resets_the_streak() {
        let breaker = SourceBreaker::new(BreakerConfig {
            trip_after: 2,
            cool_down: Duration::from_secs(60),
        });

        breaker.record(false);
        breaker.record(true);
        breaker.record(false);
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn probes_after_cool_down_and_closes_on_success() {
        let breaker = SourceBreaker::new(BreakerConfig {
            trip_after: 1,
            cool_down: Duration::from_millis(1),
        });

        breaker.record(false);
        assert_eq!(breaker.state(), BreakerState::Open);

        std::thread::sleep(Duration::from_millis(2));
        assert!(breaker.call_permitted());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        breaker.record(true);
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn failed_probe_reopens_immediately() {
        let breaker = SourceBreaker::new(BreakerConfig {
            trip_after: 5,
            cool_down: Duration::from_millis(1),
        });

        for _ in 0..5 {
            breaker.record(false);
        }
        std::thread::sleep(Duration::from_millis(2));
        assert!(breaker.call_permitted());

        breaker.record(false);
        assert_eq!(breaker.state(), BreakerState::Open);
    }
}
