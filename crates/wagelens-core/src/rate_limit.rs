//! Per-source sliding-window call budgets.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::SourceId;

const MINUTE_WINDOW: Duration = Duration::from_secs(60);
const HOUR_WINDOW: Duration = Duration::from_secs(3_600);

/// Per-minute and per-hour call limits for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLimits {
    pub per_minute: u32,
    pub per_hour: u32,
}

impl SourceLimits {
    pub const fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            per_minute,
            per_hour,
        }
    }

    /// Free-tier defaults observed for each provider.
    pub const fn default_for(source: SourceId) -> Self {
        match source {
            SourceId::WageSurvey => Self::new(25, 500),
            SourceId::Census => Self::new(60, 1_000),
            SourceId::EconomicIndicator => Self::new(30, 600),
            SourceId::JobBoard => Self::new(10, 200),
            SourceId::Fallback => Self::new(u32::MAX, u32::MAX),
        }
    }
}

#[derive(Debug)]
struct Windows {
    minute: VecDeque<Instant>,
    hour: VecDeque<Instant>,
}

/// Sliding-window rate limiter with a 60 s and a 3600 s window.
///
/// A call is allowed only when both window counts are under their limits; the
/// timestamp is recorded only on success, so denials have no side effects.
/// Pruning and appending happen inside one critical section, making the
/// limiter safe to share across concurrent callers of the same source.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    limits: SourceLimits,
    windows: Mutex<Windows>,
}

impl SlidingWindowLimiter {
    pub fn new(limits: SourceLimits) -> Self {
        Self {
            limits,
            windows: Mutex::new(Windows {
                minute: VecDeque::new(),
                hour: VecDeque::new(),
            }),
        }
    }

    pub fn for_source(source: SourceId) -> Self {
        Self::new(SourceLimits::default_for(source))
    }

    /// Try to spend one unit of rate budget.
    pub fn acquire(&self) -> bool {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .expect("rate limiter lock is not poisoned");

        prune(&mut windows.minute, now, MINUTE_WINDOW);
        prune(&mut windows.hour, now, HOUR_WINDOW);

        if windows.minute.len() as u64 >= u64::from(self.limits.per_minute)
            || windows.hour.len() as u64 >= u64::from(self.limits.per_hour)
        {
            return false;
        }

        windows.minute.push_back(now);
        windows.hour.push_back(now);
        true
    }

    /// Time until the next `acquire` could succeed. Zero when budget is
    /// available right now.
    pub fn wait_time(&self) -> Duration {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .expect("rate limiter lock is not poisoned");

        prune(&mut windows.minute, now, MINUTE_WINDOW);
        prune(&mut windows.hour, now, HOUR_WINDOW);

        let minute_wait = window_wait(&windows.minute, self.limits.per_minute, now, MINUTE_WINDOW);
        let hour_wait = window_wait(&windows.hour, self.limits.per_hour, now, HOUR_WINDOW);

        minute_wait.max(hour_wait)
    }

    /// Whether a call would currently be admitted, without spending budget.
    pub fn has_budget(&self) -> bool {
        self.wait_time() == Duration::ZERO
    }
}

fn prune(window: &mut VecDeque<Instant>, now: Instant, span: Duration) {
    while let Some(front) = window.front() {
        if now.duration_since(*front) >= span {
            window.pop_front();
        } else {
            break;
        }
    }
}

fn window_wait(window: &VecDeque<Instant>, limit: u32, now: Instant, span: Duration) -> Duration {
    if (window.len() as u64) < u64::from(limit) {
        return Duration::ZERO;
    }
    // The oldest timestamp leaving the window frees one slot.
    window
        .front()
        .map(|front| span.saturating_sub(now.duration_since(*front)))
        .unwrap_or(Duration::ZERO)
}
