//! Environment-driven configuration.

use std::time::Duration;

use tracing::warn;

use crate::cache::CacheStrategy;
use crate::SourceId;

const DEFAULT_NAMESPACE: &str = "wagelens";
const DEFAULT_FETCH_DEADLINE: Duration = Duration::from_secs(30);

/// API credentials for the live sources. Any of them may be absent; an
/// adapter without a key runs unauthenticated against its free tier.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub wage_survey: Option<String>,
    pub census: Option<String>,
    pub economic_indicator: Option<String>,
    pub job_board: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        Self {
            wage_survey: env_key("WAGE_SURVEY_API_KEY"),
            census: env_key("CENSUS_API_KEY"),
            economic_indicator: env_key("ECONOMIC_INDICATOR_API_KEY"),
            job_board: env_key("JOB_BOARD_API_KEY"),
        }
    }

    pub fn for_source(&self, source: SourceId) -> Option<&str> {
        match source {
            SourceId::WageSurvey => self.wage_survey.as_deref(),
            SourceId::Census => self.census.as_deref(),
            SourceId::EconomicIndicator => self.economic_indicator.as_deref(),
            SourceId::JobBoard => self.job_board.as_deref(),
            SourceId::Fallback => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub api_keys: ApiKeys,
    pub cache_strategy: CacheStrategy,
    pub cache_namespace: String,
    /// Upper bound on one full aggregation fan-out.
    pub fetch_deadline: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_keys: ApiKeys::default(),
            cache_strategy: CacheStrategy::default(),
            cache_namespace: String::from(DEFAULT_NAMESPACE),
            fetch_deadline: DEFAULT_FETCH_DEADLINE,
        }
    }
}

impl CoreConfig {
    /// Read configuration from `WAGELENS_*` variables, falling back to the
    /// unprefixed names for the API keys. Malformed values are logged and
    /// replaced with defaults.
    pub fn from_env() -> Self {
        let cache_strategy = match env_key("CACHE_STRATEGY") {
            Some(raw) => raw.parse().unwrap_or_else(|error| {
                warn!(%error, "ignoring invalid cache strategy");
                CacheStrategy::default()
            }),
            None => CacheStrategy::default(),
        };

        let fetch_deadline = match env_key("FETCH_DEADLINE_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "ignoring invalid fetch deadline");
                    DEFAULT_FETCH_DEADLINE
                }
            },
            None => DEFAULT_FETCH_DEADLINE,
        };

        Self {
            api_keys: ApiKeys::from_env(),
            cache_strategy,
            cache_namespace: env_key("CACHE_NAMESPACE")
                .unwrap_or_else(|| String::from(DEFAULT_NAMESPACE)),
            fetch_deadline,
        }
    }

    pub fn with_cache_strategy(mut self, strategy: CacheStrategy) -> Self {
        self.cache_strategy = strategy;
        self
    }
}

/// `WAGELENS_<NAME>` first, then the bare name. Blank values count as unset.
fn env_key(name: &str) -> Option<String> {
    std::env::var(format!("WAGELENS_{name}"))
        .or_else(|_| std::env::var(name))
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_standard_tier() {
        let config = CoreConfig::default();
        assert_eq!(config.cache_strategy, CacheStrategy::Standard);
        assert_eq!(config.cache_namespace, "wagelens");
        assert_eq!(config.fetch_deadline, Duration::from_secs(30));
        assert!(config.api_keys.for_source(SourceId::Census).is_none());
    }

    #[test]
    fn fallback_never_has_a_key() {
        let keys = ApiKeys {
            wage_survey: Some(String::from("k")),
            ..ApiKeys::default()
        };
        assert_eq!(keys.for_source(SourceId::WageSurvey), Some("k"));
        assert_eq!(keys.for_source(SourceId::Fallback), None);
    }
}
