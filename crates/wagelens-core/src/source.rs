use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical identifiers for the external data providers.
///
/// `Fallback` marks static baseline data substituted when every live source
/// fails; it never corresponds to a network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    WageSurvey,
    Census,
    EconomicIndicator,
    JobBoard,
    Fallback,
}

impl SourceId {
    /// The four live sources fanned out to by the orchestrator.
    pub const ALL_LIVE: [Self; 4] = [
        Self::WageSurvey,
        Self::Census,
        Self::EconomicIndicator,
        Self::JobBoard,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WageSurvey => "wage_survey",
            Self::Census => "census",
            Self::EconomicIndicator => "economic_indicator",
            Self::JobBoard => "job_board",
            Self::Fallback => "fallback",
        }
    }

    /// Source reliability prior in `[0, 1]`.
    ///
    /// Seeds every data point's confidence score before a validation result
    /// discounts it.
    pub const fn reliability(self) -> f64 {
        match self {
            Self::WageSurvey => 0.9,
            Self::Census => 0.85,
            Self::EconomicIndicator => 0.8,
            Self::JobBoard => 0.7,
            Self::Fallback => 0.3,
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wage_survey" => Ok(Self::WageSurvey),
            "census" => Ok(Self::Census),
            "economic_indicator" => Ok(Self::EconomicIndicator),
            "job_board" => Ok(Self::JobBoard),
            "fallback" => Ok(Self::Fallback),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_identifiers() {
        for id in SourceId::ALL_LIVE {
            assert_eq!(id.as_str().parse::<SourceId>().expect("round trip"), id);
        }
    }

    #[test]
    fn rejects_unknown_source() {
        let err = "linkedin".parse::<SourceId>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSource { .. }));
    }

    #[test]
    fn fallback_reliability_is_lowest() {
        for id in SourceId::ALL_LIVE {
            assert!(id.reliability() > SourceId::Fallback.reliability());
        }
    }
}
