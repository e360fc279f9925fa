use thiserror::Error;

/// Validation and contract errors exposed by `wagelens-core`.
///
/// These cover programming/contract mistakes only. Expected runtime failures
/// (source outages, malformed upstream payloads, suspect data) travel as
/// values through [`crate::fetcher::FetchResponse`] and
/// [`crate::validation::ValidationResult`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("location cannot be empty")]
    EmptyLocation,
    #[error("location length {len} exceeds max {max}")]
    LocationTooLong { len: usize, max: usize },
    #[error("occupation cannot be empty")]
    EmptyOccupation,

    #[error("invalid source '{value}', expected one of wage_survey, census, economic_indicator, job_board, fallback")]
    InvalidSource { value: String },
    #[error("invalid cache strategy '{value}', expected one of standard, aggressive, conservative")]
    InvalidStrategy { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("demand score {value} must be within 0..=100")]
    DemandScoreOutOfRange { value: f64 },
    #[error("salary range min must be <= max")]
    InvalidSalaryRange,

    #[error("data year {value} is not plausible")]
    ImplausibleYear { value: i32 },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_compare_by_value() {
        let error = ValidationError::DemandScoreOutOfRange { value: 120.0 };
        assert_eq!(error.clone(), error);
        assert_ne!(
            error,
            ValidationError::DemandScoreOutOfRange { value: 130.0 }
        );
        assert!(error.to_string().contains("120"));
    }
}
