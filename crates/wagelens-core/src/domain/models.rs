use serde::{Deserialize, Serialize};

use crate::validation::ValidationResult;
use crate::{Location, Occupation, SourceId, UtcDateTime, ValidationError};

/// Raw salary figures as reported by a provider.
///
/// Individual figures may be absent when a provider omits them; the validator
/// penalizes missing required fields rather than the constructor rejecting
/// them. Present values must be finite and non-negative. The expected
/// ordering `p25 <= median <= p75` is deliberately NOT enforced here — the
/// validator downgrades violations to warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryFigures {
    pub median: Option<f64>,
    pub mean: Option<f64>,
    pub percentile_25: Option<f64>,
    pub percentile_75: Option<f64>,
    pub percentile_90: Option<f64>,
    pub sample_size: Option<u64>,
}

impl SalaryFigures {
    fn validate(&self) -> Result<(), ValidationError> {
        check_amount("median", self.median)?;
        check_amount("mean", self.mean)?;
        check_amount("percentile_25", self.percentile_25)?;
        check_amount("percentile_75", self.percentile_75)?;
        check_amount("percentile_90", self.percentile_90)?;
        Ok(())
    }
}

/// One source's salary answer for a (location, occupation) pair.
///
/// Immutable once validated; a fresh fetch cycle supersedes the point instead
/// of mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryDataPoint {
    pub source: SourceId,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<Occupation>,
    #[serde(flatten)]
    pub figures: SalaryFigures,
    pub year: i32,
    /// Source reliability prior, discounted by the validation result once one
    /// is attached.
    pub confidence_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    pub last_updated: UtcDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

impl SalaryDataPoint {
    pub fn new(
        source: SourceId,
        location: Location,
        occupation: Option<Occupation>,
        figures: SalaryFigures,
        year: i32,
    ) -> Result<Self, ValidationError> {
        figures.validate()?;
        check_year(year)?;

        Ok(Self {
            source,
            location,
            occupation,
            figures,
            year,
            confidence_score: source.reliability(),
            validation: None,
            last_updated: UtcDateTime::now(),
            cache_key: None,
        })
    }

    /// Attach a validation result, discounting confidence by its score.
    pub fn with_validation(mut self, validation: ValidationResult) -> Self {
        self.confidence_score = clamp01(self.source.reliability() * validation.confidence_score);
        self.validation = Some(validation);
        self
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// `(p75 - p25) / median` when all three figures are present.
    pub fn spread_ratio(&self) -> Option<f64> {
        let median = self.figures.median?;
        let p25 = self.figures.percentile_25?;
        let p75 = self.figures.percentile_75?;
        if median <= 0.0 {
            return None;
        }
        Some((p75 - p25) / median)
    }
}

/// Cost indices normalized around 100 (national baseline).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostIndices {
    pub overall: Option<f64>,
    pub housing: Option<f64>,
    pub transportation: Option<f64>,
    pub food: Option<f64>,
    pub healthcare: Option<f64>,
    pub utilities: Option<f64>,
}

impl CostIndices {
    fn validate(&self) -> Result<(), ValidationError> {
        check_amount("overall_index", self.overall)?;
        check_amount("housing_index", self.housing)?;
        check_amount("transportation_index", self.transportation)?;
        check_amount("food_index", self.food)?;
        check_amount("healthcare_index", self.healthcare)?;
        check_amount("utilities_index", self.utilities)?;
        Ok(())
    }

    /// The indices that are actually present, in declaration order.
    pub fn present(&self) -> Vec<f64> {
        [
            self.overall,
            self.housing,
            self.transportation,
            self.food,
            self.healthcare,
            self.utilities,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Cost-of-living answer for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostOfLivingDataPoint {
    pub source: SourceId,
    pub location: Location,
    #[serde(flatten)]
    pub indices: CostIndices,
    pub year: i32,
    pub confidence_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    pub last_updated: UtcDateTime,
}

impl CostOfLivingDataPoint {
    pub fn new(
        source: SourceId,
        location: Location,
        indices: CostIndices,
        year: i32,
    ) -> Result<Self, ValidationError> {
        indices.validate()?;
        check_year(year)?;

        Ok(Self {
            source,
            location,
            indices,
            year,
            confidence_score: source.reliability(),
            validation: None,
            last_updated: UtcDateTime::now(),
        })
    }

    pub fn with_validation(mut self, validation: ValidationResult) -> Self {
        self.confidence_score = clamp01(self.source.reliability() * validation.confidence_score);
        self.validation = Some(validation);
        self
    }
}

/// Raw job-market figures as reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMarketFigures {
    pub job_count: Option<u64>,
    pub average_salary: Option<f64>,
    pub salary_range_min: Option<f64>,
    pub salary_range_max: Option<f64>,
    /// Labor-demand score in `[0, 100]`.
    pub demand_score: Option<f64>,
}

impl JobMarketFigures {
    fn validate(&self) -> Result<(), ValidationError> {
        check_amount("average_salary", self.average_salary)?;
        check_amount("salary_range_min", self.salary_range_min)?;
        check_amount("salary_range_max", self.salary_range_max)?;

        if let Some(demand) = self.demand_score {
            if !demand.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    field: "demand_score",
                });
            }
            if !(0.0..=100.0).contains(&demand) {
                return Err(ValidationError::DemandScoreOutOfRange { value: demand });
            }
        }

        if let (Some(min), Some(max)) = (self.salary_range_min, self.salary_range_max) {
            if min > max {
                return Err(ValidationError::InvalidSalaryRange);
            }
        }

        Ok(())
    }
}

/// Job-market answer for one (location, occupation) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMarketDataPoint {
    pub source: SourceId,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<Occupation>,
    #[serde(flatten)]
    pub figures: JobMarketFigures,
    pub confidence_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    pub last_updated: UtcDateTime,
}

impl JobMarketDataPoint {
    pub fn new(
        source: SourceId,
        location: Location,
        occupation: Option<Occupation>,
        figures: JobMarketFigures,
    ) -> Result<Self, ValidationError> {
        figures.validate()?;

        Ok(Self {
            source,
            location,
            occupation,
            figures,
            confidence_score: source.reliability(),
            validation: None,
            last_updated: UtcDateTime::now(),
        })
    }

    pub fn with_validation(mut self, validation: ValidationResult) -> Self {
        self.confidence_score = clamp01(self.source.reliability() * validation.confidence_score);
        self.validation = Some(validation);
        self
    }
}

/// The merged, confidence-scored unit returned to callers and cached.
///
/// Owns its constituent points exclusively; concurrent requests share data
/// only through serialized cache copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveSalaryData {
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<Occupation>,
    pub salary_data: Vec<SalaryDataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_of_living: Option<CostOfLivingDataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_market: Option<JobMarketDataPoint>,
    pub overall_confidence_score: f64,
    pub data_quality_score: f64,
    pub recommendations: Vec<String>,
    pub last_updated: UtcDateTime,
}

pub(crate) fn clamp01(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn check_amount(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    let Some(value) = value else {
        return Ok(());
    };
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn check_year(year: i32) -> Result<(), ValidationError> {
    if !(1990..=2100).contains(&year) {
        return Err(ValidationError::ImplausibleYear { value: year });
    }
    Ok(())
}
