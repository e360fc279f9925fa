//! Field-level sanity checks and outlier screening for fetched data points.
//!
//! A [`ValidationResult`] carries two deliberately separate scalars:
//!
//! - `confidence_score` — a pass/fail-oriented discount factor, reduced by a
//!   fixed penalty per violated rule (trustworthiness);
//! - `data_quality_score` — an additive composite of sample size, field
//!   completeness, outlier count, and data age (completeness/freshness).
//!
//! The two must not be conflated: a complete, fresh point can still be
//! implausible, and a sparse point can still be trustworthy.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::clamp01;
use crate::outliers::{self, Outlier, OutlierMethod};
use crate::{CostOfLivingDataPoint, JobMarketDataPoint, SalaryDataPoint, UtcDateTime};

const MISSING_SALARY_FIELD_PENALTY: f64 = 0.2;
const MISSING_FIELD_PENALTY: f64 = 0.3;
const RANGE_PENALTY: f64 = 0.25;
const INCONSISTENCY_PENALTY: f64 = 0.1;
const SMALL_SAMPLE_PENALTY: f64 = 0.2;
const STALE_DATA_PENALTY: f64 = 0.1;
const OUTLIER_PENALTY: f64 = 0.1;

const SALARY_PLAUSIBLE_MIN: f64 = 20_000.0;
const SALARY_PLAUSIBLE_MAX: f64 = 500_000.0;
const OVERALL_INDEX_RANGE: (f64, f64) = (50.0, 300.0);
const HOUSING_INDEX_RANGE: (f64, f64) = (50.0, 400.0);

const SMALL_SAMPLE_SIZE: u64 = 10;
const ROBUST_SAMPLE_SIZE: u64 = 100;
const MAX_DATA_AGE_YEARS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    High,
    Medium,
    Low,
    Invalid,
}

/// Outcome of validating one data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Discount factor in `[0, 1]` applied to the source reliability prior.
    pub confidence_score: f64,
    pub validation_level: ValidationLevel,
    /// Blocking problems (implausible or missing values).
    pub issues: Vec<String>,
    /// Non-blocking observations (inconsistencies, staleness, small samples).
    pub warnings: Vec<String>,
    pub outliers_detected: Vec<Outlier>,
    /// Completeness/freshness composite in `[0, 1]`, independent of
    /// `confidence_score`.
    pub data_quality_score: f64,
    pub timestamp: UtcDateTime,
}

impl ValidationResult {
    fn finish(
        confidence: f64,
        issues: Vec<String>,
        warnings: Vec<String>,
        outliers: Vec<Outlier>,
        quality: f64,
    ) -> Self {
        let confidence = clamp01(confidence);
        let level = if confidence >= 0.8 && issues.is_empty() {
            ValidationLevel::High
        } else if confidence >= 0.6 {
            ValidationLevel::Medium
        } else if confidence >= 0.4 {
            ValidationLevel::Low
        } else {
            ValidationLevel::Invalid
        };

        Self {
            is_valid: level != ValidationLevel::Invalid,
            confidence_score: confidence,
            validation_level: level,
            issues,
            warnings,
            outliers_detected: outliers,
            data_quality_score: clamp01(quality),
            timestamp: UtcDateTime::now(),
        }
    }

    fn invalid(confidence: f64, issues: Vec<String>, quality: f64) -> Self {
        Self {
            is_valid: false,
            confidence_score: clamp01(confidence),
            validation_level: ValidationLevel::Invalid,
            issues,
            warnings: Vec::new(),
            outliers_detected: Vec::new(),
            data_quality_score: clamp01(quality),
            timestamp: UtcDateTime::now(),
        }
    }
}

/// Validates data points fetched from any source.
#[derive(Debug, Clone, Copy)]
pub struct DataValidator {
    outlier_method: OutlierMethod,
    outlier_threshold: f64,
    current_year: i32,
}

impl Default for DataValidator {
    fn default() -> Self {
        Self {
            // The percentile triple is only three samples; the MAD-based
            // method is the one that stays sensitive at that size.
            outlier_method: OutlierMethod::ModifiedZScore,
            outlier_threshold: OutlierMethod::ModifiedZScore.default_threshold(),
            current_year: OffsetDateTime::now_utc().year(),
        }
    }
}

impl DataValidator {
    pub fn new(outlier_method: OutlierMethod, outlier_threshold: f64) -> Self {
        Self {
            outlier_method,
            outlier_threshold,
            ..Self::default()
        }
    }

    /// Pin the reference year for data-age checks. Test hook.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn validate_salary(&self, point: &SalaryDataPoint) -> ValidationResult {
        let figures = &point.figures;
        let mut confidence = 1.0_f64;
        let mut issues = Vec::new();
        let mut warnings = Vec::new();

        let required = [
            ("median", figures.median),
            ("mean", figures.mean),
            ("percentile_25", figures.percentile_25),
            ("percentile_75", figures.percentile_75),
        ];
        for (name, value) in required {
            if value.is_none() {
                confidence -= MISSING_SALARY_FIELD_PENALTY;
                issues.push(format!("missing required field '{name}'"));
            }
        }
        let quality = self.salary_quality(point, 0);
        if !issues.is_empty() {
            return ValidationResult::invalid(confidence, issues, quality);
        }

        let median = figures.median.expect("checked above");
        let mean = figures.mean.expect("checked above");
        let p25 = figures.percentile_25.expect("checked above");
        let p75 = figures.percentile_75.expect("checked above");

        for (name, value) in [("median", median), ("mean", mean)] {
            if !(SALARY_PLAUSIBLE_MIN..=SALARY_PLAUSIBLE_MAX).contains(&value) {
                confidence -= RANGE_PENALTY;
                issues.push(format!(
                    "{name} salary {value:.0} outside plausible range \
                     [{SALARY_PLAUSIBLE_MIN:.0}, {SALARY_PLAUSIBLE_MAX:.0}]"
                ));
            }
        }

        if mean < 0.8 * median || mean > 1.5 * median {
            confidence -= INCONSISTENCY_PENALTY;
            warnings.push(format!(
                "mean {mean:.0} is inconsistent with median {median:.0}"
            ));
        }

        if !(p25 <= median && median <= p75) {
            confidence -= INCONSISTENCY_PENALTY;
            warnings.push(format!(
                "percentile ordering violated: p25 {p25:.0}, median {median:.0}, p75 {p75:.0}"
            ));
        }

        match figures.sample_size {
            Some(n) if n < SMALL_SAMPLE_SIZE => {
                confidence -= SMALL_SAMPLE_PENALTY;
                warnings.push(format!("sample size {n} is too small to be reliable"));
            }
            Some(_) => {}
            None => warnings.push(String::from("sample size unreported")),
        }

        if self.is_stale(point.year) {
            confidence -= STALE_DATA_PENALTY;
            warnings.push(format!(
                "data year {} is more than {MAX_DATA_AGE_YEARS} years old",
                point.year
            ));
        }

        let outliers = outliers::detect(&[p25, median, p75], self.outlier_method, self.outlier_threshold);
        if !outliers.is_empty() {
            confidence -= OUTLIER_PENALTY;
            warnings.push(format!(
                "{} outlier(s) detected among percentile figures",
                outliers.len()
            ));
        }

        let quality = self.salary_quality(point, outliers.len());
        ValidationResult::finish(confidence, issues, warnings, outliers, quality)
    }

    pub fn validate_cost_of_living(&self, point: &CostOfLivingDataPoint) -> ValidationResult {
        let indices = &point.indices;
        let mut confidence = 1.0_f64;
        let mut issues = Vec::new();
        let mut warnings = Vec::new();

        for (name, value) in [("overall_index", indices.overall), ("housing_index", indices.housing)] {
            if value.is_none() {
                confidence -= MISSING_FIELD_PENALTY;
                issues.push(format!("missing required field '{name}'"));
            }
        }
        let quality = self.cost_of_living_quality(point, 0);
        if !issues.is_empty() {
            return ValidationResult::invalid(confidence, issues, quality);
        }

        let overall = indices.overall.expect("checked above");
        let housing = indices.housing.expect("checked above");

        if !(OVERALL_INDEX_RANGE.0..=OVERALL_INDEX_RANGE.1).contains(&overall) {
            confidence -= RANGE_PENALTY;
            issues.push(format!(
                "overall index {overall:.1} outside plausible range [{}, {}]",
                OVERALL_INDEX_RANGE.0, OVERALL_INDEX_RANGE.1
            ));
        }
        if !(HOUSING_INDEX_RANGE.0..=HOUSING_INDEX_RANGE.1).contains(&housing) {
            confidence -= RANGE_PENALTY;
            issues.push(format!(
                "housing index {housing:.1} outside plausible range [{}, {}]",
                HOUSING_INDEX_RANGE.0, HOUSING_INDEX_RANGE.1
            ));
        }

        if housing > 2.0 * overall {
            confidence -= INCONSISTENCY_PENALTY;
            warnings.push(format!(
                "housing index {housing:.1} is more than double the overall index {overall:.1}"
            ));
        }

        if self.is_stale(point.year) {
            confidence -= STALE_DATA_PENALTY;
            warnings.push(format!(
                "data year {} is more than {MAX_DATA_AGE_YEARS} years old",
                point.year
            ));
        }

        let present = indices.present();
        let outliers = outliers::detect(&present, self.outlier_method, self.outlier_threshold);
        if !outliers.is_empty() {
            confidence -= OUTLIER_PENALTY;
            warnings.push(format!(
                "{} outlier(s) detected among cost indices",
                outliers.len()
            ));
        }

        let quality = self.cost_of_living_quality(point, outliers.len());
        ValidationResult::finish(confidence, issues, warnings, outliers, quality)
    }

    pub fn validate_job_market(&self, point: &JobMarketDataPoint) -> ValidationResult {
        let figures = &point.figures;
        let mut confidence = 1.0_f64;
        let mut issues = Vec::new();
        let mut warnings = Vec::new();

        if figures.job_count.is_none() {
            confidence -= MISSING_FIELD_PENALTY;
            issues.push(String::from("missing required field 'job_count'"));
        }
        if figures.average_salary.is_none() {
            confidence -= MISSING_FIELD_PENALTY;
            issues.push(String::from("missing required field 'average_salary'"));
        }
        if figures.demand_score.is_none() {
            confidence -= MISSING_FIELD_PENALTY;
            issues.push(String::from("missing required field 'demand_score'"));
        }
        let quality = job_market_quality(point);
        if !issues.is_empty() {
            return ValidationResult::invalid(confidence, issues, quality);
        }

        let average = figures.average_salary.expect("checked above");
        if !(SALARY_PLAUSIBLE_MIN..=SALARY_PLAUSIBLE_MAX).contains(&average) {
            confidence -= RANGE_PENALTY;
            issues.push(format!(
                "average salary {average:.0} outside plausible range \
                 [{SALARY_PLAUSIBLE_MIN:.0}, {SALARY_PLAUSIBLE_MAX:.0}]"
            ));
        }

        if let (Some(min), Some(max)) = (figures.salary_range_min, figures.salary_range_max) {
            if average < min || average > max {
                confidence -= INCONSISTENCY_PENALTY;
                warnings.push(format!(
                    "average salary {average:.0} falls outside the reported range \
                     [{min:.0}, {max:.0}]"
                ));
            }
        }

        ValidationResult::finish(confidence, issues, warnings, Vec::new(), quality)
    }

    fn is_stale(&self, year: i32) -> bool {
        self.current_year - year > MAX_DATA_AGE_YEARS
    }

    fn salary_quality(&self, point: &SalaryDataPoint, outlier_count: usize) -> f64 {
        let figures = &point.figures;

        let sample_component = match figures.sample_size {
            Some(n) if n >= ROBUST_SAMPLE_SIZE => 0.3,
            Some(n) if n >= SMALL_SAMPLE_SIZE => 0.15,
            Some(_) => 0.05,
            None => 0.0,
        };

        let present = [
            figures.median,
            figures.mean,
            figures.percentile_25,
            figures.percentile_75,
            figures.percentile_90,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
            + usize::from(figures.sample_size.is_some());
        let completeness_component = present as f64 / 6.0 * 0.3;

        let outlier_component = match outlier_count {
            0 => 0.2,
            1 => 0.1,
            _ => 0.0,
        };

        let age = self.current_year - point.year;
        let age_component = if age <= 1 {
            0.2
        } else if age <= MAX_DATA_AGE_YEARS {
            0.1
        } else {
            0.0
        };

        sample_component + completeness_component + outlier_component + age_component
    }

    fn cost_of_living_quality(&self, point: &CostOfLivingDataPoint, outlier_count: usize) -> f64 {
        let completeness_component = point.indices.present().len() as f64 / 6.0 * 0.5;

        let outlier_component = match outlier_count {
            0 => 0.2,
            1 => 0.1,
            _ => 0.0,
        };

        let age = self.current_year - point.year;
        let age_component = if age <= 1 {
            0.3
        } else if age <= MAX_DATA_AGE_YEARS {
            0.15
        } else {
            0.0
        };

        completeness_component + outlier_component + age_component
    }
}

fn job_market_quality(point: &JobMarketDataPoint) -> f64 {
    let figures = &point.figures;
    let present = usize::from(figures.job_count.is_some())
        + usize::from(figures.average_salary.is_some())
        + usize::from(figures.salary_range_min.is_some())
        + usize::from(figures.salary_range_max.is_some())
        + usize::from(figures.demand_score.is_some());
    let completeness_component = present as f64 / 5.0 * 0.6;

    let count_component = match figures.job_count {
        Some(n) if n >= 1_000 => 0.4,
        Some(n) if n >= 100 => 0.3,
        Some(n) if n >= 10 => 0.2,
        Some(_) => 0.1,
        None => 0.0,
    };

    completeness_component + count_component
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CostIndices, JobMarketFigures, Location, SalaryFigures, SourceId};

    fn validator() -> DataValidator {
        DataValidator::default().with_current_year(2026)
    }

    fn atlanta() -> Location {
        Location::parse("Atlanta").expect("valid location")
    }

    fn clean_salary_point() -> SalaryDataPoint {
        SalaryDataPoint::new(
            SourceId::WageSurvey,
            atlanta(),
            None,
            SalaryFigures {
                median: Some(65_000.0),
                mean: Some(67_000.0),
                percentile_25: Some(52_000.0),
                percentile_75: Some(82_000.0),
                percentile_90: Some(98_000.0),
                sample_size: Some(500),
            },
            2026,
        )
        .expect("valid point")
    }

    #[test]
    fn clean_salary_data_scores_high() {
        let result = validator().validate_salary(&clean_salary_point());

        assert!(result.is_valid);
        assert_eq!(result.confidence_score, 1.0);
        assert_eq!(result.validation_level, ValidationLevel::High);
        assert!(result.issues.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.outliers_detected.is_empty());
        assert!(result.data_quality_score > 0.9);
    }

    #[test]
    fn missing_required_fields_short_circuit_to_invalid() {
        let point = SalaryDataPoint::new(
            SourceId::Census,
            atlanta(),
            None,
            SalaryFigures {
                median: Some(65_000.0),
                ..SalaryFigures::default()
            },
            2026,
        )
        .expect("valid point");

        let result = validator().validate_salary(&point);
        assert!(!result.is_valid);
        assert_eq!(result.validation_level, ValidationLevel::Invalid);
        assert_eq!(result.issues.len(), 3);
        // 1.0 - 3 * 0.2
        assert!((result.confidence_score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn implausible_salary_is_an_issue() {
        let mut point = clean_salary_point();
        point.figures.median = Some(5_000.0);
        point.figures.mean = Some(5_500.0);
        point.figures.percentile_25 = Some(4_000.0);
        point.figures.percentile_75 = Some(6_500.0);

        let result = validator().validate_salary(&point);
        assert_eq!(result.issues.len(), 2);
        assert_ne!(result.validation_level, ValidationLevel::High);
    }

    #[test]
    fn mean_median_inconsistency_is_a_warning_not_an_issue() {
        let mut point = clean_salary_point();
        point.figures.mean = Some(130_000.0); // 2x the median

        let result = validator().validate_salary(&point);
        assert!(result.issues.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!((result.confidence_score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn percentile_inversion_is_a_warning() {
        let mut point = clean_salary_point();
        point.figures.percentile_25 = Some(90_000.0);

        let result = validator().validate_salary(&point);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("percentile ordering")));
    }

    #[test]
    fn small_sample_and_stale_data_stack_penalties() {
        let mut point = clean_salary_point();
        point.figures.sample_size = Some(4);
        point.year = 2020;

        let result = validator().validate_salary(&point);
        // 1.0 - 0.2 (sample) - 0.1 (stale)
        assert!((result.confidence_score - 0.7).abs() < 1e-9);
        assert_eq!(result.validation_level, ValidationLevel::Medium);
    }

    #[test]
    fn percentile_outlier_is_attached() {
        let mut point = clean_salary_point();
        point.figures.percentile_75 = Some(490_000.0);

        let result = validator().validate_salary(&point);
        assert!(!result.outliers_detected.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("outlier")));
    }

    #[test]
    fn confidence_never_goes_below_zero() {
        let point = SalaryDataPoint::new(
            SourceId::JobBoard,
            atlanta(),
            None,
            SalaryFigures::default(),
            2026,
        )
        .expect("valid point");

        let result = validator().validate_salary(&point);
        assert!(result.confidence_score >= 0.0);
        assert!(result.data_quality_score >= 0.0);
        assert!(result.data_quality_score <= 1.0);
    }

    #[test]
    fn cost_of_living_requires_overall_and_housing() {
        let point = CostOfLivingDataPoint::new(
            SourceId::Census,
            atlanta(),
            CostIndices {
                food: Some(98.0),
                ..CostIndices::default()
            },
            2026,
        )
        .expect("valid point");

        let result = validator().validate_cost_of_living(&point);
        assert!(!result.is_valid);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn housing_double_overall_is_a_warning() {
        let point = CostOfLivingDataPoint::new(
            SourceId::Census,
            atlanta(),
            CostIndices {
                overall: Some(100.0),
                housing: Some(210.0),
                transportation: Some(95.0),
                food: Some(101.0),
                healthcare: Some(99.0),
                utilities: Some(97.0),
            },
            2026,
        )
        .expect("valid point");

        let result = validator().validate_cost_of_living(&point);
        assert!(result.issues.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("housing")));
    }

    #[test]
    fn job_market_average_outside_range_is_a_warning() {
        let point = JobMarketDataPoint::new(
            SourceId::JobBoard,
            atlanta(),
            None,
            JobMarketFigures {
                job_count: Some(1_200),
                average_salary: Some(95_000.0),
                salary_range_min: Some(55_000.0),
                salary_range_max: Some(90_000.0),
                demand_score: Some(75.0),
            },
        )
        .expect("valid point");

        let result = validator().validate_job_market(&point);
        assert!(result.issues.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("range")));
        assert!((result.confidence_score - 0.9).abs() < 1e-9);
    }
}
