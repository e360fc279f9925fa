//! Confidence merging across heterogeneous data points.

use serde::{Deserialize, Serialize};

use crate::domain::clamp01;
use crate::{CostOfLivingDataPoint, JobMarketDataPoint, SalaryDataPoint};

/// Merged confidence for a comprehensive result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedConfidence {
    pub overall_confidence_score: f64,
    pub data_quality_score: f64,
}

impl MergedConfidence {
    pub const fn empty() -> Self {
        Self {
            overall_confidence_score: 0.0,
            data_quality_score: 0.0,
        }
    }
}

/// One contributing point, reduced to the three scalars the merge needs.
struct Contribution {
    confidence: f64,
    source_reliability: f64,
    validation_confidence: f64,
    quality: f64,
}

/// Weighted-confidence scorer.
///
/// `overall = sum(confidence_i * weight_i) / sum(weight_i)` where
/// `weight_i = source_reliability_i * validation_confidence_i`, the
/// validation weight defaulting to 1.0 when no validation ran. The merged
/// quality score is the unweighted mean of constituent quality scores. Both
/// outputs are clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn merge(
        &self,
        salary_points: &[SalaryDataPoint],
        cost_of_living: Option<&CostOfLivingDataPoint>,
        job_market: Option<&JobMarketDataPoint>,
    ) -> MergedConfidence {
        let mut contributions = Vec::with_capacity(salary_points.len() + 2);

        for point in salary_points {
            contributions.push(Contribution {
                confidence: point.confidence_score,
                source_reliability: point.source.reliability(),
                validation_confidence: point
                    .validation
                    .as_ref()
                    .map_or(1.0, |v| v.confidence_score),
                quality: point
                    .validation
                    .as_ref()
                    .map_or(0.5, |v| v.data_quality_score),
            });
        }

        if let Some(point) = cost_of_living {
            contributions.push(Contribution {
                confidence: point.confidence_score,
                source_reliability: point.source.reliability(),
                validation_confidence: point
                    .validation
                    .as_ref()
                    .map_or(1.0, |v| v.confidence_score),
                quality: point
                    .validation
                    .as_ref()
                    .map_or(0.5, |v| v.data_quality_score),
            });
        }

        if let Some(point) = job_market {
            contributions.push(Contribution {
                confidence: point.confidence_score,
                source_reliability: point.source.reliability(),
                validation_confidence: point
                    .validation
                    .as_ref()
                    .map_or(1.0, |v| v.confidence_score),
                quality: point
                    .validation
                    .as_ref()
                    .map_or(0.5, |v| v.data_quality_score),
            });
        }

        if contributions.is_empty() {
            return MergedConfidence::empty();
        }

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        let mut quality_sum = 0.0;

        for contribution in &contributions {
            let weight = contribution.source_reliability * contribution.validation_confidence;
            weighted_sum += contribution.confidence * weight;
            weight_total += weight;
            quality_sum += contribution.quality;
        }

        let overall = if weight_total > 0.0 {
            weighted_sum / weight_total
        } else {
            0.0
        };

        MergedConfidence {
            overall_confidence_score: clamp01(overall),
            data_quality_score: clamp01(quality_sum / contributions.len() as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Location, SalaryFigures, SourceId};

    fn salary_point(source: SourceId, median: f64) -> SalaryDataPoint {
        SalaryDataPoint::new(
            source,
            Location::parse("Atlanta").expect("valid location"),
            None,
            SalaryFigures {
                median: Some(median),
                mean: Some(median * 1.03),
                percentile_25: Some(median * 0.8),
                percentile_75: Some(median * 1.25),
                ..SalaryFigures::default()
            },
            2025,
        )
        .expect("valid point")
    }

    #[test]
    fn empty_input_merges_to_zero() {
        let merged = ConfidenceScorer.merge(&[], None, None);
        assert_eq!(merged, MergedConfidence::empty());
    }

    #[test]
    fn four_source_merge_is_the_weighted_mean() {
        // Unvalidated points: confidence = reliability, weight = reliability,
        // so overall = sum(r^2) / sum(r).
        let points = vec![
            salary_point(SourceId::WageSurvey, 65_000.0),
            salary_point(SourceId::Census, 68_000.0),
            salary_point(SourceId::EconomicIndicator, 64_000.0),
            salary_point(SourceId::JobBoard, 70_000.0),
        ];

        let merged = ConfidenceScorer.merge(&points, None, None);

        let expected: f64 = [0.9_f64, 0.85, 0.8, 0.7].iter().map(|r| r * r).sum::<f64>()
            / [0.9_f64, 0.85, 0.8, 0.7].iter().sum::<f64>();
        assert!((merged.overall_confidence_score - expected).abs() < 1e-9);
        assert!((merged.overall_confidence_score - 0.81).abs() < 0.02);
    }

    #[test]
    fn outputs_stay_within_unit_interval() {
        let points = vec![
            salary_point(SourceId::WageSurvey, 65_000.0),
            salary_point(SourceId::Fallback, 60_000.0),
        ];
        let merged = ConfidenceScorer.merge(&points, None, None);

        assert!((0.0..=1.0).contains(&merged.overall_confidence_score));
        assert!((0.0..=1.0).contains(&merged.data_quality_score));
    }
}
