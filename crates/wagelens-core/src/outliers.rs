//! Statistical outlier detection over small numeric samples.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Minimum sample size for any detection method.
const MIN_SAMPLES: usize = 3;

/// Scale constant relating MAD to the standard deviation of a normal
/// distribution.
const MAD_CONSISTENCY: f64 = 0.6745;

/// Interchangeable detection methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    Iqr,
    ZScore,
    ModifiedZScore,
}

impl OutlierMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iqr => "iqr",
            Self::ZScore => "z_score",
            Self::ModifiedZScore => "modified_z_score",
        }
    }

    /// Conventional flagging threshold for the method.
    pub const fn default_threshold(self) -> f64 {
        match self {
            Self::Iqr => 1.5,
            Self::ZScore => 2.0,
            Self::ModifiedZScore => 3.0,
        }
    }
}

impl Display for OutlierMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

/// One flagged sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub index: usize,
    pub value: f64,
    pub method: OutlierMethod,
    pub severity: Severity,
}

/// Flag outliers in `values` using the given method and threshold.
///
/// Returns an empty list for fewer than three samples or degenerate spread
/// (zero standard deviation or MAD) rather than dividing by zero.
pub fn detect(values: &[f64], method: OutlierMethod, threshold: f64) -> Vec<Outlier> {
    if values.len() < MIN_SAMPLES || values.iter().any(|v| !v.is_finite()) {
        return Vec::new();
    }

    match method {
        OutlierMethod::Iqr => detect_iqr(values, threshold),
        OutlierMethod::ZScore => detect_z_score(values, threshold),
        OutlierMethod::ModifiedZScore => detect_modified_z_score(values, threshold),
    }
}

fn detect_iqr(values: &[f64], threshold: f64) -> Vec<Outlier> {
    let q1 = quantile(values, 0.25);
    let q3 = quantile(values, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - threshold * iqr;
    let upper = q3 + threshold * iqr;

    let mean = mean(values);
    let std_dev = std_dev(values, mean);

    values
        .iter()
        .enumerate()
        .filter(|(_, value)| **value < lower || **value > upper)
        .map(|(index, value)| {
            let severity = if std_dev > 0.0 && (value - mean).abs() > 2.0 * std_dev {
                Severity::High
            } else {
                Severity::Medium
            };
            Outlier {
                index,
                value: *value,
                method: OutlierMethod::Iqr,
                severity,
            }
        })
        .collect()
}

fn detect_z_score(values: &[f64], threshold: f64) -> Vec<Outlier> {
    let mean = mean(values);
    let std_dev = std_dev(values, mean);
    if std_dev == 0.0 {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let z = (value - mean) / std_dev;
            if z.abs() <= threshold {
                return None;
            }
            let severity = if z.abs() > 3.0 {
                Severity::High
            } else {
                Severity::Medium
            };
            Some(Outlier {
                index,
                value: *value,
                method: OutlierMethod::ZScore,
                severity,
            })
        })
        .collect()
}

fn detect_modified_z_score(values: &[f64], threshold: f64) -> Vec<Outlier> {
    let median = quantile(values, 0.5);
    let deviations = values
        .iter()
        .map(|value| (value - median).abs())
        .collect::<Vec<_>>();
    let mad = quantile(&deviations, 0.5);
    if mad == 0.0 {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let score = MAD_CONSISTENCY * (value - median) / mad;
            if score.abs() <= threshold {
                return None;
            }
            let severity = if score.abs() > 3.5 {
                Severity::High
            } else {
                Severity::Medium
            };
            Some(Outlier {
                index,
                value: *value,
                method: OutlierMethod::ModifiedZScore,
                severity,
            })
        })
        .collect()
}

/// Linear-interpolation quantile over an unsorted sample.
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("values are finite"));

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
