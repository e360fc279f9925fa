//! Static baseline data substituted when every live source fails.
//!
//! Figures are coarse metro-level baselines compiled from published annual
//! summaries. They carry the `Fallback` source id, whose low reliability
//! keeps the resulting confidence score near 0.3.

use crate::domain::{
    CostIndices, CostOfLivingDataPoint, JobMarketDataPoint, JobMarketFigures, Location, Occupation,
    SalaryDataPoint, SalaryFigures,
};
use crate::{SourceId, ValidationError};

/// Year the baseline table was compiled for.
const BASELINE_YEAR: i32 = 2024;

struct MetroBaseline {
    token: &'static str,
    median_salary: f64,
    mean_salary: f64,
    p25: f64,
    p75: f64,
    overall_index: f64,
    housing_index: f64,
    demand_score: f64,
}

const NATIONAL: MetroBaseline = MetroBaseline {
    token: "national",
    median_salary: 59_000.0,
    mean_salary: 63_000.0,
    p25: 44_000.0,
    p75: 78_000.0,
    overall_index: 100.0,
    housing_index: 100.0,
    demand_score: 50.0,
};

const METROS: &[MetroBaseline] = &[
    MetroBaseline {
        token: "atlanta",
        median_salary: 62_000.0,
        mean_salary: 66_000.0,
        p25: 46_000.0,
        p75: 82_000.0,
        overall_index: 98.0,
        housing_index: 95.0,
        demand_score: 62.0,
    },
    MetroBaseline {
        token: "austin",
        median_salary: 67_000.0,
        mean_salary: 72_000.0,
        p25: 50_000.0,
        p75: 90_000.0,
        overall_index: 103.0,
        housing_index: 108.0,
        demand_score: 70.0,
    },
    MetroBaseline {
        token: "boston",
        median_salary: 76_000.0,
        mean_salary: 82_000.0,
        p25: 56_000.0,
        p75: 102_000.0,
        overall_index: 127.0,
        housing_index: 148.0,
        demand_score: 64.0,
    },
    MetroBaseline {
        token: "chicago",
        median_salary: 65_000.0,
        mean_salary: 70_000.0,
        p25: 48_000.0,
        p75: 87_000.0,
        overall_index: 106.0,
        housing_index: 104.0,
        demand_score: 58.0,
    },
    MetroBaseline {
        token: "denver",
        median_salary: 68_000.0,
        mean_salary: 72_500.0,
        p25: 51_000.0,
        p75: 90_000.0,
        overall_index: 110.0,
        housing_index: 117.0,
        demand_score: 60.0,
    },
    MetroBaseline {
        token: "new-york",
        median_salary: 78_000.0,
        mean_salary: 86_000.0,
        p25: 56_000.0,
        p75: 108_000.0,
        overall_index: 140.0,
        housing_index: 178.0,
        demand_score: 66.0,
    },
    MetroBaseline {
        token: "san-francisco",
        median_salary: 92_000.0,
        mean_salary: 101_000.0,
        p25: 66_000.0,
        p75: 128_000.0,
        overall_index: 150.0,
        housing_index: 195.0,
        demand_score: 68.0,
    },
    MetroBaseline {
        token: "seattle",
        median_salary: 82_000.0,
        mean_salary: 89_000.0,
        p25: 60_000.0,
        p75: 112_000.0,
        overall_index: 128.0,
        housing_index: 145.0,
        demand_score: 67.0,
    },
];

fn baseline_for(location: &Location) -> &'static MetroBaseline {
    let token = location.cache_token();
    METROS
        .iter()
        .find(|metro| metro.token == token)
        .unwrap_or(&NATIONAL)
}

/// The three baseline points substituted for a total live-source outage.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackBundle {
    pub salary: SalaryDataPoint,
    pub cost_of_living: CostOfLivingDataPoint,
    pub job_market: JobMarketDataPoint,
}

/// Build baseline data for a location. Unknown metros get the national
/// baseline.
pub fn baseline_bundle(
    location: &Location,
    occupation: Option<&Occupation>,
) -> Result<FallbackBundle, ValidationError> {
    let baseline = baseline_for(location);

    let salary = SalaryDataPoint::new(
        SourceId::Fallback,
        location.clone(),
        occupation.cloned(),
        SalaryFigures {
            median: Some(baseline.median_salary),
            mean: Some(baseline.mean_salary),
            percentile_25: Some(baseline.p25),
            percentile_75: Some(baseline.p75),
            percentile_90: None,
            sample_size: None,
        },
        BASELINE_YEAR,
    )?;

    let cost_of_living = CostOfLivingDataPoint::new(
        SourceId::Fallback,
        location.clone(),
        CostIndices {
            overall: Some(baseline.overall_index),
            housing: Some(baseline.housing_index),
            ..CostIndices::default()
        },
        BASELINE_YEAR,
    )?;

    let job_market = JobMarketDataPoint::new(
        SourceId::Fallback,
        location.clone(),
        occupation.cloned(),
        JobMarketFigures {
            job_count: None,
            average_salary: Some(baseline.mean_salary),
            salary_range_min: Some(baseline.p25),
            salary_range_max: Some(baseline.p75),
            demand_score: Some(baseline.demand_score),
        },
    )?;

    Ok(FallbackBundle {
        salary,
        cost_of_living,
        job_market,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_metro_uses_its_baseline() {
        let location = Location::parse("Atlanta").expect("valid");
        let bundle = baseline_bundle(&location, None).expect("bundle");

        assert_eq!(bundle.salary.source, SourceId::Fallback);
        assert_eq!(bundle.salary.figures.median, Some(62_000.0));
        assert_eq!(bundle.salary.confidence_score, 0.3);
        assert_eq!(bundle.cost_of_living.indices.overall, Some(98.0));
        assert_eq!(bundle.job_market.figures.demand_score, Some(62.0));
    }

    #[test]
    fn unknown_metro_falls_back_to_the_national_baseline() {
        let location = Location::parse("Duluth").expect("valid");
        let bundle = baseline_bundle(&location, None).expect("bundle");

        assert_eq!(bundle.salary.figures.median, Some(59_000.0));
        assert_eq!(bundle.cost_of_living.indices.overall, Some(100.0));
    }

    #[test]
    fn occupation_is_carried_through() {
        let location = Location::parse("Seattle").expect("valid");
        let occupation = Occupation::parse("Nurse").expect("valid");
        let bundle = baseline_bundle(&location, Some(&occupation)).expect("bundle");

        assert_eq!(
            bundle.salary.occupation.as_ref().map(|o| o.as_str()),
            Some("Nurse")
        );
    }
}
