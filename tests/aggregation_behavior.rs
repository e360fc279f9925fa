//! End-to-end aggregation behavior against the offline mock sources.

use wagelens_core::adapters::FetchParams;
use wagelens_core::{CoreConfig, Location, Occupation, Orchestrator, SourceId, ValidationLevel};

fn orchestrator() -> Orchestrator {
    Orchestrator::from_config(&CoreConfig::default())
}

fn atlanta() -> FetchParams {
    FetchParams::new(Location::parse("Atlanta").expect("valid location"))
}

#[tokio::test]
async fn comprehensive_result_merges_all_four_sources() {
    let orchestrator = orchestrator();
    let data = orchestrator
        .get_comprehensive_salary_data(&atlanta())
        .await
        .expect("aggregation succeeds");

    assert_eq!(data.salary_data.len(), 4);
    let sources: Vec<SourceId> = data.salary_data.iter().map(|p| p.source).collect();
    for id in SourceId::ALL_LIVE {
        assert!(sources.contains(&id), "missing {id}");
    }

    // Cost of living comes from the most reliable capable source.
    assert_eq!(
        data.cost_of_living.as_ref().map(|p| p.source),
        Some(SourceId::Census)
    );
    assert_eq!(
        data.job_market.as_ref().map(|p| p.source),
        Some(SourceId::JobBoard)
    );
}

#[tokio::test]
async fn overall_confidence_lands_near_the_weighted_mean() {
    let orchestrator = orchestrator();
    let data = orchestrator
        .get_comprehensive_salary_data(&atlanta())
        .await
        .expect("aggregation succeeds");

    assert!(
        (data.overall_confidence_score - 0.81).abs() < 0.02,
        "confidence {} outside expected band",
        data.overall_confidence_score
    );
    assert!(data.data_quality_score > 0.5);
}

#[tokio::test]
async fn every_point_carries_a_validation_result() {
    let orchestrator = orchestrator();
    let data = orchestrator
        .get_comprehensive_salary_data(&atlanta())
        .await
        .expect("aggregation succeeds");

    for point in &data.salary_data {
        let validation = point.validation.as_ref().expect("validated");
        assert!(validation.is_valid);
        assert!(matches!(
            validation.validation_level,
            ValidationLevel::High | ValidationLevel::Medium
        ));
        // Validation can only discount the source reliability prior.
        assert!(point.confidence_score <= point.source.reliability());
    }
}

#[tokio::test]
async fn second_request_hits_the_cache() {
    let orchestrator = orchestrator();
    let first = orchestrator
        .get_comprehensive_salary_data(&atlanta())
        .await
        .expect("first aggregation");
    let second = orchestrator
        .get_comprehensive_salary_data(&atlanta())
        .await
        .expect("second aggregation");

    assert_eq!(first, second);
    let stats = orchestrator.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn different_locations_use_different_cache_entries() {
    let orchestrator = orchestrator();
    orchestrator
        .get_comprehensive_salary_data(&atlanta())
        .await
        .expect("atlanta");
    orchestrator
        .get_comprehensive_salary_data(&FetchParams::new(
            Location::parse("Austin").expect("valid location"),
        ))
        .await
        .expect("austin");

    assert_eq!(orchestrator.cache_stats().misses, 2);
    assert_eq!(orchestrator.cache_stats().hits, 0);
}

#[tokio::test]
async fn refresh_reaggregates_without_reading_the_cache() {
    let orchestrator = orchestrator();
    orchestrator
        .get_comprehensive_salary_data(&atlanta())
        .await
        .expect("seed");

    let refreshed = orchestrator
        .refresh_comprehensive_salary_data(&atlanta())
        .await
        .expect("refresh");

    assert_eq!(refreshed.salary_data.len(), 4);
    let stats = orchestrator.cache_stats();
    assert_eq!(stats.hits, 0, "refresh must not read the cache");
}

#[tokio::test]
async fn occupation_flows_through_to_every_point() {
    let orchestrator = orchestrator();
    let params = atlanta().with_occupation(Occupation::parse("Registered Nurse").expect("valid"));
    let data = orchestrator
        .get_comprehensive_salary_data(&params)
        .await
        .expect("aggregation succeeds");

    assert_eq!(
        data.occupation.as_ref().map(|o| o.as_str()),
        Some("Registered Nurse")
    );
    for point in &data.salary_data {
        assert_eq!(
            point.occupation.as_ref().map(|o| o.as_str()),
            Some("Registered Nurse")
        );
    }
}

#[tokio::test]
async fn high_demand_produces_a_negotiation_recommendation() {
    let orchestrator = orchestrator();
    let data = orchestrator
        .get_comprehensive_salary_data(&atlanta())
        .await
        .expect("aggregation succeeds");

    assert!(data
        .recommendations
        .iter()
        .any(|r| r.contains("well positioned to negotiate")));
    // Mock cost indices sit near the national baseline, so no cost note.
    assert!(!data
        .recommendations
        .iter()
        .any(|r| r.contains("Cost of living")));
}
