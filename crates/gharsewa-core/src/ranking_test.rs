use std::num::NonZeroUsize;

use super::*;

const KATHMANDU: GeoPoint = GeoPoint::new(27.7172, 85.3240);

fn provider(id: &str, lat: f64, lon: f64) -> Candidate {
    Candidate::new(id, format!("Provider {id}"), Role::Provider)
        .with_location(GeoPoint::new(lat, lon))
}

fn ids(results: &[RankedResult]) -> Vec<&str> {
    results.iter().map(|r| r.candidate.id.as_str()).collect()
}

fn limit(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).expect("non-zero limit")
}

#[test]
fn kathmandu_scenario() {
    let candidates = vec![
        provider("a", 27.7172, 85.3240),
        provider("b", 27.6710, 85.4298),
        Candidate::new("c", "Provider c", Role::Provider),
    ];

    let results = rank(KATHMANDU, candidates, &RankOptions::default());

    assert_eq!(ids(&results), vec!["a", "b"]);
    assert!(results[0].distance_km.abs() < 1e-9);
    assert!((results[1].distance_km - 11.61).abs() < 0.01);
}

#[test]
fn empty_input_yields_empty_output() {
    let results = rank(KATHMANDU, Vec::new(), &RankOptions::default());
    assert!(results.is_empty());
}

#[test]
fn output_is_sorted_ascending_and_non_negative() {
    let candidates = vec![
        provider("pokhara", 28.2096, 83.9856),
        provider("patan", 27.6766, 85.3142),
        provider("biratnagar", 26.4525, 87.2718),
        provider("bhaktapur", 27.6710, 85.4298),
        provider("thamel", 27.7154, 85.3123),
    ];

    let results = rank(KATHMANDU, candidates, &RankOptions::default());

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.distance_km >= 0.0));
    assert!(results
        .windows(2)
        .all(|w| w[0].distance_km <= w[1].distance_km));
    assert_eq!(
        ids(&results),
        vec!["thamel", "patan", "bhaktapur", "pokhara", "biratnagar"]
    );
}

#[test]
fn candidates_without_location_are_dropped_wherever_they_appear() {
    let candidates = vec![
        Candidate::new("first", "No Location", Role::Provider),
        provider("x", 27.70, 85.32),
        Candidate::new("middle", "No Location", Role::Provider),
        provider("y", 27.60, 85.32),
        Candidate::new("last", "No Location", Role::Provider),
    ];

    let results = rank(KATHMANDU, candidates, &RankOptions::default());

    assert_eq!(ids(&results), vec!["x", "y"]);
}

#[test]
fn role_filter_excludes_geolocated_customers() {
    let candidates = vec![
        Candidate::new("cust", "Customer", Role::Customer).with_location(KATHMANDU),
        provider("prov", 27.70, 85.30),
    ];

    let options = RankOptions::default().role(Role::Provider);
    let results = rank(KATHMANDU, candidates.clone(), &options);
    assert_eq!(ids(&results), vec!["prov"]);

    let unfiltered = rank(KATHMANDU, candidates, &RankOptions::default());
    assert_eq!(ids(&unfiltered), vec!["cust", "prov"]);
}

#[test]
fn limit_truncates_after_sorting() {
    let candidates = vec![
        provider("far", 28.2096, 83.9856),
        provider("near", 27.7154, 85.3123),
        provider("mid", 27.6710, 85.4298),
    ];

    let results = rank(KATHMANDU, candidates, &RankOptions::default().limit(limit(2)));

    assert_eq!(ids(&results), vec!["near", "mid"]);
}

#[test]
fn limit_larger_than_input_returns_everything() {
    let candidates = vec![provider("a", 27.70, 85.32), provider("b", 27.71, 85.33)];

    let results = rank(KATHMANDU, candidates, &RankOptions::default().limit(limit(5)));

    assert_eq!(results.len(), 2);
}

#[test]
fn limit_counts_only_geolocated_matching_candidates() {
    let candidates = vec![
        Candidate::new("unlocated", "Nowhere", Role::Provider),
        Candidate::new("cust", "Customer", Role::Customer).with_location(KATHMANDU),
        provider("a", 27.70, 85.32),
        provider("b", 27.71, 85.33),
        provider("c", 27.72, 85.34),
    ];

    for k in 1..=5 {
        let options = RankOptions::default().role(Role::Provider).limit(limit(k));
        let results = rank(KATHMANDU, candidates.clone(), &options);
        assert_eq!(results.len(), k.min(3), "limit {k}");
    }
}

#[test]
fn equal_distances_keep_input_order() {
    let candidates = vec![
        provider("second", 27.7172, 85.3240),
        provider("first", 27.7172, 85.3240),
        provider("third", 27.7172, 85.3240),
    ];

    let results = rank(KATHMANDU, candidates, &RankOptions::default());

    assert_eq!(ids(&results), vec!["second", "first", "third"]);
}

#[test]
fn self_is_kept_unless_excluded() {
    let candidates = vec![provider("me", 27.7172, 85.3240), provider("other", 27.70, 85.32)];

    let kept = rank(KATHMANDU, candidates.clone(), &RankOptions::default());
    assert_eq!(ids(&kept), vec!["me", "other"]);

    let excluded = rank(KATHMANDU, candidates, &RankOptions::default().exclude("me"));
    assert_eq!(ids(&excluded), vec!["other"]);
}

#[test]
fn exclusion_applies_before_limit() {
    let candidates = vec![
        provider("me", 27.7172, 85.3240),
        provider("a", 27.70, 85.32),
        provider("b", 27.60, 85.32),
    ];

    let options = RankOptions::default().exclude("me").limit(limit(1));
    let results = rank(KATHMANDU, candidates, &options);

    assert_eq!(ids(&results), vec!["a"]);
}

#[test]
fn attributes_pass_through_unchanged() {
    let candidate = provider("a", 27.70, 85.32)
        .with_attribute("skills", "electrician, plumbing")
        .with_attribute("averageRating", 4.2)
        .with_attribute("totalReviews", 17);
    let expected = candidate.attributes.clone();

    let results = rank(KATHMANDU, vec![candidate], &RankOptions::default());

    assert_eq!(results[0].candidate.attributes, expected);
}

#[test]
fn origin_is_not_mutated() {
    let origin = KATHMANDU;
    let _ = rank(origin, vec![provider("a", 0.0, 0.0)], &RankOptions::default());
    assert_eq!(origin, GeoPoint::new(27.7172, 85.3240));
}

#[test]
fn nan_origin_yields_infinite_distances_not_nan() {
    let candidates = vec![provider("a", 27.7154, 85.3123), provider("b", 28.2096, 83.9856)];

    let results = rank(GeoPoint::new(f64::NAN, 0.0), candidates, &RankOptions::default());

    assert_eq!(ids(&results), vec!["a", "b"]);
    assert!(results.iter().all(|r| r.distance_km == f64::INFINITY));
}

#[test]
fn nan_candidate_sorts_after_every_real_distance() {
    let candidates = vec![
        provider("broken", f64::NAN, 85.0),
        provider("far", 28.2096, 83.9856),
        provider("near", 27.7154, 85.3123),
    ];

    let results = rank(KATHMANDU, candidates, &RankOptions::default());

    assert_eq!(ids(&results), vec!["near", "far", "broken"]);
    assert!(results.iter().all(|r| r.distance_km >= 0.0));
}
