// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Brute-force simulation against the analytic model.

use afrcalc_core::{ClusterConfig, RedundancyScheme};
use afrcalc_model::cluster_afr;
use afrcalc_sim::{BruteForceSimulator, PlacementGroup};
use proptest::prelude::*;

/// Agreement required between the brute-force mean and the analytic value.
const MODEL_TOLERANCE: f64 = 0.10;

fn scenario_a() -> ClusterConfig {
    ClusterConfig {
        n_hosts: 4,
        n_drives: 4,
        afr_drive: 0.05,
        afr_host: 0.0,
        capacity: 4000.0,
        speed: Some(0.1),
        scheme: RedundancyScheme::Replicated { replicas: 2 },
        pgs: 100.0,
        ..Default::default()
    }
}

#[test]
fn test_scenario_a_matches_analytic() {
    let config = scenario_a();
    let analytic = cluster_afr(&config).unwrap();
    let summary = BruteForceSimulator::new(&config).unwrap().run_many(200, 1).unwrap();

    let relative = (summary.mean - analytic).abs() / analytic;
    assert!(
        relative < MODEL_TOLERANCE,
        "brute force {} vs analytic {analytic} ({relative:.3})",
        summary.mean
    );
    assert!(summary.contains(analytic, MODEL_TOLERANCE));
    assert!(summary.mean > 1e-4 && summary.mean < 1e-3);
}

#[test]
fn test_scenario_b_erasure_one_plus_one_matches_two_replicas() {
    let replicated = scenario_a();
    let mut erasure = scenario_a();
    erasure.scheme = RedundancyScheme::Erasure { data: 1, parity: 1 };

    let repl = BruteForceSimulator::new(&replicated).unwrap().run_many(1000, 10).unwrap();
    let ec = BruteForceSimulator::new(&erasure).unwrap().run_many(1000, 50_000).unwrap();

    let relative = (repl.mean - ec.mean).abs() / repl.mean;
    assert!(relative < 0.10, "replicated {} vs erasure {}", repl.mean, ec.mean);
}

#[test]
fn test_erasure_matches_analytic_order_of_magnitude() {
    let mut config = scenario_a();
    config.n_hosts = 6;
    config.pgs = 20.0;
    config.scheme = RedundancyScheme::Erasure { data: 2, parity: 1 };

    let analytic = cluster_afr(&config).unwrap();
    let summary = BruteForceSimulator::new(&config).unwrap().run_many(50, 3).unwrap();
    let ratio = summary.mean / analytic;
    assert!(ratio > 0.5 && ratio < 2.0, "ratio {ratio}");
}

/// Drive-only default cluster: 10 hosts x 10 drives, 3% AFR, 50 pgs.
fn drive_only(scheme: RedundancyScheme) -> ClusterConfig {
    ClusterConfig { afr_host: 0.0, scheme, ..Default::default() }
}

fn simulated_over_analytic(config: &ClusterConfig) -> f64 {
    let analytic = cluster_afr(config).unwrap();
    let summary = BruteForceSimulator::new(config).unwrap().run_many(10, 21).unwrap();
    summary.mean / analytic
}

#[test]
fn test_multi_failure_tolerance_ratio_bounds() {
    // The analytic model counts disjoint peer groups, the simulator counts
    // every completed death set, so schemes surviving two losses come out
    // higher in simulation: about 1.6x for 3 replicas, 2.0x for EC 2+2 and
    // 2.7x for EC 4+2.
    let cases = [
        (RedundancyScheme::Replicated { replicas: 3 }, 1.4, 1.9),
        (RedundancyScheme::Erasure { data: 2, parity: 2 }, 1.7, 2.3),
        (RedundancyScheme::Erasure { data: 4, parity: 2 }, 2.3, 3.1),
    ];
    for (scheme, low, high) in cases {
        let ratio = simulated_over_analytic(&drive_only(scheme));
        assert!(ratio > low && ratio < high, "{scheme}: simulated/analytic = {ratio}");
    }
}

#[test]
fn test_single_failure_tolerance_ratio_near_one() {
    for scheme in [
        RedundancyScheme::Replicated { replicas: 2 },
        RedundancyScheme::Erasure { data: 2, parity: 1 },
    ] {
        let ratio = simulated_over_analytic(&drive_only(scheme));
        assert!((ratio - 1.0).abs() < MODEL_TOLERANCE, "{scheme}: simulated/analytic = {ratio}");
    }
}

#[test]
fn test_duplicate_pair_counted_once_across_groups() {
    let sim = BruteForceSimulator::new(&scenario_a()).unwrap();
    let pair = PlacementGroup::new(vec![2, 13]);
    let other = PlacementGroup::new(vec![3, 6]);

    let distinct = sim.evaluate(&[pair.clone(), other.clone()]).unwrap();
    let repeated = sim
        .evaluate(&[pair.clone(), other.clone(), pair, other])
        .unwrap();
    assert_eq!(distinct, repeated);
}

#[test]
fn test_shorter_recovery_lowers_loss() {
    let slow = scenario_a();
    let mut fast = scenario_a();
    fast.speed = Some(0.4);

    let slow = BruteForceSimulator::new(&slow).unwrap().run_many(20, 8).unwrap();
    let fast = BruteForceSimulator::new(&fast).unwrap().run_many(20, 8).unwrap();
    assert!(fast.mean < slow.mean);
}

fn scheme_strategy() -> impl Strategy<Value = RedundancyScheme> {
    prop_oneof![
        (2u32..=3).prop_map(|replicas| RedundancyScheme::Replicated { replicas }),
        (1u32..=4, 1u32..=2).prop_map(|(data, parity)| RedundancyScheme::Erasure { data, parity }),
    ]
}

prop_compose! {
    fn small_cluster()(
        scheme in scheme_strategy(),
        extra_hosts in 0u32..4,
        n_drives in 1u32..=4,
        afr_drive in 0.0f64..0.9,
        speed in 0.001f64..1.0,
        pgs in 1.0f64..20.0,
    ) -> ClusterConfig {
        ClusterConfig {
            n_hosts: scheme.group_size() + extra_hosts,
            n_drives,
            afr_drive,
            afr_host: 0.0,
            capacity: 4000.0,
            speed: Some(speed),
            scheme,
            pgs,
            ..Default::default()
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_simulation_is_a_probability(config in small_cluster(), seed in any::<u64>()) {
        let p = BruteForceSimulator::new(&config).unwrap().run(seed).unwrap();
        prop_assert!((0.0..=1.0).contains(&p), "{p} for {config:?}");
    }
}
