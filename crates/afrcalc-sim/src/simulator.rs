// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Brute-force estimator driver.

use afrcalc_core::{ensure_probability, ClusterConfig, RecoveryWindows};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cascade::Cascade;
use crate::error::{SimResult, SimulationError};
use crate::placement::{PlacementGenerator, PlacementGroup, DEFAULT_MAX_RETRIES};
use crate::residual::ResidualFailureMap;

/// z-score of a two-sided 95% confidence interval.
const Z_95: f64 = 1.96;

/// Estimates the annual data-loss probability from concrete placements.
///
/// Only drive failures are simulated; host failures are left to the
/// analytic model.
#[derive(Debug, Clone)]
pub struct BruteForceSimulator {
    config: ClusterConfig,
    window: f64,
    group_count: usize,
    tolerance: usize,
    max_retries: usize,
}

impl BruteForceSimulator {
    /// Create a simulator for a cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &ClusterConfig) -> SimResult<Self> {
        let windows = RecoveryWindows::derive(config)?;
        if config.afr_host > 0.0 {
            warn!(
                afr_host = config.afr_host,
                "Host failures are not simulated, only drive failures"
            );
        }
        if config.host_heal_hours.is_some() {
            warn!("host_heal_hours has no effect on the brute-force simulation");
        }

        Ok(Self {
            config: config.clone(),
            window: windows.disk_heal_time,
            group_count: PlacementGenerator::group_count(config),
            tolerance: config.scheme.tolerance() as usize,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set how many host draws a placement slot may reject before picking
    /// an unused host directly.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Number of placement groups generated per run.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Drive recovery window in years.
    #[must_use]
    pub fn window(&self) -> f64 {
        self.window
    }

    /// Run one simulation with a fresh placement drawn from `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the placement cannot be generated or the result
    /// is not a probability.
    pub fn run(&self, seed: u64) -> SimResult<f64> {
        let mut generator = PlacementGenerator::for_cluster(&self.config, self.max_retries, seed)?;
        let groups = generator.generate_all(self.group_count);
        self.evaluate(&groups)
    }

    /// Annual data-loss probability for a given placement.
    ///
    /// Groups are processed in order against one residual map, so a failure
    /// sequence shared by several groups counts once.
    ///
    /// # Errors
    ///
    /// Returns an error if a group or cluster probability leaves [0, 1].
    pub fn evaluate(&self, groups: &[PlacementGroup]) -> SimResult<f64> {
        let mut residuals = ResidualFailureMap::new(self.config.afr_drive);
        let mut survival_log = 0.0;

        for group in groups {
            let mut cascade = Cascade::new(&residuals, self.window, self.tolerance);
            let death = cascade.group_death(group.members());
            let deaths = cascade.into_deaths();

            let death = ensure_probability("placement group loss", death)?;
            survival_log += (-death).ln_1p();

            for d in &deaths {
                residuals.consume(&d.sequence, d.residual);
            }
        }

        let total = ensure_probability("cluster loss", -f64::exp_m1(survival_log))?;
        debug!(
            groups = groups.len(),
            sequences = residuals.attributed_sequences(),
            total,
            "Evaluated placement"
        );
        Ok(total)
    }

    /// Run `runs` simulations with seeds `seed, seed + 1, ...` and summarise.
    ///
    /// # Errors
    ///
    /// Returns an error if `runs` is zero or any run fails.
    pub fn run_many(&self, runs: usize, seed: u64) -> SimResult<SimulationSummary> {
        if runs == 0 {
            return Err(SimulationError::InvalidParameters(
                "at least one run is required".to_string(),
            ));
        }

        let samples = (0..runs as u64)
            .map(|i| self.run(seed.wrapping_add(i)))
            .collect::<SimResult<Vec<_>>>()?;
        let summary = SimulationSummary::from_samples(&samples)?;

        info!(
            runs,
            mean = summary.mean,
            std_error = summary.std_error,
            "Brute-force simulation finished"
        );
        Ok(summary)
    }
}

/// Statistics over repeated simulation runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSummary {
    /// Number of runs.
    pub runs: usize,
    /// Mean annual data-loss probability.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    /// Smallest run result.
    pub min: f64,
    /// Largest run result.
    pub max: f64,
}

impl SimulationSummary {
    /// Summarise run results.
    ///
    /// # Errors
    ///
    /// Returns an error if `samples` is empty.
    pub fn from_samples(samples: &[f64]) -> SimResult<Self> {
        if samples.is_empty() {
            return Err(SimulationError::InvalidParameters(
                "cannot summarise zero runs".to_string(),
            ));
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let std_dev = if samples.len() > 1 {
            let sq: f64 = samples.iter().map(|s| (s - mean).powi(2)).sum();
            (sq / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            runs: samples.len(),
            mean,
            std_dev,
            std_error: std_dev / n.sqrt(),
            min,
            max,
        })
    }

    /// 95% confidence interval of the mean, clipped to [0, 1].
    #[must_use]
    pub fn confidence_interval(&self) -> (f64, f64) {
        let half = Z_95 * self.std_error;
        ((self.mean - half).max(0.0), (self.mean + half).min(1.0))
    }

    /// Whether `value` is within the confidence interval widened by
    /// `rel_tol` of `value`.
    #[must_use]
    pub fn contains(&self, value: f64, rel_tol: f64) -> bool {
        let (low, high) = self.confidence_interval();
        let slack = rel_tol * value.abs();
        value >= low - slack && value <= high + slack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afrcalc_core::RedundancyScheme;

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
    fn test_group_count_and_window() {
        let sim = BruteForceSimulator::new(&scenario_a()).unwrap();
        assert_eq!(sim.group_count(), 800);
        let windows = RecoveryWindows::derive(&scenario_a()).unwrap();
        assert_eq!(sim.window(), windows.disk_heal_time);
    }

    #[test]
    fn test_run_deterministic_for_seed() {
        let sim = BruteForceSimulator::new(&scenario_a()).unwrap();
        assert_eq!(sim.run(5).unwrap(), sim.run(5).unwrap());
    }

    #[test]
    fn test_duplicate_groups_count_once() {
        let sim = BruteForceSimulator::new(&scenario_a()).unwrap();
        let group = PlacementGroup::new(vec![0, 5]);
        let once = sim.evaluate(std::slice::from_ref(&group)).unwrap();
        let thrice = sim.evaluate(&[group.clone(), group.clone(), group]).unwrap();
        assert!(once > 0.0);
        assert_eq!(once, thrice);
    }

    #[test]
    fn test_disjoint_groups_add_up() {
        let sim = BruteForceSimulator::new(&scenario_a()).unwrap();
        let a = PlacementGroup::new(vec![0, 5]);
        let b = PlacementGroup::new(vec![1, 6]);
        let pa = sim.evaluate(std::slice::from_ref(&a)).unwrap();
        let both = sim.evaluate(&[a, b]).unwrap();
        let expected = 1.0 - (1.0 - pa) * (1.0 - pa);
        assert!((both - expected).abs() < 1e-15);
    }

    #[test]
    fn test_empty_placement_is_zero() {
        let sim = BruteForceSimulator::new(&scenario_a()).unwrap();
        assert_eq!(sim.evaluate(&[]).unwrap(), 0.0);
    }

    #[test]
    fn test_run_many_rejects_zero_runs() {
        let sim = BruteForceSimulator::new(&scenario_a()).unwrap();
        assert!(matches!(sim.run_many(0, 1), Err(SimulationError::InvalidParameters(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = scenario_a();
        config.scheme = RedundancyScheme::Replicated { replicas: 5 };
        assert!(BruteForceSimulator::new(&config).is_err());
    }

    #[test]
    fn test_summary_statistics() {
        let summary = SimulationSummary::from_samples(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(summary.runs, 4);
        assert_eq!(summary.mean, 2.5);
        assert!((summary.std_dev - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((summary.std_error - summary.std_dev / 2.0).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn test_summary_interval() {
        let summary = SimulationSummary::from_samples(&[0.1, 0.2, 0.3]).unwrap();
        let (low, high) = summary.confidence_interval();
        assert!(low < summary.mean && summary.mean < high);
        assert!(summary.contains(0.2, 0.0));
        assert!(!summary.contains(0.9, 0.0));
        assert!(summary.contains(high * 1.05, 0.1));

        let single = SimulationSummary::from_samples(&[0.4]).unwrap();
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.confidence_interval(), (0.4, 0.4));
        assert!(SimulationSummary::from_samples(&[]).is_err());
    }
}
