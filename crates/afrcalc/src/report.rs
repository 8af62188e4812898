// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Human-readable and JSON reports.

use afrcalc_core::ClusterConfig;
use afrcalc_model::TopologyEstimate;
use afrcalc_sim::SimulationSummary;
use serde::Serialize;

/// Analytic estimate with the cluster it was computed for.
#[derive(Debug, Serialize)]
pub struct EstimateReport<'a> {
    /// Cluster parameters in core units.
    pub cluster: &'a ClusterConfig,
    /// Model breakdown.
    pub estimate: &'a TopologyEstimate,
}

/// Full-mesh estimate.
#[derive(Debug, Serialize)]
pub struct FullmeshReport {
    /// Total drives.
    pub drives: u32,
    /// Drive AFR as a fraction.
    pub afr: f64,
    /// Recovery time in days.
    pub days: f64,
    /// Replicas.
    pub replicas: u32,
    /// Annual data-loss probability.
    pub probability: f64,
}

/// Brute-force simulation result.
#[derive(Debug, Serialize)]
pub struct SimulationReport<'a> {
    /// Cluster parameters in core units.
    pub cluster: &'a ClusterConfig,
    /// Base seed of the runs.
    pub seed: u64,
    /// Placement groups per run.
    pub groups: usize,
    /// Run statistics.
    pub summary: SimulationSummary,
}

/// Analytic estimate next to the simulation.
#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    /// Cluster parameters in core units.
    pub cluster: &'a ClusterConfig,
    /// Base seed of the runs.
    pub seed: u64,
    /// Analytic annual data-loss probability.
    pub analytic: f64,
    /// Simulation statistics.
    pub simulation: SimulationSummary,
    /// `|simulation - analytic| / analytic`.
    pub relative_difference: f64,
    /// Whether the analytic value lies in the 95% confidence interval.
    pub analytic_in_interval: bool,
}

impl<'a> ComparisonReport<'a> {
    /// Build a comparison.
    pub fn new(
        cluster: &'a ClusterConfig,
        seed: u64,
        analytic: f64,
        simulation: SimulationSummary,
    ) -> Self {
        let relative_difference = if analytic > 0.0 {
            (simulation.mean - analytic).abs() / analytic
        } else if simulation.mean > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        Self {
            cluster,
            seed,
            analytic,
            simulation,
            relative_difference,
            analytic_in_interval: simulation.contains(analytic, 0.0),
        }
    }
}

/// Rounds a percentage to four significant decimals.
///
/// Whole-number parts keep four decimals; a fractional part below 0.1 gets
/// one more decimal per leading zero so small results stay readable.
#[must_use]
pub fn round_percent(n: f64) -> f64 {
    if !n.is_finite() {
        return n;
    }
    let mut p = n.fract().abs();
    let mut m = 10_000.0;
    while p != 0.0 && p < 0.1 && m < 1e18 {
        p *= 10.0;
        m *= 10.0;
    }
    (n * m).round() / m
}

/// Formats a probability as a percentage.
#[must_use]
pub fn format_percent(probability: f64) -> String {
    format!("{} %", round_percent(probability * 100.0))
}

fn describe_cluster(cluster: &ClusterConfig) -> String {
    format!(
        "{} hosts x {} drives, {}, {} pgs per drive",
        cluster.n_hosts, cluster.n_drives, cluster.scheme, cluster.pgs
    )
}

/// Print an analytic estimate.
pub fn print_estimate(report: &EstimateReport<'_>, explain: bool) {
    let e = report.estimate;
    println!("\n  Cluster:     {}", describe_cluster(report.cluster));
    println!("  Annual data loss probability: {}", format_percent(e.total));

    if explain {
        let w = &e.windows;
        println!("  ─────────────────────────────────────────────────────");
        println!("  Peers per drive:            {:.3}", e.peers);
        println!("  Peers per host:             {:.3}", e.host_peers);
        println!("  Resilver helpers (drive):   {:.3}", w.resilver_peers);
        println!("  Resilver helpers (host):    {:.3}", w.host_resilver_peers);
        println!("  Recovery speed:             {:.1} MB/s", w.speed * 1000.0);
        println!("  Drive recovery:             {:.4} days", w.disk_heal_days());
        println!("  Host recovery:              {:.4} days", w.host_heal_days());
        println!("  Member fails (drive window): {:e}", e.disk_heal_fail);
        println!("  Member fails (host window):  {:e}", e.host_heal_fail);
        println!("  Group dies (drive window):   {:e}", e.disk_pg_fail);
        println!("  Group dies (host window):    {:e}", e.host_pg_fail);
        println!("  Loss per drive failure:     {}", format_percent(e.drive_loss));
        println!("  Loss per host failure:      {}", format_percent(e.host_loss));
    }
    println!();
}

/// Print a full-mesh estimate.
pub fn print_fullmesh(report: &FullmeshReport) {
    println!(
        "\n  {} drives, {} replicas, AFR {}, {} days recovery",
        report.drives,
        report.replicas,
        format_percent(report.afr),
        report.days
    );
    println!("  Annual data loss probability: {}\n", format_percent(report.probability));
}

/// Print a simulation result.
pub fn print_simulation(report: &SimulationReport<'_>) {
    let s = &report.summary;
    let (low, high) = s.confidence_interval();
    println!("\n  Cluster:     {}", describe_cluster(report.cluster));
    println!("  Runs:        {} ({} groups each, seed {})", s.runs, report.groups, report.seed);
    println!("  Annual data loss probability: {}", format_percent(s.mean));
    println!("  95% interval: {} .. {}", format_percent(low), format_percent(high));
    println!("  Range:        {} .. {}\n", format_percent(s.min), format_percent(s.max));
}

/// Print a comparison.
pub fn print_comparison(report: &ComparisonReport<'_>) {
    let (low, high) = report.simulation.confidence_interval();
    println!("\n  Cluster:     {}", describe_cluster(report.cluster));
    println!("  Analytic:    {}", format_percent(report.analytic));
    println!(
        "  Simulation:  {} ({} runs, 95% interval {} .. {})",
        format_percent(report.simulation.mean),
        report.simulation.runs,
        format_percent(low),
        format_percent(high)
    );
    println!("  Difference:  {:.1}%", report.relative_difference * 100.0);
    let verdict = if report.analytic_in_interval { "yes" } else { "no" };
    println!("  Analytic within interval: {verdict}\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * b.abs().max(1e-12)
    }

    #[test]
    fn test_round_percent_whole_part() {
        assert!(close(round_percent(12.345678), 12.3457));
        assert_eq!(round_percent(3.0), 3.0);
        assert_eq!(round_percent(0.0), 0.0);
    }

    #[test]
    fn test_round_percent_small_values() {
        assert!(close(round_percent(0.0203), 0.0203));
        assert!(close(round_percent(0.000123456), 0.0001235));
        assert!(close(round_percent(0.02031234), 0.02031));
    }

    #[test]
    fn test_round_percent_negative_and_tiny() {
        assert!(close(round_percent(-0.0203456), -0.02035));
        let tiny = round_percent(1e-300);
        assert!(tiny.is_finite());
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.5), "50 %");
        assert_eq!(format_percent(0.000203), "0.0203 %");
    }

    #[test]
    fn test_comparison_relative_difference() {
        let cluster = ClusterConfig::default();
        let summary = SimulationSummary::from_samples(&[0.011, 0.009, 0.010]).unwrap();
        let report = ComparisonReport::new(&cluster, 1, 0.01, summary);
        assert!(report.relative_difference < 1e-9);
        assert!(report.analytic_in_interval);

        let report = ComparisonReport::new(&cluster, 1, 0.0, summary);
        assert!(report.relative_difference.is_infinite());
    }
}
