// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Command line interface definition.
//!
//! Flags use the units of the calculator form (percent, TB, MB/s) and are
//! converted to the core units when applied to a [`ClusterConfig`].

use std::path::PathBuf;

use afrcalc_core::{ClusterConfig, RedundancyScheme, SimulationConfig};
use clap::{Args, Parser, Subcommand};

/// afrcalc: annual data-loss probability of replicated and erasure-coded clusters.
#[derive(Parser)]
#[command(name = "afrcalc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Topology-aware analytic estimate.
    Estimate(EstimateArgs),
    /// Full-mesh estimate, ignoring placement groups.
    Fullmesh(FullmeshArgs),
    /// Brute-force simulation over random placements.
    Simulate(SimulateArgs),
    /// Analytic estimate and simulation side by side.
    Compare(SimulateArgs),
    /// Print version information.
    Version,
}

/// Output format for CLI commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// Cluster parameters shared by the estimators.
///
/// Every flag overrides the matching value of the configuration file.
#[derive(Args, Debug, Default)]
pub struct ClusterArgs {
    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of hosts.
    #[arg(long)]
    pub hosts: Option<u32>,

    /// Drives per host.
    #[arg(long)]
    pub drives: Option<u32>,

    /// Drive capacity in TB.
    #[arg(long)]
    pub capacity: Option<f64>,

    /// Drive annual failure rate in percent.
    #[arg(long)]
    pub afr_drive: Option<f64>,

    /// Host annual failure rate in percent.
    #[arg(long)]
    pub afr_host: Option<f64>,

    /// Recovery speed per drive in MB/s.
    #[arg(long)]
    pub speed: Option<f64>,

    /// Drive recovery time in hours, used instead of a speed.
    #[arg(long)]
    pub disk_heal_hours: Option<f64>,

    /// Host recovery time in hours.
    #[arg(long)]
    pub host_heal_hours: Option<f64>,

    /// Number of replicas.
    #[arg(long, conflicts_with_all = ["ec_data", "ec_parity"])]
    pub replicas: Option<u32>,

    /// Erasure-coding data chunks.
    #[arg(long)]
    pub ec_data: Option<u32>,

    /// Erasure-coding parity chunks.
    #[arg(long)]
    pub ec_parity: Option<u32>,

    /// Placement groups per drive.
    #[arg(long)]
    pub pgs: Option<f64>,

    /// Failed drives are removed and their data rebalanced to other hosts.
    #[arg(long)]
    pub osd_rm: bool,

    /// Failed drives are replaced at once and rebuilt by a single helper.
    #[arg(long)]
    pub eager: bool,

    /// Seconds before a failed drive is marked out.
    #[arg(long)]
    pub down_out_interval: Option<f64>,
}

impl ClusterArgs {
    /// Apply the flags to `config`, converting to core units.
    pub fn apply(&self, config: &mut ClusterConfig) {
        if let Some(hosts) = self.hosts {
            config.n_hosts = hosts;
        }
        if let Some(drives) = self.drives {
            config.n_drives = drives;
        }
        if let Some(tb) = self.capacity {
            config.capacity = tb * 1000.0;
        }
        if let Some(percent) = self.afr_drive {
            config.afr_drive = percent / 100.0;
        }
        if let Some(percent) = self.afr_host {
            config.afr_host = percent / 100.0;
        }
        if let Some(hours) = self.disk_heal_hours {
            config.disk_heal_hours = Some(hours);
            config.speed = None;
        }
        if let Some(mbps) = self.speed {
            config.speed = Some(mbps / 1000.0);
        }
        if let Some(hours) = self.host_heal_hours {
            config.host_heal_hours = Some(hours);
        }

        if let Some(replicas) = self.replicas {
            config.scheme = RedundancyScheme::Replicated { replicas };
        } else if self.ec_data.is_some() || self.ec_parity.is_some() {
            let (data, parity) = match config.scheme {
                RedundancyScheme::Erasure { data, parity } => (data, parity),
                RedundancyScheme::Replicated { .. } => (2, 1),
            };
            config.scheme = RedundancyScheme::Erasure {
                data: self.ec_data.unwrap_or(data),
                parity: self.ec_parity.unwrap_or(parity),
            };
        }

        if let Some(pgs) = self.pgs {
            config.pgs = pgs;
        }
        if self.osd_rm {
            config.osd_rm = true;
        }
        if self.eager {
            config.degraded_replacement = true;
        }
        if let Some(seconds) = self.down_out_interval {
            config.down_out_interval = seconds;
        }
    }
}

/// Arguments for the estimate command.
#[derive(Args)]
pub struct EstimateArgs {
    /// Cluster parameters.
    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Print intermediate quantities.
    #[arg(long)]
    pub explain: bool,

    /// Output format (text, json).
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the fullmesh command.
#[derive(Args)]
pub struct FullmeshArgs {
    /// Total number of drives.
    #[arg(long, default_value = "100")]
    pub drives: u32,

    /// Drive annual failure rate in percent.
    #[arg(long, default_value = "3")]
    pub afr: f64,

    /// Recovery time in days.
    #[arg(long, default_value = "1")]
    pub days: f64,

    /// Number of replicas.
    #[arg(long, default_value = "2")]
    pub replicas: u32,

    /// Output format (text, json).
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the simulate and compare commands.
#[derive(Args)]
pub struct SimulateArgs {
    /// Cluster parameters.
    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Number of simulation runs.
    #[arg(long)]
    pub runs: Option<usize>,

    /// Base seed; runs use consecutive seeds.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Host draws per placement slot before picking an unused host directly.
    #[arg(long)]
    pub max_retries: Option<usize>,

    /// Output format (text, json).
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

impl SimulateArgs {
    /// Apply the simulation flags to `config`.
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let cli = Cli::parse_from(["afrcalc", "version"]);
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_estimate_parsing() {
        let cli = Cli::parse_from([
            "afrcalc",
            "estimate",
            "--hosts",
            "4",
            "--drives",
            "4",
            "--afr-drive",
            "5",
            "--capacity",
            "4",
            "--speed",
            "100",
            "--pgs",
            "100",
            "--explain",
        ]);
        if let Commands::Estimate(args) = cli.command {
            assert!(args.explain);
            assert_eq!(args.format, OutputFormat::Text);

            let mut config = ClusterConfig::default();
            args.cluster.apply(&mut config);
            assert_eq!(config.n_hosts, 4);
            assert_eq!(config.n_drives, 4);
            assert!((config.afr_drive - 0.05).abs() < 1e-12);
            assert_eq!(config.capacity, 4000.0);
            assert_eq!(config.speed, Some(0.1));
            assert_eq!(config.pgs, 100.0);
            // Untouched values keep their defaults
            assert_eq!(config.afr_host, 0.05);
        } else {
            panic!("Expected Estimate command");
        }
    }

    #[test]
    fn test_erasure_flags() {
        let cli = Cli::parse_from(["afrcalc", "estimate", "--ec-parity", "2"]);
        if let Commands::Estimate(args) = cli.command {
            let mut config = ClusterConfig::default();
            args.cluster.apply(&mut config);
            assert_eq!(config.scheme, RedundancyScheme::Erasure { data: 2, parity: 2 });
        } else {
            panic!("Expected Estimate command");
        }
    }

    #[test]
    fn test_replicas_conflict_with_erasure() {
        let result =
            Cli::try_parse_from(["afrcalc", "estimate", "--replicas", "3", "--ec-data", "4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_heal_hours_replace_speed() {
        let cli = Cli::parse_from(["afrcalc", "estimate", "--disk-heal-hours", "12", "--eager"]);
        if let Commands::Estimate(args) = cli.command {
            let mut config = ClusterConfig::default();
            args.cluster.apply(&mut config);
            assert_eq!(config.speed, None);
            assert_eq!(config.disk_heal_hours, Some(12.0));
            assert!(config.degraded_replacement);
        } else {
            panic!("Expected Estimate command");
        }
    }

    #[test]
    fn test_simulate_parsing() {
        let cli = Cli::parse_from([
            "afrcalc", "simulate", "--runs", "50", "--seed", "7", "--format", "json",
        ]);
        if let Commands::Simulate(args) = cli.command {
            assert_eq!(args.format, OutputFormat::Json);
            let mut sim = SimulationConfig::default();
            args.apply(&mut sim);
            assert_eq!(sim.runs, 50);
            assert_eq!(sim.seed, Some(7));
            assert_eq!(sim.max_retries, 50);
        } else {
            panic!("Expected Simulate command");
        }
    }

    #[test]
    fn test_fullmesh_defaults() {
        let cli = Cli::parse_from(["afrcalc", "fullmesh"]);
        if let Commands::Fullmesh(args) = cli.command {
            assert_eq!(args.drives, 100);
            assert_eq!(args.afr, 3.0);
            assert_eq!(args.days, 1.0);
            assert_eq!(args.replicas, 2);
        } else {
            panic!("Expected Fullmesh command");
        }
    }
}
