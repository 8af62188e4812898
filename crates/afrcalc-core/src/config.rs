// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Configuration management for afrcalc.
//!
//! All quantities use core units: capacities in GB, recovery speed in GB/s per
//! recovering drive, failure rates as fractions, `down_out_interval` in seconds.
//! Converting from display units (percent, TB, MB/s) is the caller's job.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Cluster being evaluated.
    pub cluster: ClusterConfig,
    /// Brute-force simulation settings.
    pub simulation: SimulationConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Redundancy scheme of a placement group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RedundancyScheme {
    /// Full copies on `replicas` drives.
    Replicated {
        /// Number of copies.
        replicas: u32,
    },
    /// Erasure coding with `data` data chunks and `parity` parity chunks.
    Erasure {
        /// Number of data chunks.
        data: u32,
        /// Number of parity chunks.
        parity: u32,
    },
}

impl RedundancyScheme {
    /// Number of drives holding one placement group.
    #[must_use]
    pub const fn group_size(&self) -> u32 {
        match self {
            Self::Replicated { replicas } => *replicas,
            Self::Erasure { data, parity } => *data + *parity,
        }
    }

    /// Number of members that may be lost without losing data.
    #[must_use]
    pub const fn tolerance(&self) -> u32 {
        match self {
            Self::Replicated { replicas } => replicas.saturating_sub(1),
            Self::Erasure { parity, .. } => *parity,
        }
    }

    /// Whether this is an erasure-coded scheme.
    #[must_use]
    pub const fn is_erasure(&self) -> bool {
        matches!(self, Self::Erasure { .. })
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Self::Replicated { replicas } => {
                if replicas < 2 {
                    return Err(Error::invalid(format!(
                        "replicas must be at least 2, got {replicas}"
                    )));
                }
            }
            Self::Erasure { data, parity } => {
                if data == 0 {
                    return Err(Error::invalid("ec data chunks must be at least 1"));
                }
                if parity == 0 {
                    return Err(Error::invalid("ec parity chunks must be at least 1"));
                }
            }
        }
        Ok(())
    }
}

impl Default for RedundancyScheme {
    fn default() -> Self {
        Self::Replicated { replicas: 2 }
    }
}

impl std::fmt::Display for RedundancyScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replicated { replicas } => write!(f, "{replicas} replicas"),
            Self::Erasure { data, parity } => write!(f, "EC {data}+{parity}"),
        }
    }
}

/// Cluster parameters consumed by both estimators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of hosts.
    pub n_hosts: u32,
    /// Drives per host.
    pub n_drives: u32,
    /// Capacity of one drive in GB.
    pub capacity: f64,
    /// Annualized failure rate of a drive.
    pub afr_drive: f64,
    /// Annualized failure rate of a whole host (all its drives at once).
    pub afr_host: f64,
    /// Recovery throughput of a single helper drive in GB/s.
    pub speed: Option<f64>,
    /// Direct drive recovery duration, used when `speed` is absent.
    pub disk_heal_hours: Option<f64>,
    /// Direct host recovery duration; derived from throughput when absent.
    pub host_heal_hours: Option<f64>,
    /// Redundancy scheme.
    pub scheme: RedundancyScheme,
    /// Placement groups per drive.
    pub pgs: f64,
    /// Rebalance a failed drive's data across other hosts instead of the same host.
    pub osd_rm: bool,
    /// Replace failed drives immediately, with a single drive doing the recovery.
    pub degraded_replacement: bool,
    /// Fixed delay in seconds before recovery starts.
    pub down_out_interval: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            n_hosts: 10,
            n_drives: 10,
            capacity: 8000.0,
            afr_drive: 0.03,
            afr_host: 0.05,
            speed: Some(0.02),
            disk_heal_hours: None,
            host_heal_hours: None,
            scheme: RedundancyScheme::default(),
            pgs: 50.0,
            osd_rm: false,
            degraded_replacement: false,
            down_out_interval: 0.0,
        }
    }
}

impl ClusterConfig {
    /// Number of drives in one placement group.
    #[must_use]
    pub const fn group_size(&self) -> u32 {
        self.scheme.group_size()
    }

    /// Total number of drives in the cluster.
    #[must_use]
    pub fn total_drives(&self) -> u64 {
        u64::from(self.n_hosts) * u64::from(self.n_drives)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for out-of-range or inconsistent values
    /// and [`Error::MissingParameter`] when neither a recovery speed nor a
    /// recovery duration is supplied.
    pub fn validate(&self) -> Result<()> {
        if self.n_hosts == 0 {
            return Err(Error::invalid("n_hosts must be at least 1"));
        }
        if self.n_drives == 0 {
            return Err(Error::invalid("n_drives must be at least 1"));
        }
        check_rate("afr_drive", self.afr_drive)?;
        check_rate("afr_host", self.afr_host)?;

        self.scheme.validate()?;
        let group_size = self.group_size();
        if self.n_hosts < group_size {
            return Err(Error::invalid(format!(
                "{} needs at least {group_size} hosts, got {}",
                self.scheme, self.n_hosts
            )));
        }

        if !self.pgs.is_finite() || self.pgs <= 0.0 {
            return Err(Error::invalid(format!("pgs must be positive, got {}", self.pgs)));
        }
        if !self.down_out_interval.is_finite() || self.down_out_interval < 0.0 {
            return Err(Error::invalid(format!(
                "down_out_interval must be non-negative, got {}",
                self.down_out_interval
            )));
        }

        match (self.speed, self.disk_heal_hours) {
            (Some(speed), _) => {
                if !speed.is_finite() || speed <= 0.0 {
                    return Err(Error::invalid(format!("speed must be positive, got {speed}")));
                }
                check_capacity(self.capacity)?;
            }
            (None, Some(hours)) => {
                if !hours.is_finite() || hours * 3600.0 <= self.down_out_interval {
                    return Err(Error::invalid(format!(
                        "disk_heal_hours ({hours}) must exceed down_out_interval ({}s)",
                        self.down_out_interval
                    )));
                }
                check_capacity(self.capacity)?;
            }
            (None, None) => return Err(Error::MissingParameter("speed or disk_heal_hours")),
        }

        if let Some(hours) = self.host_heal_hours {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(Error::invalid(format!(
                    "host_heal_hours must be positive, got {hours}"
                )));
            }
        }

        Ok(())
    }
}

fn check_rate(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(Error::invalid(format!("{name} must be within [0, 1], got {value}")));
    }
    Ok(())
}

fn check_capacity(capacity: f64) -> Result<()> {
    if !capacity.is_finite() || capacity <= 0.0 {
        return Err(Error::invalid(format!("capacity must be positive, got {capacity}")));
    }
    Ok(())
}

/// Brute-force simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent runs to average.
    pub runs: usize,
    /// Base seed; a random one is picked when absent.
    pub seed: Option<u64>,
    /// Host draws per placement-group slot before falling back to a direct pick.
    pub max_retries: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { runs: 1000, seed: None, max_retries: 50 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// JSON format.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// Log output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::Pretty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_default_config_is_valid() {
        ClusterConfig::default().validate().unwrap();
        let config = ClusterConfig::default();
        assert_eq!(config.n_hosts, 10);
        assert_eq!(config.n_drives, 10);
        assert_eq!(config.group_size(), 2);
        assert_eq!(config.total_drives(), 100);
    }

    #[test]
    fn test_scheme_sizes() {
        let repl = RedundancyScheme::Replicated { replicas: 3 };
        assert_eq!(repl.group_size(), 3);
        assert_eq!(repl.tolerance(), 2);
        assert!(!repl.is_erasure());

        let ec = RedundancyScheme::Erasure { data: 4, parity: 2 };
        assert_eq!(ec.group_size(), 6);
        assert_eq!(ec.tolerance(), 2);
        assert!(ec.is_erasure());
        assert_eq!(ec.to_string(), "EC 4+2");
    }

    #[test]
    fn test_invalid_dimensions() {
        let mut config = scenario_a();
        config.n_hosts = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = scenario_a();
        config.n_drives = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rates() {
        let mut config = scenario_a();
        config.afr_drive = 1.5;
        assert!(config.validate().is_err());

        let mut config = scenario_a();
        config.afr_host = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_scheme() {
        let mut config = scenario_a();
        config.scheme = RedundancyScheme::Replicated { replicas: 1 };
        assert!(config.validate().is_err());

        config.scheme = RedundancyScheme::Erasure { data: 2, parity: 0 };
        assert!(config.validate().is_err());

        config.scheme = RedundancyScheme::Erasure { data: 0, parity: 2 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_not_enough_hosts_for_spread() {
        let mut config = scenario_a();
        config.scheme = RedundancyScheme::Erasure { data: 4, parity: 2 };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least 6 hosts"));
    }

    #[test]
    fn test_missing_recovery_inputs() {
        let mut config = scenario_a();
        config.speed = None;
        config.disk_heal_hours = None;
        assert!(matches!(config.validate(), Err(Error::MissingParameter(_))));

        config.disk_heal_hours = Some(12.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_heal_hours_must_exceed_down_out() {
        let mut config = scenario_a();
        config.speed = None;
        config.disk_heal_hours = Some(1.0);
        config.down_out_interval = 3600.0;
        assert!(config.validate().is_err());

        config.down_out_interval = 600.0;
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_speed_and_pgs() {
        let mut config = scenario_a();
        config.speed = Some(0.0);
        assert!(config.validate().is_err());

        let mut config = scenario_a();
        config.pgs = 0.0;
        assert!(config.validate().is_err());

        let mut config = scenario_a();
        config.down_out_interval = -1.0;
        assert!(config.validate().is_err());

        let mut config = scenario_a();
        config.host_heal_hours = Some(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::parse(
            r#"
            [cluster]
            n_hosts = 6
            n_drives = 12
            afr_drive = 0.02
            pgs = 100
            down_out_interval = 600

            [cluster.scheme]
            type = "erasure"
            data = 4
            parity = 2

            [simulation]
            runs = 200
            seed = 42

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.cluster.n_hosts, 6);
        assert_eq!(config.cluster.scheme, RedundancyScheme::Erasure { data: 4, parity: 2 });
        assert_eq!(config.cluster.down_out_interval, 600.0);
        // Unspecified fields keep defaults
        assert_eq!(config.cluster.speed, Some(0.02));
        assert_eq!(config.simulation.runs, 200);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.max_retries, 50);
        assert_eq!(config.logging.format, LogFormat::Json);
        config.cluster.validate().unwrap();
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(matches!(Config::parse("cluster = 3"), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.cluster, ClusterConfig::default());
        assert_eq!(config.simulation.runs, 1000);
        assert_eq!(config.logging.level, "warn");
    }
}
