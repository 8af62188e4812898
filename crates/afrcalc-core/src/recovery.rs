// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Recovery window derivation.
//!
//! After a drive or host fails, its data is rebuilt by a set of helper drives.
//! The time this takes is the window during which further failures in the same
//! placement group can destroy data. Windows are expressed in years so they can
//! be multiplied directly by annualized failure rates.

use serde::Serialize;
use tracing::{debug, warn};

use crate::combinatorics::expected_distinct_draws;
use crate::config::ClusterConfig;
use crate::error::Result;

/// Days per year used for all rate conversions.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Seconds per year used for all rate conversions.
pub const SECONDS_PER_YEAR: f64 = 86_400.0 * DAYS_PER_YEAR;

const HOURS_PER_YEAR: f64 = 24.0 * DAYS_PER_YEAR;

/// Helper counts and recovery windows for a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecoveryWindows {
    /// Drives taking part in rebuilding one failed drive.
    pub resilver_peers: f64,
    /// Drives taking part in rebuilding one failed host.
    pub host_resilver_peers: f64,
    /// Per-helper recovery throughput in GB/s, given or back-derived.
    pub speed: f64,
    /// Time to recover a failed drive, in years.
    pub disk_heal_time: f64,
    /// Time to recover a failed host, in years.
    pub host_heal_time: f64,
}

impl RecoveryWindows {
    /// Derives helper counts and recovery windows from a configuration.
    ///
    /// With a recovery `speed`, the drive window is the `down_out_interval`
    /// plus the drive capacity split across all helpers (a single helper with
    /// `degraded_replacement`). With only `disk_heal_hours`, the window is taken
    /// as given and the speed is back-derived so the host window stays
    /// consistent with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn derive(config: &ClusterConfig) -> Result<Self> {
        config.validate()?;

        let pgs = config.pgs;
        let n_drives = f64::from(config.n_drives);
        let other_drives = f64::from(config.n_hosts - 1) * n_drives;

        let resilver_peers = if config.n_drives == 1 || config.osd_rm {
            expected_distinct_draws(other_drives, pgs)
        } else {
            expected_distinct_draws(n_drives - 1.0, pgs)
        };
        let host_resilver_peers = expected_distinct_draws(other_drives, n_drives * pgs);
        let helpers = if config.degraded_replacement { 1.0 } else { resilver_peers };

        let (disk_heal_time, speed) = match (config.speed, config.disk_heal_hours) {
            (Some(speed), hours) => {
                if hours.is_some() {
                    warn!("Both speed and disk_heal_hours given, using speed");
                }
                let seconds = config.down_out_interval + config.capacity / helpers / speed;
                (seconds / SECONDS_PER_YEAR, speed)
            }
            // validate() guarantees one of the two is present
            (None, hours) => {
                let hours = hours.unwrap_or_default();
                let speed =
                    config.capacity / helpers / (hours * 3600.0 - config.down_out_interval);
                (hours / HOURS_PER_YEAR, speed)
            }
        };

        let host_heal_time = match config.host_heal_hours {
            Some(hours) => hours / HOURS_PER_YEAR,
            None => {
                (config.down_out_interval + n_drives * config.capacity / host_resilver_peers / speed)
                    / SECONDS_PER_YEAR
            }
        };

        debug!(
            resilver_peers,
            host_resilver_peers,
            speed,
            disk_heal_days = disk_heal_time * DAYS_PER_YEAR,
            host_heal_days = host_heal_time * DAYS_PER_YEAR,
            "Derived recovery windows"
        );

        Ok(Self { resilver_peers, host_resilver_peers, speed, disk_heal_time, host_heal_time })
    }

    /// Drive recovery window in days.
    #[must_use]
    pub fn disk_heal_days(&self) -> f64 {
        self.disk_heal_time * DAYS_PER_YEAR
    }

    /// Host recovery window in days.
    #[must_use]
    pub fn host_heal_days(&self) -> f64 {
        self.host_heal_time * DAYS_PER_YEAR
    }
}
