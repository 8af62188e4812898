// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Topology-aware model: each drive only peers with its placement groups.
//!
//! For every drive the annual loss probability is
//! `P(drive fails) * P(some placement group it shares loses enough other
//! members before recovery finishes)`, and likewise for every host. More
//! placement groups per drive mean more peers that can fail, but also more
//! helpers sharing the rebuild when failed data is rebalanced before the drive
//! is replaced. With two replicas both effects are linear in the peer count
//! and cancel out.

use afrcalc_core::{
    any_of, ensure_probability, expected_distinct_draws, saturate_probability, ClusterConfig,
    RecoveryWindows, RedundancyScheme, Result,
};
use serde::Serialize;
use tracing::debug;

use crate::fullmesh::failure_rate_fullmesh;

/// Intermediate quantities and result of the topology-aware model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopologyEstimate {
    /// Drives per placement group.
    pub pg_size: u32,
    /// Non-intersecting placement groups a single drive has on average.
    pub peers: f64,
    /// Non-intersecting placement groups a single host has on average.
    pub host_peers: f64,
    /// Helper counts and recovery windows.
    pub windows: RecoveryWindows,
    /// Probability that a given member fails during a drive recovery window.
    pub disk_heal_fail: f64,
    /// Probability that a given member fails during a host recovery window.
    pub host_heal_fail: f64,
    /// Probability that a placement group dies given one of its drives failed.
    pub disk_pg_fail: f64,
    /// Probability that a placement group dies given one of its hosts failed.
    pub host_pg_fail: f64,
    /// Annual probability that a given drive failure leads to data loss.
    pub drive_loss: f64,
    /// Annual probability that a given host failure leads to data loss.
    pub host_loss: f64,
    /// Annual data-loss probability of the cluster.
    pub total: f64,
}

/// Runs the topology-aware model and returns all intermediate values.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a computed probability
/// leaves the [0, 1] range.
pub fn estimate(config: &ClusterConfig) -> Result<TopologyEstimate> {
    let windows = RecoveryWindows::derive(config)?;

    let pg_size = config.group_size();
    let spread = f64::from(pg_size - 1);
    let n_drives = f64::from(config.n_drives);
    let other_drives = f64::from(config.n_hosts - 1) * n_drives;

    // A drive cannot have more disjoint groups than the other drives can fill.
    // expected_distinct_draws never exceeds other_drives, so the clamp only
    // guards against rounding.
    let max_peers = other_drives / spread;
    let peers = (expected_distinct_draws(other_drives, config.pgs * spread) / spread).min(max_peers);
    let host_peers = (expected_distinct_draws(other_drives, config.pgs * spread * n_drives)
        / spread)
        .min(max_peers);

    let member_rate = config.afr_drive + config.afr_host / n_drives;
    let disk_heal_fail =
        saturate_probability("drive window failure", member_rate * windows.disk_heal_time);
    let host_heal_fail =
        saturate_probability("host window failure", member_rate * windows.host_heal_time);

    let disk_pg_fail = group_failure(config.scheme, disk_heal_fail);
    let host_pg_fail = group_failure(config.scheme, host_heal_fail);

    let drive_loss =
        ensure_probability("drive loss", config.afr_drive * any_of(disk_pg_fail, peers))?;
    let host_loss =
        ensure_probability("host loss", config.afr_host * any_of(host_pg_fail, host_peers))?;

    // Every drive and every host is an independent chance to start a loss
    let drives = config.total_drives() as f64;
    let hosts = f64::from(config.n_hosts);
    let survival_log = drives * (-drive_loss).ln_1p() + hosts * (-host_loss).ln_1p();
    let total = ensure_probability("cluster loss", -survival_log.exp_m1())?;

    debug!(
        pg_size,
        peers,
        host_peers,
        disk_heal_fail,
        host_heal_fail,
        disk_pg_fail,
        host_pg_fail,
        drive_loss,
        host_loss,
        total,
        "Topology-aware estimate"
    );

    Ok(TopologyEstimate {
        pg_size,
        peers,
        host_peers,
        windows,
        disk_heal_fail,
        host_heal_fail,
        disk_pg_fail,
        host_pg_fail,
        drive_loss,
        host_loss,
        total,
    })
}

/// Annual data-loss probability of the cluster.
///
/// # Errors
///
/// See [`estimate`].
pub fn cluster_afr(config: &ClusterConfig) -> Result<f64> {
    estimate(config).map(|e| e.total)
}

/// Probability that the remaining members of a group lose enough data while
/// one member is recovering, each failing with probability `member_fail`.
fn group_failure(scheme: RedundancyScheme, member_fail: f64) -> f64 {
    match scheme {
        RedundancyScheme::Erasure { data, parity } => {
            failure_rate_fullmesh(data + parity - 1, member_fail, parity)
        }
        RedundancyScheme::Replicated { replicas } => {
            member_fail.powi(i32::try_from(replicas - 1).unwrap_or(i32::MAX))
        }
    }
}
