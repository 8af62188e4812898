// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Random placement-group generation with host spread.
//!
//! Each group picks `group_size` distinct hosts, then one drive on each. Drives
//! are numbered host by host: drive `d` lives on host `d / n_drives`.

use std::collections::HashSet;

use afrcalc_core::ClusterConfig;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{SimResult, SimulationError};

/// Drive identifier.
pub type DriveId = u32;

/// Host identifier.
pub type HostId = u32;

/// Default number of host draws per slot before picking directly.
pub const DEFAULT_MAX_RETRIES: usize = 50;

/// Drives holding one redundancy group, in ascending order.
///
/// Keeping members sorted makes identical member sets compare equal no matter
/// in which order their hosts were drawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlacementGroup {
    members: Vec<DriveId>,
}

impl PlacementGroup {
    /// Create a group from its members.
    #[must_use]
    pub fn new(mut members: Vec<DriveId>) -> Self {
        members.sort_unstable();
        Self { members }
    }

    /// Members in ascending order.
    #[must_use]
    pub fn members(&self) -> &[DriveId] {
        &self.members
    }

    /// Hosts of the members, in member order.
    #[cfg(test)]
    fn hosts(&self, n_drives: u32) -> Vec<HostId> {
        self.members.iter().map(|&d| d / n_drives).collect()
    }
}

/// Seedable generator of host-spread placement groups.
#[derive(Debug)]
pub struct PlacementGenerator {
    n_hosts: u32,
    n_drives: u32,
    group_size: usize,
    max_retries: usize,
    rng: StdRng,
}

impl PlacementGenerator {
    /// Create a generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology is empty or has fewer hosts than
    /// members per group.
    pub fn new(
        n_hosts: u32,
        n_drives: u32,
        group_size: usize,
        max_retries: usize,
        seed: u64,
    ) -> SimResult<Self> {
        if n_drives == 0 || group_size == 0 {
            return Err(SimulationError::InvalidParameters(format!(
                "cannot place groups of {group_size} on hosts with {n_drives} drives"
            )));
        }
        if (n_hosts as usize) < group_size {
            return Err(SimulationError::NotEnoughHosts {
                needed: group_size,
                available: n_hosts as usize,
            });
        }
        Ok(Self {
            n_hosts,
            n_drives,
            group_size,
            max_retries: max_retries.max(1),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Create a generator for a cluster configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn for_cluster(config: &ClusterConfig, max_retries: usize, seed: u64) -> SimResult<Self> {
        config.validate()?;
        Self::new(
            config.n_hosts,
            config.n_drives,
            config.group_size() as usize,
            max_retries,
            seed,
        )
    }

    /// Number of groups giving every drive `pgs` group memberships on average.
    #[must_use]
    pub fn group_count(config: &ClusterConfig) -> usize {
        let memberships = config.total_drives() as f64 * config.pgs;
        (memberships / f64::from(config.group_size())).ceil() as usize
    }

    /// Generate one placement group.
    pub fn generate(&mut self) -> PlacementGroup {
        let mut used_hosts: HashSet<HostId> = HashSet::with_capacity(self.group_size);
        let mut members = Vec::with_capacity(self.group_size);

        for _ in 0..self.group_size {
            let host = self.select_host(&used_hosts);
            used_hosts.insert(host);
            let slot = self.rng.gen_range(0..self.n_drives);
            members.push(host * self.n_drives + slot);
        }

        let group = PlacementGroup::new(members);
        trace!(members = ?group.members(), "Generated placement group");
        group
    }

    /// Generate `count` placement groups.
    pub fn generate_all(&mut self, count: usize) -> Vec<PlacementGroup> {
        let groups: Vec<_> = (0..count).map(|_| self.generate()).collect();
        debug!(count, n_hosts = self.n_hosts, n_drives = self.n_drives, "Generated placement");
        groups
    }

    /// Draw a host not used by the group yet.
    ///
    /// Draws uniformly and rejects used hosts; after `max_retries` rejections
    /// picks uniformly among the unused hosts directly.
    fn select_host(&mut self, used: &HashSet<HostId>) -> HostId {
        for _ in 0..self.max_retries {
            let host = self.rng.gen_range(0..self.n_hosts);
            if !used.contains(&host) {
                return host;
            }
        }
        // new() guarantees more hosts than group members
        (0..self.n_hosts).filter(|h| !used.contains(h)).choose(&mut self.rng).unwrap_or(0)
    }
}
