// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Not-yet-attributed failure probability per failure sequence.
//!
//! A group dies when its failure sequence is completed: some members fail and,
//! while they are still recovering, one more member fails. The probability of
//! that last failure belongs to the completed set of drives, not to the group
//! that happens to contain it. Two groups sharing the same drives (duplicate
//! pairs, or erasure-coded groups sharing `parity + 1` members) would otherwise
//! count the same physical event twice.
//!
//! The map starts every sequence at the drive AFR. Once a group has used a
//! sequence, its residual is consumed and later groups see what is left.
//!
//! Residuals are tracked per completed set of drives rather than per drive.
//! A drive taking part in several distinct death sets can therefore have more
//! than its AFR attributed in total; only each individual set is bounded by
//! the AFR. Zeroing a drive after its first group would instead cap its
//! contribution at one peer group, and the result would stop growing with
//! the number of distinct peers.

use std::collections::HashMap;

use tracing::trace;

use crate::placement::DriveId;

/// Residual failure probability keyed by the ascending set of drives whose
/// joint failure completes a group death.
///
/// Owned by one simulation run and threaded through group processing.
#[derive(Debug, Clone)]
pub struct ResidualFailureMap {
    afr: f64,
    consumed: HashMap<Vec<DriveId>, f64>,
}

impl ResidualFailureMap {
    /// Create a map where every sequence starts at `afr`.
    #[must_use]
    pub fn new(afr: f64) -> Self {
        Self {
            afr: afr.clamp(0.0, 1.0),
            consumed: HashMap::new(),
        }
    }

    /// Annual failure rate of a fresh sequence.
    #[must_use]
    pub fn afr(&self) -> f64 {
        self.afr
    }

    /// Residual failure probability of `drive` completing the sequence that
    /// already failed `prefix`.
    ///
    /// `prefix` must be ascending and below `drive`.
    #[must_use]
    pub fn residual(&self, prefix: &[DriveId], drive: DriveId) -> f64 {
        self.residual_of(&sequence_key(prefix, drive))
    }

    /// Same as [`residual`](Self::residual) for an already assembled sequence.
    #[must_use]
    pub fn residual_of(&self, sequence: &[DriveId]) -> f64 {
        self.consumed.get(sequence).copied().unwrap_or(self.afr)
    }

    /// Attribute `amount` of the sequence's residual probability.
    ///
    /// The residual never drops below zero, even if floating-point error
    /// makes `amount` slightly larger than what is left.
    pub fn consume(&mut self, sequence: &[DriveId], amount: f64) {
        let afr = self.afr;
        let left = self.consumed.entry(sequence.to_vec()).or_insert(afr);
        *left = (*left - amount.max(0.0)).max(0.0);
        trace!(?sequence, amount, left = *left, "Consumed residual failure probability");
    }

    /// Number of sequences that have been (partly) attributed.
    #[must_use]
    pub fn attributed_sequences(&self) -> usize {
        self.consumed.len()
    }
}

/// Ascending key for `prefix` followed by `drive`.
pub(crate) fn sequence_key(prefix: &[DriveId], drive: DriveId) -> Vec<DriveId> {
    debug_assert!(prefix.windows(2).all(|w| w[0] < w[1]));
    debug_assert!(prefix.last().map_or(true, |&last| last < drive));
    let mut key = Vec::with_capacity(prefix.len() + 1);
    key.extend_from_slice(prefix);
    key.push(drive);
    key
}
