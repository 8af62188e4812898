// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Probability that one placement group dies in a cascade of failures.
//!
//! The first failing member opens a recovery window. The group dies if enough
//! further members fail while earlier ones are still recovering. With `s`
//! overlapping windows of length `l`, the chance that `s` failures line up is
//! `s * (rate * l)^(s-1)` per first failure, rather than `(rate * l)^(s-1)`: any
//! of the members may be the last to recover. The `s` is spread over the
//! cascade as one [`pyramid_factor`] per member.

use serde::Serialize;
use tracing::trace;

use crate::placement::DriveId;
use crate::residual::{sequence_key, ResidualFailureMap};

/// Window-overlap correction for the `m`-th failure of a cascade (1-based).
///
/// `1 + 1/(m-1)` for `m >= 2`; the factors for `2..=s` multiply to `s`.
#[must_use]
pub fn pyramid_factor(m: usize) -> f64 {
    if m <= 1 {
        1.0
    } else {
        1.0 + 1.0 / (m - 1) as f64
    }
}

/// A completed failure sequence recorded while evaluating a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeDeath {
    /// Ascending drives whose joint failure killed the group.
    pub sequence: Vec<DriveId>,
    /// Residual probability of the completing failure that was used.
    pub residual: f64,
    /// Probability mass of this death path.
    pub mass: f64,
}

/// Evaluates group deaths against a residual map without mutating it.
///
/// Deaths are collected and handed back through [`into_deaths`](Self::into_deaths)
/// so the caller can consume them once the whole group is evaluated.
#[derive(Debug)]
pub struct Cascade<'a> {
    residuals: &'a ResidualFailureMap,
    window: f64,
    tolerance: usize,
    deaths: Vec<CascadeDeath>,
}

impl<'a> Cascade<'a> {
    /// Create a cascade evaluator.
    ///
    /// `window` is the recovery window in years, `tolerance` the number of
    /// members a group survives losing.
    #[must_use]
    pub fn new(residuals: &'a ResidualFailureMap, window: f64, tolerance: usize) -> Self {
        Self {
            residuals,
            window: window.max(0.0),
            tolerance,
            deaths: Vec::new(),
        }
    }

    /// Probability that the group with ascending `members` dies.
    ///
    /// Groups that die only when every member fails take the closed product
    /// form; others branch through [`pg_death_combinations`](Self::pg_death_combinations).
    pub fn group_death(&mut self, members: &[DriveId]) -> f64 {
        if members.len() == self.tolerance + 1 {
            self.replication_death(members)
        } else {
            let mut failed = Vec::with_capacity(self.tolerance + 1);
            self.pg_death_combinations(members, &mut failed, 1.0)
        }
    }

    /// Death probability of a group that is lost only when all members fail.
    ///
    /// Every member before the last fails at the full AFR; the last one at
    /// the residual of the completed sequence.
    pub fn replication_death(&mut self, members: &[DriveId]) -> f64 {
        let Some((&last, prefix)) = members.split_last() else {
            return 0.0;
        };

        let afr = self.residuals.afr();
        let leading: f64 = (0..prefix.len())
            .map(|i| self.member_failure(i + 1, afr))
            .product();
        if leading <= 0.0 {
            return 0.0;
        }

        let residual = self.residuals.residual(prefix, last);
        let mass = leading * self.member_failure(members.len(), residual);
        self.record(prefix, last, residual, mass);
        mass
    }

    /// Sums the probability of every failure path through `remaining` that
    /// brings the failed count past the tolerance.
    ///
    /// Each member either fails, joining `failed`, or survives; both branches
    /// carry their share of `mass`. A path ends in a group death as soon as
    /// `tolerance + 1` members failed, and contributes nothing once its mass
    /// is gone or too few members remain.
    pub fn pg_death_combinations(
        &mut self,
        remaining: &[DriveId],
        failed: &mut Vec<DriveId>,
        mass: f64,
    ) -> f64 {
        let needed = self.tolerance + 1 - failed.len();
        if mass <= 0.0 || remaining.len() < needed {
            return 0.0;
        }
        let Some((&drive, rest)) = remaining.split_first() else {
            return 0.0;
        };

        let position = failed.len() + 1;
        let completes = needed == 1;
        let base = if completes {
            self.residuals.residual(failed, drive)
        } else {
            self.residuals.afr()
        };
        let q = self.member_failure(position, base);

        let fail_mass = mass * q;
        let mut total = 0.0;
        if completes {
            if fail_mass > 0.0 {
                self.record(failed, drive, base, fail_mass);
                total += fail_mass;
            }
        } else {
            failed.push(drive);
            total += self.pg_death_combinations(rest, failed, fail_mass);
            failed.pop();
        }

        total + self.pg_death_combinations(rest, failed, mass * (1.0 - q))
    }

    /// Deaths recorded so far.
    #[must_use]
    pub fn deaths(&self) -> &[CascadeDeath] {
        &self.deaths
    }

    /// Finish evaluation and return the recorded deaths.
    #[must_use]
    pub fn into_deaths(self) -> Vec<CascadeDeath> {
        self.deaths
    }

    /// Failure probability of the `position`-th member of a cascade.
    ///
    /// The first member fails at its annual rate, later members have to fail
    /// inside the window.
    fn member_failure(&self, position: usize, rate: f64) -> f64 {
        if position <= 1 {
            return rate.clamp(0.0, 1.0);
        }
        (rate * self.window * pyramid_factor(position)).clamp(0.0, 1.0)
    }

    fn record(&mut self, prefix: &[DriveId], drive: DriveId, residual: f64, mass: f64) {
        if mass <= 0.0 {
            return;
        }
        let sequence = sequence_key(prefix, drive);
        trace!(?sequence, residual, mass, "Group death path");
        self.deaths.push(CascadeDeath {
            sequence,
            residual,
            mass,
        });
    }
}
