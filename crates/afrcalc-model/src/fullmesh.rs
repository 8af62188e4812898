// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Full-mesh model: every drive communicates with every other drive.

use afrcalc_core::{
    any_of, combinations, ensure_probability, ln_combinations, saturate_probability, Error,
    Result, DAYS_PER_YEAR,
};
use tracing::debug;

/// Probability of at least `f` failures among `n` independent drives that each
/// fail with probability `a`.
///
/// This is the binomial upper tail `1 - sum_{i<f} C(n,i) a^i (1-a)^(n-i)`. When
/// the tail is far from the mode it is summed directly instead, which gives
/// the same value without cancelling against 1. As a special case `f == 0`
/// returns `(1-a)^n`, the probability that nothing fails.
///
/// ```
/// use afrcalc_model::failure_rate_fullmesh;
///
/// // At least one of two coin flips
/// assert!((failure_rate_fullmesh(2, 0.5, 1) - 0.75).abs() < 1e-12);
/// ```
#[must_use]
pub fn failure_rate_fullmesh(n: u32, a: f64, f: u32) -> f64 {
    debug_assert!((0.0..=1.0).contains(&a), "failure probability {a} out of range");

    let trials = f64::from(n);
    if f == 0 {
        return (1.0 - a).powf(trials);
    }
    if f > n || a <= 0.0 {
        return 0.0;
    }
    if a >= 1.0 {
        return 1.0;
    }

    let p = if f64::from(f) > trials * a {
        binomial_sum(trials, a, f, n, true)
    } else {
        1.0 - binomial_sum(trials, a, 0, f - 1, false)
    };
    p.clamp(0.0, 1.0)
}

/// Sum of binomial probabilities `P(X = i)` for `i` in `from..=to`.
///
/// Terms are assembled in log space with the coefficient updated in place, so
/// huge coefficients paired with vanishing powers stay finite. Past the mode
/// the terms only shrink and `past_mode` stops the sum once they no longer
/// change it.
fn binomial_sum(trials: f64, a: f64, from: u32, to: u32, past_mode: bool) -> f64 {
    let (ln_a, ln_b) = (a.ln(), (-a).ln_1p());
    let first = combinations(trials, from);
    let mut ln_c = if first > 0.0 && first.is_finite() {
        first.ln()
    } else {
        ln_combinations(trials, from)
    };

    let mut sum = 0.0;
    for i in from..=to {
        let k = f64::from(i);
        let term = (ln_c + k * ln_a + (trials - k) * ln_b).exp();
        sum += term;
        if past_mode && term <= sum * 1e-17 {
            break;
        }
        ln_c += ((trials - k) / (k + 1.0)).ln();
    }
    sum
}

/// Annual probability of data loss in a full-mesh cluster.
///
/// * `n` - number of drives
/// * `afr` - annualized failure rate of one drive
/// * `l` - rebalance time in days after a single drive failure
/// * `k` - replication factor: data is lost when `k` drives are down at once
///
/// After a failure, `k - 1` more drives have to fail within the `l`-day window.
/// The result is one minus the probability that none of the `n - (k - 1)`
/// drives starts such a cascade.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] when `k` is zero, exceeds `n`, or the rate
/// or window are out of range.
pub fn cluster_afr_fullmesh(n: u32, afr: f64, l: f64, k: u32) -> Result<f64> {
    if k == 0 {
        return Err(Error::invalid("replication factor must be at least 1"));
    }
    if k > n {
        return Err(Error::invalid(format!("replication factor {k} exceeds drive count {n}")));
    }
    if !afr.is_finite() || !(0.0..=1.0).contains(&afr) {
        return Err(Error::invalid(format!("afr must be within [0, 1], got {afr}")));
    }
    if !l.is_finite() || l < 0.0 {
        return Err(Error::invalid(format!("rebalance time must be non-negative, got {l}")));
    }

    let candidates = n - (k - 1);
    let window_fail = saturate_probability("full-mesh window failure", afr * l / DAYS_PER_YEAR);
    let cascade = afr * failure_rate_fullmesh(candidates, window_fail, k - 1);
    let loss = any_of(cascade, f64::from(candidates));

    debug!(n, afr, l, k, window_fail, cascade, loss, "Full-mesh estimate");
    ensure_probability("full-mesh cluster loss", loss)
}
