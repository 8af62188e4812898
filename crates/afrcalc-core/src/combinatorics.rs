// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Combinatorics helpers used by both estimators.

/// Binomial coefficient C(n, k) as a real number.
///
/// Computed as a running product of `(n - i) / (i + 1)` so intermediate values
/// stay close to the result instead of growing like factorials. `n` may be
/// fractional; the product is then the generalized binomial coefficient.
///
/// ```
/// use afrcalc_core::combinations;
///
/// assert_eq!(combinations(5.0, 2), 10.0);
/// assert_eq!(combinations(7.0, 0), 1.0);
/// ```
#[must_use]
pub fn combinations(n: f64, k: u32) -> f64 {
    let mut r = 1.0;
    for i in 0..k {
        let i = f64::from(i);
        r *= (n - i) / (i + 1.0);
    }
    r
}

/// Natural logarithm of C(n, k), for coefficients too large for an `f64`.
///
/// Accumulates the same running product as [`combinations`] in log space.
/// Returns negative infinity when the coefficient is zero (integer `n < k`).
#[must_use]
pub fn ln_combinations(n: f64, k: u32) -> f64 {
    (0..k)
        .map(|i| {
            let i = f64::from(i);
            ((n - i) / (i + 1.0)).ln()
        })
        .sum()
}

/// Expected number of distinct slots touched by `k` uniform draws with
/// replacement from `n` slots: `n * (1 - (1 - 1/n)^k)`.
///
/// This converts "number of redundancy groups a drive belongs to" into
/// "number of distinct peers", since groups overlap. Returns 0 when there are
/// no slots to draw from.
#[must_use]
pub fn expected_distinct_draws(n: f64, k: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    n * (1.0 - (1.0 - 1.0 / n).powf(k))
}
