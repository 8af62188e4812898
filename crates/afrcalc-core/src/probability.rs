// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Range guards for computed probabilities.

use tracing::warn;

use crate::error::{Error, Result};

/// Rounding slack tolerated outside [0, 1] before a value counts as a defect.
pub const PROBABILITY_EPSILON: f64 = 1e-9;

/// Checks that `value` is a probability and clips rounding noise.
///
/// Values within [`PROBABILITY_EPSILON`] of the range are clipped into it.
/// Anything else (NaN, infinities, real overshoot) means the model or its
/// clamping is broken and is reported as [`Error::ProbabilityOutOfRange`].
pub fn ensure_probability(what: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite()
        || value < -PROBABILITY_EPSILON
        || value > 1.0 + PROBABILITY_EPSILON
    {
        return Err(Error::ProbabilityOutOfRange { what, value });
    }
    Ok(value.clamp(0.0, 1.0))
}

/// Saturates a linearised probability estimate (`rate * window`) at 1.
///
/// The linear approximation overshoots when the window is long compared to the
/// mean time between failures; the saturation is logged since the result is
/// then only an upper bound.
#[must_use]
pub fn saturate_probability(what: &'static str, value: f64) -> f64 {
    if value > 1.0 {
        warn!(what, value, "Linearised failure probability exceeds 1, saturating");
        return 1.0;
    }
    value.max(0.0)
}

/// Probability that at least one of `trials` independent events with
/// probability `p` happens: `1 - (1 - p)^trials`.
///
/// Evaluated through `ln_1p`/`exp_m1` so tiny per-event probabilities do not
/// vanish in rounding. `trials` may be fractional (expected peer counts).
#[must_use]
pub fn any_of(p: f64, trials: f64) -> f64 {
    if trials <= 0.0 || p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }
    -(trials * (-p).ln_1p()).exp_m1()
}
