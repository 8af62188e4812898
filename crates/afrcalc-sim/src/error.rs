// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Error types for the brute-force simulator.

use thiserror::Error;

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimulationError>;

/// Errors that can occur while generating placements or simulating.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration or probability error from the core crate.
    #[error(transparent)]
    Core(#[from] afrcalc_core::Error),

    /// Not enough hosts to spread a placement group over distinct hosts.
    #[error("not enough hosts: need {needed}, have {available}")]
    NotEnoughHosts {
        /// Hosts needed for one group.
        needed: usize,
        /// Hosts in the cluster.
        available: usize,
    },

    /// Invalid simulation parameters.
    #[error("invalid simulation parameters: {0}")]
    InvalidParameters(String),
}
