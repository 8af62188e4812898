// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Brute-force estimator of annual cluster data-loss probability.
//!
//! Instead of reasoning about expected peer counts, this crate builds an actual
//! random placement and evaluates every placement group:
//!
//! 1. Generate `ceil(drives * pgs / group_size)` placement groups, each spread
//!    over distinct hosts ([`PlacementGenerator`]).
//! 2. For each group compute the probability that enough members fail in one
//!    cascade of overlapping recovery windows ([`Cascade`]).
//! 3. Track which failure sequences were already counted
//!    ([`ResidualFailureMap`]) so a sequence shared by several groups is only
//!    counted once.
//! 4. Combine: one minus the product of group survival probabilities.
//!
//! Results vary between runs with different seeds; average several runs with
//! [`BruteForceSimulator::run_many`].
//!
//! # Example
//!
//! ```
//! use afrcalc_core::{ClusterConfig, RedundancyScheme};
//! use afrcalc_sim::BruteForceSimulator;
//!
//! let config = ClusterConfig {
//!     n_hosts: 4,
//!     n_drives: 4,
//!     afr_drive: 0.05,
//!     afr_host: 0.0,
//!     capacity: 4000.0,
//!     speed: Some(0.1),
//!     scheme: RedundancyScheme::Replicated { replicas: 2 },
//!     pgs: 100.0,
//!     ..Default::default()
//! };
//!
//! let simulator = BruteForceSimulator::new(&config).unwrap();
//! let summary = simulator.run_many(20, 7).unwrap();
//! assert!(summary.mean > 0.0 && summary.mean < 1.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cascade;
pub mod error;
pub mod placement;
pub mod residual;
pub mod simulator;

pub use cascade::{pyramid_factor, Cascade, CascadeDeath};
pub use error::{SimResult, SimulationError};
pub use placement::{DriveId, HostId, PlacementGenerator, PlacementGroup};
pub use residual::ResidualFailureMap;
pub use simulator::{BruteForceSimulator, SimulationSummary};
