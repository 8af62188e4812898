// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Closed-form estimators of annual data-loss probability.
//!
//! Two models are provided:
//!
//! - **Full mesh** ([`fullmesh`]): every drive shares redundancy groups with
//!   every other drive. Data is lost when enough drives fail inside one
//!   recovery window.
//! - **Topology aware** ([`topology`]): each drive only peers with the drives
//!   of its placement groups. Drive and host failures are accounted for
//!   separately, for replication and erasure coding, with or without eager
//!   replacement of failed drives.
//!
//! # Example
//!
//! ```
//! use afrcalc_core::{ClusterConfig, RedundancyScheme};
//! use afrcalc_model::cluster_afr;
//!
//! let config = ClusterConfig {
//!     n_hosts: 10,
//!     n_drives: 10,
//!     afr_drive: 0.03,
//!     afr_host: 0.05,
//!     capacity: 8000.0,
//!     speed: Some(0.02),
//!     scheme: RedundancyScheme::Replicated { replicas: 3 },
//!     pgs: 50.0,
//!     ..Default::default()
//! };
//!
//! let loss = cluster_afr(&config).unwrap();
//! assert!(loss > 0.0 && loss < 0.01);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fullmesh;
pub mod topology;

pub use fullmesh::{cluster_afr_fullmesh, failure_rate_fullmesh};
pub use topology::{cluster_afr, estimate, TopologyEstimate};
