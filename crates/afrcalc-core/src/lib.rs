// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Core types for estimating the annual data-loss probability of a cluster.
//!
//! This crate holds the pieces shared by both estimators:
//! - Cluster configuration and its validation
//! - Error types
//! - Combinatorics utilities (binomial coefficients, expected distinct draws)
//! - Recovery window derivation
//! - Probability range guards
//!
//! # Example
//!
//! ```
//! use afrcalc_core::{ClusterConfig, RecoveryWindows, RedundancyScheme};
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
//! config.validate().unwrap();
//!
//! let windows = RecoveryWindows::derive(&config).unwrap();
//! assert!(windows.disk_heal_time > 0.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod combinatorics;
pub mod config;
pub mod error;
pub mod probability;
pub mod recovery;

pub use combinatorics::{combinations, expected_distinct_draws, ln_combinations};
pub use config::{
    ClusterConfig, Config, LogFormat, LoggingConfig, RedundancyScheme, SimulationConfig,
};
pub use error::{Error, Result};
pub use probability::{any_of, ensure_probability, saturate_probability};
pub use recovery::{RecoveryWindows, DAYS_PER_YEAR, SECONDS_PER_YEAR};
