// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Rucket Authors

//! Error types for afrcalc.

use thiserror::Error;

/// A specialized `Result` type for afrcalc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while validating inputs or computing probabilities.
#[derive(Debug, Error)]
pub enum Error {
    /// The cluster configuration is inconsistent or out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A parameter required by the selected mode was not supplied.
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// A computed probability left the [0, 1] range.
    #[error("Probability out of range for {what}: {value}")]
    ProbabilityOutOfRange {
        /// Name of the quantity being computed.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
