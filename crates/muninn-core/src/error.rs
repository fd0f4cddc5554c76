// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Muninn memory engine.

use thiserror::Error;

/// The primary error type used across all Muninn adapter traits and core operations.
///
/// The read path (retrieval, context assembly) converts `Dependency` and
/// `Timeout` into degraded-empty results instead of propagating them; the
/// write path surfaces every variant to the caller.
#[derive(Debug, Error)]
pub enum MuninnError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller-supplied input was missing or malformed. Never swallowed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Relational store errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A dependency (vector index, embedding provider, ephemeral cache) is unreachable.
    #[error("dependency unavailable: {message}")]
    Dependency {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced entity (persona, profile, record) does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MuninnError {
    /// True for failures the read path swallows into degraded results.
    ///
    /// `InvalidArgument` and `NotFound` are deliberately excluded: bad input
    /// is always surfaced, and absent personas/profiles are "no data", not
    /// failures.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            MuninnError::Dependency { .. }
                | MuninnError::Timeout { .. }
                | MuninnError::Storage { .. }
        )
    }
}
