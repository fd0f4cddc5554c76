// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Muninn memory engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Muninn workspace. External collaborators
//! (embedding provider, vector index, ephemeral cache, persona/profile
//! lookup, completion) are consumed through traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MuninnError;
pub use types::{AdapterType, HealthStatus};

// Re-export all adapter traits at crate root.
pub use traits::{
    Completion, EmbeddingProvider, EphemeralStore, MemoryAdapter, PersonaProvider,
    ProfileProvider, VectorIndex,
};
