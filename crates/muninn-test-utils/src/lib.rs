// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Muninn integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests
//! without external services.
//!
//! # Components
//!
//! - [`MockEmbedder`] - Deterministic bag-of-words embedding provider
//! - [`FailingEmbedder`] / [`FailingVectorIndex`] - Always-unavailable adapters
//! - [`MockPersonaProvider`] / [`MockProfileProvider`] - Fixture-backed lookups
//! - [`MockCompletion`] - Completion with pre-configured responses

pub mod mock_embedder;
pub mod mock_providers;
pub mod mock_vector;

pub use mock_embedder::{FailingEmbedder, MockEmbedder};
pub use mock_providers::{MockCompletion, MockPersonaProvider, MockProfileProvider};
pub use mock_vector::FailingVectorIndex;
