// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all collaborator adapters must implement.

use async_trait::async_trait;

use crate::error::MuninnError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Muninn collaborator adapters.
///
/// Adapters are constructed explicitly at process start and injected into
/// the engine; there is no ambient registry or global client state. Every
/// adapter provides identity, lifecycle, and health check capabilities.
#[async_trait]
pub trait MemoryAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the type of adapter (embedding, vector, ephemeral, etc.).
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, MuninnError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), MuninnError>;
}
