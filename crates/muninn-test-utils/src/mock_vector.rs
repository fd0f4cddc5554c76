// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Always-unavailable vector index for degraded-path tests.

use async_trait::async_trait;

use muninn_core::types::{AdapterType, HealthStatus, MetadataFilter, VectorEntry, VectorMatch};
use muninn_core::{MemoryAdapter, MuninnError, VectorIndex};

fn unavailable() -> MuninnError {
    MuninnError::Dependency {
        message: "vector index unreachable".into(),
        source: None,
    }
}

/// A vector index whose every operation fails with a dependency error.
pub struct FailingVectorIndex;

#[async_trait]
impl MemoryAdapter for FailingVectorIndex {
    fn name(&self) -> &str {
        "failing-vector"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Vector
    }

    async fn health_check(&self) -> Result<HealthStatus, MuninnError> {
        Ok(HealthStatus::Unhealthy("always down".into()))
    }

    async fn shutdown(&self) -> Result<(), MuninnError> {
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for FailingVectorIndex {
    async fn upsert(&self, _namespace: &str, _entry: VectorEntry) -> Result<(), MuninnError> {
        Err(unavailable())
    }

    async fn query(
        &self,
        _namespace: &str,
        _vector: &[f32],
        _k: usize,
        _filter: &MetadataFilter,
    ) -> Result<Vec<VectorMatch>, MuninnError> {
        Err(unavailable())
    }

    async fn get(
        &self,
        _namespace: &str,
        _id: &str,
    ) -> Result<Option<VectorMatch>, MuninnError> {
        Err(unavailable())
    }

    async fn delete(&self, _namespace: &str, _id: &str) -> Result<(), MuninnError> {
        Err(unavailable())
    }

    async fn count(&self, _namespace: &str) -> Result<u64, MuninnError> {
        Err(unavailable())
    }
}
