// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic mock embedding providers.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use muninn_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use muninn_core::{EmbeddingProvider, MemoryAdapter, MuninnError};

/// Dimensionality of mock embeddings.
pub const MOCK_DIM: usize = 16;

/// A deterministic embedding provider for tests.
///
/// Hashes each whitespace-separated word into one of [`MOCK_DIM`] buckets
/// and L2-normalizes the counts. Identical texts embed identically
/// (cosine 1.0); texts sharing words land closer than unrelated texts.
pub struct MockEmbedder;

impl MockEmbedder {
    pub fn new() -> Self {
        Self
    }

    /// Embed a single text deterministically.
    pub fn embed_text(text: &str) -> Vec<f32> {
        let mut buckets = vec![0.0_f32; MOCK_DIM];
        for word in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            buckets[(hasher.finish() as usize) % MOCK_DIM] += 1.0;
        }
        let norm: f32 = buckets.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for b in &mut buckets {
                *b /= norm;
            }
        }
        buckets
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MuninnError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MuninnError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MuninnError> {
        Ok(EmbeddingOutput {
            embeddings: input
                .texts
                .iter()
                .map(|text| Self::embed_text(text))
                .collect(),
            dimensions: MOCK_DIM,
        })
    }
}

/// An embedding provider that is always unavailable.
pub struct FailingEmbedder;

#[async_trait]
impl MemoryAdapter for FailingEmbedder {
    fn name(&self) -> &str {
        "failing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MuninnError> {
        Ok(HealthStatus::Unhealthy("always down".into()))
    }

    async fn shutdown(&self) -> Result<(), MuninnError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _input: EmbeddingInput) -> Result<EmbeddingOutput, MuninnError> {
        Err(MuninnError::Dependency {
            message: "embedding provider unreachable".into(),
            source: None,
        })
    }
}
