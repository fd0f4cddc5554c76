// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector index trait for per-namespace nearest-neighbor search.

use async_trait::async_trait;

use crate::error::MuninnError;
use crate::traits::adapter::MemoryAdapter;
use crate::types::{MetadataFilter, VectorEntry, VectorMatch};

/// Adapter for a namespaced nearest-neighbor vector store.
///
/// Namespaces partition entries per owner and memory kind
/// (`episodic:{owner_id}`, `semantic:{owner_id}`), so no cross-owner
/// contention exists by construction. Entry ids are unique within a
/// namespace and upserts replace existing entries.
#[async_trait]
pub trait VectorIndex: MemoryAdapter {
    /// Inserts or replaces an entry in the given namespace.
    async fn upsert(&self, namespace: &str, entry: VectorEntry) -> Result<(), MuninnError>;

    /// Returns up to `k` nearest neighbors of `vector`, filtered by `filter`.
    ///
    /// Results are ordered by similarity descending.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<VectorMatch>, MuninnError>;

    /// Fetches a single entry by id, or `None` if absent.
    async fn get(&self, namespace: &str, id: &str) -> Result<Option<VectorMatch>, MuninnError>;

    /// Deletes an entry by id. Deleting an absent id is not an error.
    async fn delete(&self, namespace: &str, id: &str) -> Result<(), MuninnError>;

    /// Returns the number of entries in the namespace.
    async fn count(&self, namespace: &str) -> Result<u64, MuninnError>;
}
