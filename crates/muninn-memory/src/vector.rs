// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed implementation of the VectorIndex trait.
//!
//! Embeddings are stored as little-endian f32 BLOBs per namespace; a query
//! loads the namespace's vectors and ranks by cosine similarity in-process.
//! Owner-partitioned namespaces keep each scan small.

use std::collections::BTreeMap;

use async_trait::async_trait;
use muninn_core::types::{MetadataFilter, VectorEntry, VectorMatch};
use muninn_core::{
    AdapterType, HealthStatus, MemoryAdapter, MuninnError, VectorIndex,
};
use muninn_storage::{map_tr_err, Database};
use rusqlite::params;

use crate::types::{blob_to_vec, cosine_similarity, vec_to_blob};

/// Vector index over the `vector_entries` table.
#[derive(Clone)]
pub struct SqliteVectorIndex {
    db: Database,
}

impl SqliteVectorIndex {
    /// Creates a new index over an opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemoryAdapter for SqliteVectorIndex {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Vector
    }

    async fn health_check(&self) -> Result<HealthStatus, MuninnError> {
        self.db
            .connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MuninnError> {
        // The shared Database handle is closed by its owner.
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn upsert(&self, namespace: &str, entry: VectorEntry) -> Result<(), MuninnError> {
        let namespace = namespace.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO vector_entries (namespace, id, embedding, document, metadata) \
                     VALUES (?1, ?2, ?3, ?4, ?5) \
                     ON CONFLICT(namespace, id) DO UPDATE SET \
                        embedding = excluded.embedding, \
                        document = excluded.document, \
                        metadata = excluded.metadata",
                    params![
                        namespace,
                        entry.id,
                        vec_to_blob(&entry.vector),
                        entry.document,
                        serde_json::to_string(&entry.metadata).unwrap_or_default(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<VectorMatch>, MuninnError> {
        let namespace = namespace.to_string();
        let query_vector = vector.to_vec();
        let filter = filter.clone();

        let mut matches = self
            .db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, embedding, document, metadata FROM vector_entries \
                     WHERE namespace = ?1",
                )?;
                let rows = stmt
                    .query_map(params![namespace], |row| {
                        let blob: Vec<u8> = row.get(1)?;
                        Ok((
                            row.get::<_, String>(0)?,
                            blob_to_vec(&blob),
                            row.get::<_, String>(2)?,
                            row.get::<_, Option<String>>(3)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                let matches: Vec<VectorMatch> = rows
                    .into_iter()
                    .filter_map(|(id, embedding, document, metadata_json)| {
                        if embedding.len() != query_vector.len() {
                            return None;
                        }
                        let metadata: BTreeMap<String, serde_json::Value> = metadata_json
                            .as_deref()
                            .and_then(|json| serde_json::from_str(json).ok())
                            .unwrap_or_default();
                        if !filter.matches(&metadata) {
                            return None;
                        }
                        let similarity = cosine_similarity(&query_vector, &embedding);
                        Some(VectorMatch {
                            id,
                            document,
                            metadata,
                            similarity,
                        })
                    })
                    .collect();
                Ok(matches)
            })
            .await
            .map_err(map_tr_err)?;

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);
        Ok(matches)
    }

    async fn get(&self, namespace: &str, id: &str) -> Result<Option<VectorMatch>, MuninnError> {
        let namespace = namespace.to_string();
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT document, metadata FROM vector_entries \
                     WHERE namespace = ?1 AND id = ?2",
                )?;
                let result = stmt.query_row(params![namespace, id.clone()], |row| {
                    let metadata_json: Option<String> = row.get(1)?;
                    let metadata: BTreeMap<String, serde_json::Value> = metadata_json
                        .as_deref()
                        .and_then(|json| serde_json::from_str(json).ok())
                        .unwrap_or_default();
                    Ok(VectorMatch {
                        id: id.clone(),
                        document: row.get(0)?,
                        metadata,
                        similarity: 1.0,
                    })
                });
                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, namespace: &str, id: &str) -> Result<(), MuninnError> {
        let namespace = namespace.to_string();
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM vector_entries WHERE namespace = ?1 AND id = ?2",
                    params![namespace, id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn count(&self, namespace: &str) -> Result<u64, MuninnError> {
        let namespace = namespace.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM vector_entries WHERE namespace = ?1",
                    params![namespace],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> SqliteVectorIndex {
        let db = Database::open_in_memory().await.unwrap();
        SqliteVectorIndex::new(db)
    }

    fn entry(id: &str, vector: Vec<f32>, document: &str) -> VectorEntry {
        VectorEntry {
            id: id.to_string(),
            vector,
            document: document.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn upsert_and_get() {
        let index = setup().await;
        index
            .upsert("episodic:owner-1", entry("v1", vec![1.0, 0.0], "dinosaurs"))
            .await
            .unwrap();

        let found = index.get("episodic:owner-1", "v1").await.unwrap().unwrap();
        assert_eq!(found.document, "dinosaurs");

        assert!(index.get("episodic:owner-1", "v2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_entry() {
        let index = setup().await;
        index
            .upsert("episodic:owner-1", entry("v1", vec![1.0, 0.0], "old"))
            .await
            .unwrap();
        index
            .upsert("episodic:owner-1", entry("v1", vec![0.0, 1.0], "new"))
            .await
            .unwrap();

        let found = index.get("episodic:owner-1", "v1").await.unwrap().unwrap();
        assert_eq!(found.document, "new");
        assert_eq!(index.count("episodic:owner-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn query_ranks_by_cosine_similarity() {
        let index = setup().await;
        index
            .upsert("episodic:owner-1", entry("close", vec![1.0, 0.1], "close"))
            .await
            .unwrap();
        index
            .upsert("episodic:owner-1", entry("far", vec![0.0, 1.0], "far"))
            .await
            .unwrap();

        let matches = index
            .query("episodic:owner-1", &[1.0, 0.0], 10, &MetadataFilter::none())
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "close");
        assert!(matches[0].similarity > matches[1].similarity);
    }

    #[tokio::test]
    async fn query_respects_k() {
        let index = setup().await;
        for i in 0..5 {
            index
                .upsert(
                    "episodic:owner-1",
                    entry(&format!("v{i}"), vec![1.0, i as f32 / 10.0], "doc"),
                )
                .await
                .unwrap();
        }

        let matches = index
            .query("episodic:owner-1", &[1.0, 0.0], 3, &MetadataFilter::none())
            .await
            .unwrap();
        assert_eq!(matches.len(), 3);
    }

    #[tokio::test]
    async fn query_is_namespace_isolated() {
        let index = setup().await;
        index
            .upsert("episodic:owner-1", entry("v1", vec![1.0, 0.0], "mine"))
            .await
            .unwrap();
        index
            .upsert("episodic:owner-2", entry("v2", vec![1.0, 0.0], "theirs"))
            .await
            .unwrap();

        let matches = index
            .query("episodic:owner-1", &[1.0, 0.0], 10, &MetadataFilter::none())
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "v1");
    }

    #[tokio::test]
    async fn query_applies_metadata_filter() {
        let index = setup().await;
        let mut tagged = entry("v1", vec![1.0, 0.0], "tagged");
        tagged
            .metadata
            .insert("category".into(), serde_json::json!("interest"));
        index.upsert("semantic:owner-1", tagged).await.unwrap();
        index
            .upsert("semantic:owner-1", entry("v2", vec![1.0, 0.0], "untagged"))
            .await
            .unwrap();

        let filter = MetadataFilter::none().with("category", serde_json::json!("interest"));
        let matches = index
            .query("semantic:owner-1", &[1.0, 0.0], 10, &filter)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "v1");
    }

    #[tokio::test]
    async fn query_skips_dimension_mismatches() {
        let index = setup().await;
        index
            .upsert("episodic:owner-1", entry("v1", vec![1.0, 0.0, 0.0], "3d"))
            .await
            .unwrap();

        let matches = index
            .query("episodic:owner-1", &[1.0, 0.0], 10, &MetadataFilter::none())
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn delete_and_count() {
        let index = setup().await;
        index
            .upsert("episodic:owner-1", entry("v1", vec![1.0, 0.0], "doc"))
            .await
            .unwrap();
        assert_eq!(index.count("episodic:owner-1").await.unwrap(), 1);

        index.delete("episodic:owner-1", "v1").await.unwrap();
        assert_eq!(index.count("episodic:owner-1").await.unwrap(), 0);

        // Deleting an absent id is not an error.
        index.delete("episodic:owner-1", "v1").await.unwrap();
    }
}
