// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine facade wiring the memory tiers over injected adapter handles.
//!
//! Adapters are constructed at process start and passed in explicitly;
//! the engine holds no ambient globals. Components are cheap to clone
//! and share their underlying handles.

use std::sync::Arc;

use muninn_config::MuninnConfig;
use muninn_core::{
    Completion, EmbeddingProvider, EphemeralStore, MuninnError, VectorIndex,
};
use muninn_storage::Database;

use crate::episodic::EpisodicMemory;
use crate::semantic::SemanticKnowledge;
use crate::store::RecordStore;
use crate::summarizer::SessionSummarizer;
use crate::working::WorkingMemory;

/// Per-owner memory statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerMemoryStats {
    pub episodic_count: u64,
    pub semantic_count: u64,
    /// Mean episodic importance, rounded to 2 decimals; 0.0 with no records.
    pub average_importance: f64,
}

/// The assembled memory engine: one handle per memory tier plus the
/// session summarizer.
#[derive(Clone)]
pub struct MemoryEngine {
    pub working: WorkingMemory,
    pub episodic: EpisodicMemory,
    pub semantic: SemanticKnowledge,
    pub summarizer: SessionSummarizer,
}

impl MemoryEngine {
    /// Wire the engine from config and injected adapter handles.
    pub fn new(
        config: &MuninnConfig,
        db: Database,
        vectors: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        ephemeral: Arc<dyn EphemeralStore>,
        completion: Arc<dyn Completion>,
    ) -> Self {
        let working = WorkingMemory::new(ephemeral, &config.working);
        let episodic = EpisodicMemory::new(
            RecordStore::new(db),
            vectors.clone(),
            embedder.clone(),
            &config.episodic,
            &config.embedding,
        );
        let semantic = SemanticKnowledge::new(
            vectors,
            embedder,
            &config.semantic,
            &config.embedding,
        );
        let summarizer =
            SessionSummarizer::new(completion, working.clone(), episodic.clone());

        Self {
            working,
            episodic,
            semantic,
            summarizer,
        }
    }

    /// Per-owner counts and mean episodic importance.
    pub async fn stats(&self, owner_id: &str) -> Result<OwnerMemoryStats, MuninnError> {
        if owner_id.trim().is_empty() {
            return Err(MuninnError::InvalidArgument(
                "owner_id must not be empty".into(),
            ));
        }

        let (episodic_count, avg) = self.episodic.owner_stats(owner_id).await?;
        let semantic_count = self.semantic.owner_count(owner_id).await?;

        Ok(OwnerMemoryStats {
            episodic_count,
            semantic_count,
            average_importance: round2(avg.unwrap_or(0.0)),
        })
    }
}

/// Round to two decimal places for reporting.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeral::InProcessEphemeralStore;
    use crate::types::MemoryCategory;
    use crate::vector::SqliteVectorIndex;
    use muninn_test_utils::{MockCompletion, MockEmbedder};
    use std::collections::BTreeMap;

    async fn setup() -> (MemoryEngine, RecordStore) {
        let db = Database::open_in_memory().await.unwrap();
        let records = RecordStore::new(db.clone());
        let engine = MemoryEngine::new(
            &MuninnConfig::default(),
            db.clone(),
            Arc::new(SqliteVectorIndex::new(db)),
            Arc::new(MockEmbedder::new()),
            Arc::new(InProcessEphemeralStore::new()),
            Arc::new(MockCompletion::new()),
        );
        (engine, records)
    }

    #[tokio::test]
    async fn stats_for_empty_owner_are_zero() {
        let (engine, _) = setup().await;
        let stats = engine.stats("owner-1").await.unwrap();
        assert_eq!(
            stats,
            OwnerMemoryStats {
                episodic_count: 0,
                semantic_count: 0,
                average_importance: 0.0,
            }
        );
    }

    #[tokio::test]
    async fn stats_round_average_importance_to_two_decimals() {
        let (engine, records) = setup().await;
        for (i, importance) in [0.2, 0.5, 0.9].into_iter().enumerate() {
            let record = engine
                .episodic
                .store(
                    "owner-1",
                    None,
                    &format!("memory number {i}"),
                    MemoryCategory::Conversation,
                    BTreeMap::new(),
                    None,
                )
                .await
                .unwrap();
            records.set_importance(&record.id, importance).await.unwrap();
        }
        engine
            .semantic
            .store("owner-1", "likes drawing", MemoryCategory::Interest, 0.8)
            .await
            .unwrap();

        let stats = engine.stats("owner-1").await.unwrap();
        assert_eq!(stats.episodic_count, 3);
        assert_eq!(stats.semantic_count, 1);
        assert_eq!(stats.average_importance, 0.53, "mean of {{0.2, 0.5, 0.9}}");
    }

    #[tokio::test]
    async fn stats_reject_empty_owner() {
        let (engine, _) = setup().await;
        let err = engine.stats(" ").await.unwrap_err();
        assert!(matches!(err, MuninnError::InvalidArgument(_)));
    }

    #[test]
    fn round2_behaves_at_boundaries() {
        assert_eq!(round2(0.5333333), 0.53);
        assert_eq!(round2(0.535), 0.54);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(1.0), 1.0);
    }
}
