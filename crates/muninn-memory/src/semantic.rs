// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic knowledge: durable distilled facts about an owner.
//!
//! Not session-scoped and not agent-scoped. The vector store is
//! authoritative; facts carry no relational mirror, so exact access-count
//! bookkeeping is traded away for a simpler write path.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::counter;
use muninn_config::model::{EmbeddingConfig, SemanticConfig};
use muninn_core::types::{EmbeddingInput, MetadataFilter, VectorEntry};
use muninn_core::{EmbeddingProvider, MuninnError, VectorIndex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::fmt_ts;
use crate::types::{semantic_namespace, MemoryCategory, Recall, SemanticHit};

/// Vector-only store of distilled owner facts.
#[derive(Clone)]
pub struct SemanticKnowledge {
    vectors: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    retrieval_limit: usize,
    embed_timeout: Duration,
}

impl SemanticKnowledge {
    /// Creates a new semantic knowledge store over injected adapters.
    pub fn new(
        vectors: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &SemanticConfig,
        embedding_config: &EmbeddingConfig,
    ) -> Self {
        Self {
            vectors,
            embedder,
            retrieval_limit: config.retrieval_limit,
            embed_timeout: Duration::from_secs(embedding_config.timeout_secs),
        }
    }

    /// Store one distilled fact in the owner's semantic namespace.
    pub async fn store(
        &self,
        owner_id: &str,
        fact: &str,
        category: MemoryCategory,
        confidence: f64,
    ) -> Result<(), MuninnError> {
        if owner_id.trim().is_empty() {
            return Err(MuninnError::InvalidArgument(
                "owner_id must not be empty".into(),
            ));
        }

        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![fact.to_string()],
            })
            .await?;
        let vector = output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MuninnError::Internal("embedding returned no vectors".into()))?;

        let mut metadata = BTreeMap::new();
        metadata.insert(
            "category".to_string(),
            serde_json::json!(category.as_str()),
        );
        metadata.insert(
            "confidence".to_string(),
            serde_json::json!(confidence.clamp(0.0, 1.0)),
        );
        metadata.insert("last_updated".to_string(), serde_json::json!(fmt_ts(Utc::now())));

        let namespace = semantic_namespace(owner_id);
        let id = Uuid::new_v4().to_string();
        self.vectors
            .upsert(
                &namespace,
                VectorEntry {
                    id: id.clone(),
                    vector,
                    document: fact.to_string(),
                    metadata,
                },
            )
            .await?;

        counter!("muninn_semantic_stored_total").increment(1);
        debug!(fact_id = %id, owner_id, "semantic fact stored");
        Ok(())
    }

    /// Retrieve the facts nearest to a query, with raw similarities.
    ///
    /// Dependency failures degrade to an empty `Recall`, same policy as
    /// episodic retrieval.
    pub async fn retrieve(
        &self,
        owner_id: &str,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Recall<SemanticHit>, MuninnError> {
        if owner_id.trim().is_empty() {
            return Err(MuninnError::InvalidArgument(
                "owner_id must not be empty".into(),
            ));
        }

        let limit = limit.unwrap_or(self.retrieval_limit);
        match self.retrieve_inner(owner_id, query, limit).await {
            Ok(hits) => {
                counter!("muninn_semantic_retrievals_total").increment(1);
                Ok(Recall::ok(hits))
            }
            Err(e) if e.is_degradable() => {
                counter!("muninn_semantic_retrievals_degraded_total").increment(1);
                warn!(owner_id, error = %e, "semantic retrieval degraded to empty");
                Ok(Recall::degraded())
            }
            Err(e) => Err(e),
        }
    }

    async fn retrieve_inner(
        &self,
        owner_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SemanticHit>, MuninnError> {
        let embed = self.embedder.embed(EmbeddingInput {
            texts: vec![query.to_string()],
        });
        let output = tokio::time::timeout(self.embed_timeout, embed)
            .await
            .map_err(|_| MuninnError::Timeout {
                duration: self.embed_timeout,
            })??;
        let query_vector = output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MuninnError::Internal("embedding returned no vectors".into()))?;

        // Same bounded timeout as the embedding call.
        let namespace = semantic_namespace(owner_id);
        let filter = MetadataFilter::none();
        let query_fut = self
            .vectors
            .query(&namespace, &query_vector, limit, &filter);
        let matches = tokio::time::timeout(self.embed_timeout, query_fut)
            .await
            .map_err(|_| MuninnError::Timeout {
                duration: self.embed_timeout,
            })??;

        Ok(matches
            .into_iter()
            .map(|m| SemanticHit {
                content: m.document,
                similarity: m.similarity,
                metadata: m.metadata,
            })
            .collect())
    }

    /// Number of facts on record for the owner.
    pub(crate) async fn owner_count(&self, owner_id: &str) -> Result<u64, MuninnError> {
        self.vectors.count(&semantic_namespace(owner_id)).await
    }
}
