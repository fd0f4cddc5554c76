// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Episodic memory: durable, per-owner-namespaced, vector-searchable
//! records of interaction snippets with per-persona visibility.
//!
//! Writes are vector-entry-first with rollback, so a failed store never
//! leaves a durable row without its vector pair or vice versa. Retrieval
//! swallows dependency failures into a degraded-empty result; a memory
//! outage must never block the surrounding conversation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use muninn_config::model::{EmbeddingConfig, EpisodicConfig};
use muninn_core::types::{EmbeddingInput, MetadataFilter, VectorEntry};
use muninn_core::{EmbeddingProvider, MuninnError, VectorIndex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::heuristics::score_importance;
use crate::store::RecordStore;
use crate::types::{
    episodic_namespace, MemoryCategory, MemoryKind, MemoryRecord, Recall, VectorRef,
};

/// Durable episodic memory over the vector index and the relational store.
#[derive(Clone)]
pub struct EpisodicMemory {
    records: RecordStore,
    vectors: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    retention_days: i64,
    retrieval_limit: usize,
    reinforcement: f64,
    embed_timeout: Duration,
}

impl EpisodicMemory {
    /// Creates a new episodic memory over injected adapter handles.
    pub fn new(
        records: RecordStore,
        vectors: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &EpisodicConfig,
        embedding_config: &EmbeddingConfig,
    ) -> Self {
        Self {
            records,
            vectors,
            embedder,
            retention_days: config.retention_days,
            retrieval_limit: config.retrieval_limit,
            reinforcement: config.reinforcement,
            embed_timeout: Duration::from_secs(embedding_config.timeout_secs),
        }
    }

    /// Store one interaction snippet as a durable record.
    ///
    /// The vector entry is written first; if the relational insert then
    /// fails, the vector entry is rolled back before the error surfaces.
    /// Write-path failures are never swallowed.
    pub async fn store(
        &self,
        owner_id: &str,
        session_id: Option<&str>,
        content: &str,
        category: MemoryCategory,
        metadata: BTreeMap<String, serde_json::Value>,
        agent_id: Option<&str>,
    ) -> Result<MemoryRecord, MuninnError> {
        if owner_id.trim().is_empty() {
            return Err(MuninnError::InvalidArgument(
                "owner_id must not be empty".into(),
            ));
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let namespace = episodic_namespace(owner_id);
        let importance = score_importance(content, &metadata);
        let expires_at = now + chrono::Duration::days(self.retention_days);

        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![content.to_string()],
            })
            .await?;
        let vector = output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MuninnError::Internal("embedding returned no vectors".into()))?;

        self.vectors
            .upsert(
                &namespace,
                VectorEntry {
                    id: id.clone(),
                    vector,
                    document: content.to_string(),
                    metadata: metadata.clone(),
                },
            )
            .await?;

        let record = MemoryRecord {
            id: id.clone(),
            owner_id: owner_id.to_string(),
            session_id: session_id.map(str::to_string),
            agent_id: agent_id.map(str::to_string),
            kind: MemoryKind::Episodic,
            category,
            content: content.to_string(),
            metadata,
            vector_ref: VectorRef {
                namespace: namespace.clone(),
                id: id.clone(),
            },
            importance,
            access_count: 0,
            last_accessed_at: None,
            created_at: now,
            expires_at: Some(expires_at),
        };

        if let Err(e) = self.records.insert(&record).await {
            // Roll the vector entry back; a vector entry must not outlive
            // its durable row.
            if let Err(rollback_err) = self.vectors.delete(&namespace, &id).await {
                warn!(
                    record_id = %id,
                    error = %rollback_err,
                    "vector rollback failed after relational insert error"
                );
            }
            return Err(e);
        }

        counter!("muninn_episodic_stored_total").increment(1);
        debug!(record_id = %id, owner_id, importance, "episodic record stored");
        Ok(record)
    }

    /// Retrieve the most relevant episodic records for a query.
    ///
    /// Nearest neighbors are re-ranked by importance DESC then created_at
    /// DESC, so hard-won, information-dense memories outrank marginally
    /// closer but less important ones. Every returned record is reinforced
    /// (access count, last access, importance bump) in the same call.
    ///
    /// Dependency failures degrade to an empty `Recall`; only invalid
    /// input surfaces as an error.
    pub async fn retrieve(
        &self,
        owner_id: &str,
        query: &str,
        limit: Option<usize>,
        agent_id: Option<&str>,
    ) -> Result<Recall<MemoryRecord>, MuninnError> {
        if owner_id.trim().is_empty() {
            return Err(MuninnError::InvalidArgument(
                "owner_id must not be empty".into(),
            ));
        }

        let limit = limit.unwrap_or(self.retrieval_limit);
        match self.retrieve_inner(owner_id, query, limit, agent_id).await {
            Ok(items) => {
                counter!("muninn_episodic_retrievals_total").increment(1);
                Ok(Recall::ok(items))
            }
            Err(e) if e.is_degradable() => {
                counter!("muninn_episodic_retrievals_degraded_total").increment(1);
                warn!(owner_id, error = %e, "episodic retrieval degraded to empty");
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
        agent_id: Option<&str>,
    ) -> Result<Vec<MemoryRecord>, MuninnError> {
        let query_vector = self.embed_with_timeout(query).await?;
        let namespace = episodic_namespace(owner_id);

        // The index query gets the same bounded timeout as the embedding
        // call; a hung dependency must never hang the conversation.
        let filter = MetadataFilter::none();
        let query_fut = self
            .vectors
            .query(&namespace, &query_vector, limit, &filter);
        let matches = tokio::time::timeout(self.embed_timeout, query_fut)
            .await
            .map_err(|_| MuninnError::Timeout {
                duration: self.embed_timeout,
            })??;
        if matches.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = matches.into_iter().map(|m| m.id).collect();
        let mut records = self.records.get_by_owner_and_ids(owner_id, &ids).await?;

        // Persona scoping: a requested agent sees its own records plus
        // shared (agent-less) ones. Without a requested agent, no scoping
        // applies.
        if let Some(agent) = agent_id {
            records.retain(|r| r.agent_id.as_deref().is_none_or(|a| a == agent));
        }

        records.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let now = Utc::now();
        for record in &mut records {
            self.records
                .apply_reinforcement(&record.id, self.reinforcement, now)
                .await?;
            record.access_count += 1;
            record.last_accessed_at = Some(now);
            record.importance = (record.importance + self.reinforcement).min(1.0);
        }

        Ok(records)
    }

    async fn embed_with_timeout(&self, text: &str) -> Result<Vec<f32>, MuninnError> {
        let embed = self.embedder.embed(EmbeddingInput {
            texts: vec![text.to_string()],
        });
        let output = tokio::time::timeout(self.embed_timeout, embed)
            .await
            .map_err(|_| MuninnError::Timeout {
                duration: self.embed_timeout,
            })??;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MuninnError::Internal("embedding returned no vectors".into()))
    }

    /// Age-proportional importance decay over every episodic record.
    ///
    /// `importance = max(importance - rate * days_since_last_decay, 0)`,
    /// where a never-decayed record counts its full age. The subtracted
    /// amount depends on the decay watermark rather than on how often the
    /// job ran, so a re-run with the same `now` is a no-op (safe under
    /// retry). Pages through the table; cancellation is honored at page
    /// boundaries only. Run by the maintenance scheduler, never from the
    /// read path.
    pub async fn decay(
        &self,
        rate: f64,
        now: DateTime<Utc>,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, MuninnError> {
        let mut offset = 0;
        let mut updated = 0u64;

        loop {
            if cancel.is_cancelled() {
                info!(updated, "decay cancelled at page boundary");
                break;
            }

            let page = self
                .records
                .page_decay_rows(MemoryKind::Episodic, page_size, offset)
                .await?;
            let page_len = page.len();

            for row in page {
                let decayed_through = row.decayed_at.unwrap_or(row.created_at);
                let days = (now - decayed_through).num_days().max(0);
                if days == 0 {
                    continue;
                }
                let decayed = (row.importance - rate * days as f64).max(0.0);
                self.records.apply_decay(&row.id, decayed, now).await?;
                updated += 1;
            }

            if page_len < page_size {
                break;
            }
            offset += page_len;
        }

        counter!("muninn_decay_updated_total").increment(updated);
        Ok(updated)
    }

    /// Delete every record whose expiry lease ran out before `now`.
    ///
    /// Per record: vector entry first, then the relational row. Individual
    /// failures are logged and skipped so one bad record does not block
    /// the batch; a half-deleted pair is retried on the next run.
    pub async fn expire_older_than(&self, now: DateTime<Utc>) -> Result<u64, MuninnError> {
        let expired = self.records.expired_as_of(now).await?;
        let mut deleted = 0u64;

        for record in expired {
            if let Err(e) = self
                .vectors
                .delete(&record.vector_ref.namespace, &record.vector_ref.id)
                .await
            {
                warn!(record_id = %record.id, error = %e, "vector delete failed, skipping record");
                continue;
            }
            match self.records.delete(&record.id).await {
                Ok(_) => deleted += 1,
                Err(e) => {
                    warn!(record_id = %record.id, error = %e, "row delete failed after vector delete");
                }
            }
        }

        counter!("muninn_expired_deleted_total").increment(deleted);
        if deleted > 0 {
            info!(deleted, "expired episodic records removed");
        }
        Ok(deleted)
    }

    /// Count and mean importance of an owner's episodic records.
    pub(crate) async fn owner_stats(
        &self,
        owner_id: &str,
    ) -> Result<(u64, Option<f64>), MuninnError> {
        self.records
            .count_and_avg_importance(owner_id, MemoryKind::Episodic)
            .await
    }
}
