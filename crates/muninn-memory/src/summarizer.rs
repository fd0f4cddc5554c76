// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session summarization: distills a finished session's working memory
//! into one episodic record, then clears the buffer.
//!
//! This is the only consumer of the [`Completion`] adapter. It sits
//! outside the conversational read/write path; failures surface to the
//! session-handling layer like any other write-path error.

use std::collections::BTreeMap;
use std::sync::Arc;

use muninn_core::{Completion, MuninnError};
use tracing::{debug, info};

use crate::episodic::EpisodicMemory;
use crate::types::{MemoryCategory, MemoryRecord, TurnRole};
use crate::working::WorkingMemory;

/// Distills session transcripts into episodic memory at session end.
#[derive(Clone)]
pub struct SessionSummarizer {
    completion: Arc<dyn Completion>,
    working: WorkingMemory,
    episodic: EpisodicMemory,
}

impl SessionSummarizer {
    /// Creates a new summarizer over the given components.
    pub fn new(
        completion: Arc<dyn Completion>,
        working: WorkingMemory,
        episodic: EpisodicMemory,
    ) -> Self {
        Self {
            completion,
            working,
            episodic,
        }
    }

    /// Summarize the session's buffered turns into one episodic record.
    ///
    /// An empty transcript is a no-op. On success the working memory
    /// buffer is cleared; the summary record inherits the session's
    /// persona scope.
    pub async fn summarize(
        &self,
        owner_id: &str,
        session_id: &str,
        agent_id: Option<&str>,
    ) -> Result<Option<MemoryRecord>, MuninnError> {
        let turns = self.working.read(session_id).await?;
        if turns.is_empty() {
            debug!(session_id, "no turns buffered, skipping summarization");
            return Ok(None);
        }

        let mut transcript = String::new();
        for turn in &turns {
            let role = match turn.role {
                TurnRole::User => "child",
                TurnRole::Assistant => "companion",
                TurnRole::System => "system",
            };
            transcript.push_str(&format!("{role}: {}\n", turn.content));
        }

        let prompt = format!(
            "Summarize this conversation between a child and their companion \
             toy in 2-3 sentences. Keep names, favorites, and feelings the \
             child shared; write in third person.\n\n{transcript}"
        );
        let summary = self.completion.complete(&prompt).await?;

        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), serde_json::json!("session_summary"));
        metadata.insert("turn_count".to_string(), serde_json::json!(turns.len()));

        let record = self
            .episodic
            .store(
                owner_id,
                Some(session_id),
                &summary,
                MemoryCategory::Conversation,
                metadata,
                agent_id,
            )
            .await?;

        self.working.clear(session_id).await?;
        info!(session_id, record_id = %record.id, "session summarized into episodic memory");
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use crate::types::TurnMessage;
    use crate::vector::SqliteVectorIndex;
    use crate::ephemeral::InProcessEphemeralStore;
    use chrono::Utc;
    use muninn_config::model::{EmbeddingConfig, EpisodicConfig, WorkingMemoryConfig};
    use muninn_storage::Database;
    use muninn_test_utils::{MockCompletion, MockEmbedder};

    async fn setup(completion: MockCompletion) -> SessionSummarizer {
        let db = Database::open_in_memory().await.unwrap();
        let working = WorkingMemory::new(
            Arc::new(InProcessEphemeralStore::new()),
            &WorkingMemoryConfig::default(),
        );
        let episodic = EpisodicMemory::new(
            RecordStore::new(db.clone()),
            Arc::new(SqliteVectorIndex::new(db)),
            Arc::new(MockEmbedder::new()),
            &EpisodicConfig::default(),
            &EmbeddingConfig::default(),
        );
        SessionSummarizer::new(Arc::new(completion), working, episodic)
    }

    fn turn(role: TurnRole, content: &str) -> TurnMessage {
        TurnMessage {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_session_is_a_noop() {
        let summarizer = setup(MockCompletion::new()).await;
        let result = summarizer
            .summarize("owner-1", "session-1", None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn summarizes_and_clears_the_buffer() {
        let summarizer = setup(MockCompletion::with_responses(vec![
            "They named the new goldfish Bubbles and felt proud.".to_string(),
        ]))
        .await;

        summarizer
            .working
            .append("session-1", turn(TurnRole::User, "I named my goldfish Bubbles!"))
            .await
            .unwrap();
        summarizer
            .working
            .append("session-1", turn(TurnRole::Assistant, "What a great name!"))
            .await
            .unwrap();

        let record = summarizer
            .summarize("owner-1", "session-1", Some("storyteller"))
            .await
            .unwrap()
            .expect("summary record");

        assert_eq!(record.content, "They named the new goldfish Bubbles and felt proud.");
        assert_eq!(record.session_id.as_deref(), Some("session-1"));
        assert_eq!(record.agent_id.as_deref(), Some("storyteller"));
        assert_eq!(record.metadata["source"], serde_json::json!("session_summary"));
        assert_eq!(record.metadata["turn_count"], serde_json::json!(2));

        assert!(
            summarizer.working.read("session-1").await.unwrap().is_empty(),
            "buffer cleared after summarization"
        );
    }

    #[tokio::test]
    async fn summary_is_retrievable_from_episodic_memory() {
        let summarizer = setup(MockCompletion::with_responses(vec![
            "The child loves stories about dragons".to_string(),
        ]))
        .await;

        summarizer
            .working
            .append("session-1", turn(TurnRole::User, "tell me about dragons"))
            .await
            .unwrap();
        summarizer.summarize("owner-1", "session-1", None).await.unwrap();

        let recall = summarizer
            .episodic
            .retrieve("owner-1", "The child loves stories about dragons", Some(5), None)
            .await
            .unwrap();
        assert_eq!(recall.items.len(), 1);
    }
}
