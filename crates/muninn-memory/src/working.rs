// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Working memory: the bounded recent-turn buffer per session.
//!
//! Entirely ephemeral. Each append rewrites the session's buffer with a
//! sliding TTL, so an idle session's memory disappears on its own a fixed
//! time after the last turn, independent of session lifetime.

use std::sync::Arc;
use std::time::Duration;

use muninn_config::model::WorkingMemoryConfig;
use muninn_core::{EphemeralStore, MuninnError};
use tracing::warn;

use crate::types::TurnMessage;

/// Bounded recent-turn buffer over an [`EphemeralStore`].
#[derive(Clone)]
pub struct WorkingMemory {
    store: Arc<dyn EphemeralStore>,
    max_turns: usize,
    ttl: Duration,
}

impl WorkingMemory {
    /// Creates a new buffer over the given ephemeral store.
    pub fn new(store: Arc<dyn EphemeralStore>, config: &WorkingMemoryConfig) -> Self {
        Self {
            store,
            max_turns: config.max_turns,
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }

    fn key(session_id: &str) -> String {
        format!("wm:{session_id}")
    }

    /// Append a turn to the session's buffer.
    ///
    /// Reads the current list (empty if absent or expired), appends,
    /// truncates to the most recent `max_turns`, and rewrites with a fresh
    /// TTL. An absent key is not an error.
    pub async fn append(
        &self,
        session_id: &str,
        message: TurnMessage,
    ) -> Result<(), MuninnError> {
        let mut turns = self.read(session_id).await?;
        turns.push(message);
        if turns.len() > self.max_turns {
            let drop = turns.len() - self.max_turns;
            turns.drain(..drop);
        }

        let bytes = serde_json::to_vec(&turns)
            .map_err(|e| MuninnError::Internal(format!("failed to encode turn buffer: {e}")))?;
        self.store.set(&Self::key(session_id), bytes, self.ttl).await
    }

    /// Return the session's buffered turns, oldest first; empty if none.
    pub async fn read(&self, session_id: &str) -> Result<Vec<TurnMessage>, MuninnError> {
        let Some(bytes) = self.store.get(&Self::key(session_id)).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice(&bytes) {
            Ok(turns) => Ok(turns),
            Err(e) => {
                // A corrupt buffer is discarded rather than wedging the session.
                warn!(session_id, error = %e, "discarding undecodable turn buffer");
                self.store.delete(&Self::key(session_id)).await?;
                Ok(Vec::new())
            }
        }
    }

    /// Drop the session's buffer, called at session end.
    pub async fn clear(&self, session_id: &str) -> Result<(), MuninnError> {
        self.store.delete(&Self::key(session_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeral::InProcessEphemeralStore;
    use crate::types::TurnRole;
    use chrono::Utc;

    fn working(max_turns: usize, ttl_secs: u64) -> WorkingMemory {
        WorkingMemory::new(
            Arc::new(InProcessEphemeralStore::new()),
            &WorkingMemoryConfig { max_turns, ttl_secs },
        )
    }

    fn turn(role: TurnRole, content: &str) -> TurnMessage {
        TurnMessage {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn read_of_absent_session_is_empty() {
        let wm = working(10, 900);
        assert!(wm.read("session-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_preserves_turn_order() {
        let wm = working(10, 900);
        wm.append("session-1", turn(TurnRole::User, "hi")).await.unwrap();
        wm.append("session-1", turn(TurnRole::Assistant, "hello!"))
            .await
            .unwrap();
        wm.append("session-1", turn(TurnRole::User, "tell me a story"))
            .await
            .unwrap();

        let turns = wm.read("session-1").await.unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content, "hi");
        assert_eq!(turns[1].content, "hello!");
        assert_eq!(turns[2].content, "tell me a story");
    }

    #[tokio::test]
    async fn twelve_appends_keep_ten_most_recent() {
        let wm = working(10, 900);
        for i in 0..12 {
            wm.append("session-1", turn(TurnRole::User, &format!("turn {i}")))
                .await
                .unwrap();
        }

        let turns = wm.read("session-1").await.unwrap();
        assert_eq!(turns.len(), 10);
        assert_eq!(turns[0].content, "turn 2", "oldest surviving turn");
        assert_eq!(turns[9].content, "turn 11", "most recent turn");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let wm = working(10, 900);
        wm.append("session-1", turn(TurnRole::User, "mine")).await.unwrap();
        wm.append("session-2", turn(TurnRole::User, "theirs"))
            .await
            .unwrap();

        let turns = wm.read("session-1").await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "mine");
    }

    #[tokio::test]
    async fn clear_empties_the_session() {
        let wm = working(10, 900);
        wm.append("session-1", turn(TurnRole::User, "hi")).await.unwrap();
        wm.clear("session-1").await.unwrap();
        assert!(wm.read("session-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_buffer_is_discarded() {
        let store = Arc::new(InProcessEphemeralStore::new());
        let wm = WorkingMemory::new(
            store.clone(),
            &WorkingMemoryConfig {
                max_turns: 10,
                ttl_secs: 900,
            },
        );
        store
            .set("wm:session-1", b"not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(wm.read("session-1").await.unwrap().is_empty());
        // A later append starts a fresh buffer.
        wm.append("session-1", turn(TurnRole::User, "fresh")).await.unwrap();
        assert_eq!(wm.read("session-1").await.unwrap().len(), 1);
    }
}
