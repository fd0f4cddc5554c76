// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types for the Muninn engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The durable memory record: one row in the relational store paired with
/// one entry in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier for this record.
    pub id: String,
    /// The owner this memory belongs to.
    pub owner_id: String,
    /// The interaction session that produced it, if any.
    pub session_id: Option<String>,
    /// When set, the record is visible only to this persona; when `None`
    /// ("shared"), it is visible to every persona of the owner. Scope is
    /// set once at write time and never mutated.
    pub agent_id: Option<String>,
    /// Which memory tier the record belongs to.
    pub kind: MemoryKind,
    /// Filtering/labeling category. Never used for access control.
    pub category: MemoryCategory,
    /// The natural-language text that was embedded and is shown to the model.
    pub content: String,
    /// Open tag map (emotions, topics, entities, source), carried verbatim
    /// to the vector store and into assembled context.
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// The paired entry in the vector index.
    pub vector_ref: VectorRef,
    /// Ranking and survival weight in [0, 1]. Advisory, not a counter.
    pub importance: f64,
    /// Monotonically non-decreasing count of retrievals.
    pub access_count: i64,
    /// Set on every retrieval.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Set once at creation, immutable.
    pub created_at: DateTime<Utc>,
    /// Non-renewing expiry lease computed at creation from the owner's
    /// retention policy. Once past, the record is eligible for deletion.
    pub expires_at: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    /// Whole days elapsed since creation, as seen from `now`.
    pub fn age_in_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days().max(0)
    }
}

/// Which memory tier a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryKind {
    /// A durable record of a specific past interaction.
    Episodic,
    /// A distilled fact about the owner, not tied to one interaction.
    Semantic,
    /// Reserved; unused by current behavior.
    Procedural,
}

impl MemoryKind {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Episodic => "episodic",
            MemoryKind::Semantic => "semantic",
            MemoryKind::Procedural => "procedural",
        }
    }

    /// Parse from SQLite string.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "semantic" => MemoryKind::Semantic,
            "procedural" => MemoryKind::Procedural,
            _ => MemoryKind::Episodic,
        }
    }
}

/// Closed labeling taxonomy for memory records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryCategory {
    Conversation,
    Interest,
    Emotion,
    Achievement,
    Routine,
    Preference,
    Learning,
    Family,
    Other,
}

impl MemoryCategory {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Conversation => "conversation",
            MemoryCategory::Interest => "interest",
            MemoryCategory::Emotion => "emotion",
            MemoryCategory::Achievement => "achievement",
            MemoryCategory::Routine => "routine",
            MemoryCategory::Preference => "preference",
            MemoryCategory::Learning => "learning",
            MemoryCategory::Family => "family",
            MemoryCategory::Other => "other",
        }
    }

    /// Parse from SQLite string; unknown labels fall back to `Other`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "conversation" => MemoryCategory::Conversation,
            "interest" => MemoryCategory::Interest,
            "emotion" => MemoryCategory::Emotion,
            "achievement" => MemoryCategory::Achievement,
            "routine" => MemoryCategory::Routine,
            "preference" => MemoryCategory::Preference,
            "learning" => MemoryCategory::Learning,
            "family" => MemoryCategory::Family,
            _ => MemoryCategory::Other,
        }
    }
}

/// Pair identifying a record's entry in the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorRef {
    pub namespace: String,
    pub id: String,
}

/// One buffered conversation turn in working memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMessage {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Speaker role of a buffered turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
    System,
}

/// A raw semantic knowledge hit: fact content plus vector similarity.
#[derive(Debug, Clone)]
pub struct SemanticHit {
    pub content: String,
    pub similarity: f32,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Result of a read-path retrieval that may have degraded.
///
/// Dependency failures on the read path never surface as errors; they
/// produce an empty `Recall` with `degraded` set so callers can observe
/// the outage for monitoring without it blocking the conversation.
#[derive(Debug, Clone)]
pub struct Recall<T> {
    pub items: Vec<T>,
    pub degraded: bool,
}

impl<T> Recall<T> {
    /// A healthy result.
    pub fn ok(items: Vec<T>) -> Self {
        Self {
            items,
            degraded: false,
        }
    }

    /// An empty result produced by a swallowed dependency failure.
    pub fn degraded() -> Self {
        Self {
            items: Vec::new(),
            degraded: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Namespace for an owner's episodic memories in the vector index.
pub fn episodic_namespace(owner_id: &str) -> String {
    format!("episodic:{owner_id}")
}

/// Namespace for an owner's semantic knowledge in the vector index.
pub fn semantic_namespace(owner_id: &str) -> String {
    format!("semantic:{owner_id}")
}

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips() {
        for kind in [MemoryKind::Episodic, MemoryKind::Semantic, MemoryKind::Procedural] {
            assert_eq!(MemoryKind::from_str_value(kind.as_str()), kind);
        }
    }

    #[test]
    fn category_round_trips_with_other_fallback() {
        for category in [
            MemoryCategory::Conversation,
            MemoryCategory::Interest,
            MemoryCategory::Emotion,
            MemoryCategory::Achievement,
            MemoryCategory::Routine,
            MemoryCategory::Preference,
            MemoryCategory::Learning,
            MemoryCategory::Family,
            MemoryCategory::Other,
        ] {
            assert_eq!(MemoryCategory::from_str_value(category.as_str()), category);
        }
        assert_eq!(
            MemoryCategory::from_str_value("not-a-category"),
            MemoryCategory::Other
        );
    }

    #[test]
    fn namespaces_are_partitioned_per_owner() {
        assert_eq!(episodic_namespace("owner-1"), "episodic:owner-1");
        assert_eq!(semantic_namespace("owner-1"), "semantic:owner-1");
        assert_ne!(episodic_namespace("owner-1"), episodic_namespace("owner-2"));
    }

    #[test]
    fn vec_to_blob_roundtrip() {
        let original = vec![0.1_f32, 0.2, 0.3, -0.5, 1.0];
        let blob = vec_to_blob(&original);
        let recovered = blob_to_vec(&blob);
        assert_eq!(original.len(), recovered.len());
        for (a, b) in original.iter().zip(recovered.iter()) {
            assert!((a - b).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn cosine_similarity_identical() {
        let v = vec![0.3_f32, 0.5, 0.8];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6, "identical vectors should have sim ~1.0, got {sim}");
    }

    #[test]
    fn cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_similarity_zero_vector_is_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn age_in_days_never_negative() {
        let now = Utc::now();
        let record = MemoryRecord {
            id: "r1".into(),
            owner_id: "owner-1".into(),
            session_id: None,
            agent_id: None,
            kind: MemoryKind::Episodic,
            category: MemoryCategory::Conversation,
            content: "hello".into(),
            metadata: BTreeMap::new(),
            vector_ref: VectorRef {
                namespace: "episodic:owner-1".into(),
                id: "r1".into(),
            },
            importance: 0.5,
            access_count: 0,
            last_accessed_at: None,
            created_at: now + chrono::Duration::hours(1),
            expires_at: None,
        };
        assert_eq!(record.age_in_days(now), 0);
    }

    #[test]
    fn recall_degraded_is_empty_and_flagged() {
        let recall: Recall<MemoryRecord> = Recall::degraded();
        assert!(recall.is_empty());
        assert!(recall.degraded);

        let recall: Recall<i32> = Recall::ok(vec![1, 2]);
        assert!(!recall.degraded);
        assert_eq!(recall.items.len(), 2);
    }
}
