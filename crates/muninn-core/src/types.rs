// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Muninn engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Embedding,
    Vector,
    Ephemeral,
    Persona,
    Profile,
    Completion,
}

// --- Embedding types ---

/// Input for an embedding provider: one or more texts to embed.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding provider.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// One vector per input text, in input order.
    pub embeddings: Vec<Vec<f32>>,
    /// Dimensionality of each vector.
    pub dimensions: usize,
}

// --- Vector index types ---

/// An entry to upsert into a vector index namespace.
#[derive(Debug, Clone)]
pub struct VectorEntry {
    /// Identifier, unique within the namespace.
    pub id: String,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// The original text the vector was computed from.
    pub document: String,
    /// Arbitrary metadata carried through verbatim to query results.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A single nearest-neighbor match returned by a vector index query.
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub document: String,
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Cosine similarity to the query vector, higher is closer.
    pub similarity: f32,
}

/// Exact-match metadata predicates applied to vector query results.
///
/// An empty filter matches every entry.
#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    pub equals: BTreeMap<String, serde_json::Value>,
}

impl MetadataFilter {
    /// A filter with no predicates.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add an exact-match predicate.
    pub fn with(mut self, key: &str, value: serde_json::Value) -> Self {
        self.equals.insert(key.to_string(), value);
        self
    }

    /// True if `metadata` satisfies every predicate.
    pub fn matches(&self, metadata: &BTreeMap<String, serde_json::Value>) -> bool {
        self.equals
            .iter()
            .all(|(k, v)| metadata.get(k) == Some(v))
    }
}

// --- Persona & profile types ---

/// A configured AI persona, resolved by the persona provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub instructions: String,
    pub tone: String,
    pub expertise: Vec<String>,
    pub constraints: Vec<String>,
}

/// Owner profile data, resolved by the profile provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerProfile {
    pub name: String,
    pub age: Option<u8>,
    pub interests: Vec<String>,
    pub language: String,
}
