// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Muninn memory engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Muninn configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MuninnConfig {
    /// Relational store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Embedding provider settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Working memory (recent-turn buffer) settings.
    #[serde(default)]
    pub working: WorkingMemoryConfig,

    /// Episodic memory settings.
    #[serde(default)]
    pub episodic: EpisodicConfig,

    /// Semantic knowledge settings.
    #[serde(default)]
    pub semantic: SemanticConfig,

    /// Context assembly settings.
    #[serde(default)]
    pub context: ContextConfig,

    /// Maintenance scheduler settings.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

/// Relational store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file. WAL mode is always enabled.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "muninn.db".to_string()
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Base URL of the embeddings endpoint.
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// API key sent as a bearer token. Empty disables authentication.
    #[serde(default)]
    pub api_key: String,

    /// Embedding model identifier.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Expected dimensionality of returned vectors.
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    /// Per-request timeout in seconds. Retrieval treats expiry as a
    /// dependency failure and degrades to an empty result.
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_base_url(),
            api_key: String::new(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_embedding_timeout_secs() -> u64 {
    5
}

/// Working memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkingMemoryConfig {
    /// Maximum buffered turns per session; older turns are dropped.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Sliding time-to-live in seconds, reset on every append.
    #[serde(default = "default_working_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for WorkingMemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            ttl_secs: default_working_ttl_secs(),
        }
    }
}

fn default_max_turns() -> usize {
    10
}

fn default_working_ttl_secs() -> u64 {
    900
}

/// Episodic memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EpisodicConfig {
    /// Days until a new record's non-renewing expiry lease runs out.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Default number of nearest neighbors fetched per retrieval.
    #[serde(default = "default_retrieval_limit")]
    pub retrieval_limit: usize,

    /// Importance bump applied to every retrieved record, capped at 1.0.
    #[serde(default = "default_reinforcement")]
    pub reinforcement: f64,
}

impl Default for EpisodicConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            retrieval_limit: default_retrieval_limit(),
            reinforcement: default_reinforcement(),
        }
    }
}

fn default_retention_days() -> i64 {
    30
}

fn default_retrieval_limit() -> usize {
    10
}

fn default_reinforcement() -> f64 {
    0.05
}

/// Semantic knowledge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SemanticConfig {
    /// Default number of facts fetched per retrieval.
    #[serde(default = "default_retrieval_limit")]
    pub retrieval_limit: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            retrieval_limit: default_retrieval_limit(),
        }
    }
}

/// Context assembly configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Semantic knowledge hits included per assembled prompt.
    #[serde(default = "default_semantic_limit")]
    pub semantic_limit: usize,

    /// Episodic memory hits included per assembled prompt.
    #[serde(default = "default_episodic_limit")]
    pub episodic_limit: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            semantic_limit: default_semantic_limit(),
            episodic_limit: default_episodic_limit(),
        }
    }
}

fn default_semantic_limit() -> usize {
    5
}

fn default_episodic_limit() -> usize {
    3
}

/// Maintenance scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MaintenanceConfig {
    /// Cron expression for the daily decay job.
    #[serde(default = "default_decay_cron")]
    pub decay_cron: String,

    /// Cron expression for the daily expiration job. Scheduled in a
    /// different slot than decay to avoid contention.
    #[serde(default = "default_expiration_cron")]
    pub expiration_cron: String,

    /// Importance lost per day of record age, per decay run.
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,

    /// Records loaded per page during maintenance scans.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            decay_cron: default_decay_cron(),
            expiration_cron: default_expiration_cron(),
            decay_rate: default_decay_rate(),
            page_size: default_page_size(),
        }
    }
}

fn default_decay_cron() -> String {
    "0 3 * * *".to_string()
}

fn default_expiration_cron() -> String {
    "0 4 * * *".to_string()
}

fn default_decay_rate() -> f64 {
    0.01
}

fn default_page_size() -> usize {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MuninnConfig::default();
        assert_eq!(config.working.max_turns, 10);
        assert_eq!(config.working.ttl_secs, 900);
        assert_eq!(config.episodic.retention_days, 30);
        assert_eq!(config.episodic.reinforcement, 0.05);
        assert_eq!(config.context.semantic_limit, 5);
        assert_eq!(config.context.episodic_limit, 3);
        assert_eq!(config.maintenance.decay_rate, 0.01);
        assert_eq!(config.storage.database_path, "muninn.db");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[working]
max_turns = 20
"#;
        let config: MuninnConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.working.max_turns, 20);
        assert_eq!(config.working.ttl_secs, 900);
        assert_eq!(config.episodic.retention_days, 30);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let toml_str = r#"
[episodic]
retention_dys = 14
"#;
        let result = toml::from_str::<MuninnConfig>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn maintenance_crons_use_distinct_slots() {
        let config = MuninnConfig::default();
        assert_ne!(config.maintenance.decay_cron, config.maintenance.expiration_cron);
    }
}
