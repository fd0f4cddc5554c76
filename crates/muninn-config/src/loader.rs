// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./muninn.toml` > `~/.config/muninn/muninn.toml`
//! > `/etc/muninn/muninn.toml` with environment variable overrides via the
//! `MUNINN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MuninnConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/muninn/muninn.toml` (system-wide)
/// 3. `~/.config/muninn/muninn.toml` (user XDG config)
/// 4. `./muninn.toml` (local directory)
/// 5. `MUNINN_*` environment variables
pub fn load_config() -> Result<MuninnConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MuninnConfig::default()))
        .merge(Toml::file("/etc/muninn/muninn.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("muninn/muninn.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("muninn.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config selection.
pub fn load_config_from_str(toml_content: &str) -> Result<MuninnConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MuninnConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MuninnConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MuninnConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MUNINN_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("MUNINN_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("storage_", "storage.", 1)
            .replacen("embedding_", "embedding.", 1)
            .replacen("working_", "working.", 1)
            .replacen("episodic_", "episodic.", 1)
            .replacen("semantic_", "semantic.", 1)
            .replacen("context_", "context.", 1)
            .replacen("maintenance_", "maintenance.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.working.max_turns, 10);
        assert_eq!(config.storage.database_path, "muninn.db");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[storage]
database_path = "/var/lib/muninn/memories.db"

[maintenance]
decay_rate = 0.02
"#,
        )
        .unwrap();
        assert_eq!(config.storage.database_path, "/var/lib/muninn/memories.db");
        assert_eq!(config.maintenance.decay_rate, 0.02);
        // Untouched sections keep defaults.
        assert_eq!(config.episodic.retention_days, 30);
    }
}
