// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: rate ranges, non-zero limits, parseable cron expressions.

use crate::diagnostic::ConfigError;
use crate::model::MuninnConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MuninnConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.embedding.dimensions == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.dimensions must be greater than zero".to_string(),
        });
    }

    if config.embedding.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.timeout_secs must be greater than zero".to_string(),
        });
    }

    if config.working.max_turns == 0 {
        errors.push(ConfigError::Validation {
            message: "working.max_turns must be greater than zero".to_string(),
        });
    }

    if config.episodic.retention_days <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "episodic.retention_days must be positive, got {}",
                config.episodic.retention_days
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.episodic.reinforcement) {
        errors.push(ConfigError::Validation {
            message: format!(
                "episodic.reinforcement must be within [0, 1], got {}",
                config.episodic.reinforcement
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.maintenance.decay_rate) {
        errors.push(ConfigError::Validation {
            message: format!(
                "maintenance.decay_rate must be within [0, 1], got {}",
                config.maintenance.decay_rate
            ),
        });
    }

    if config.maintenance.page_size == 0 {
        errors.push(ConfigError::Validation {
            message: "maintenance.page_size must be greater than zero".to_string(),
        });
    }

    for (field, expr) in [
        ("maintenance.decay_cron", &config.maintenance.decay_cron),
        (
            "maintenance.expiration_cron",
            &config.maintenance.expiration_cron,
        ),
    ] {
        if let Err(e) = expr.parse::<croner::Cron>() {
            errors.push(ConfigError::Validation {
                message: format!("{field} `{expr}` is not a valid cron expression: {e}"),
            });
        }
    }

    for (field, limit) in [
        ("episodic.retrieval_limit", config.episodic.retrieval_limit),
        ("semantic.retrieval_limit", config.semantic.retrieval_limit),
        ("context.semantic_limit", config.context.semantic_limit),
        ("context.episodic_limit", config.context.episodic_limit),
    ] {
        if limit == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{field} must be greater than zero"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
