// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona and profile lookup traits.
//!
//! Both lookups treat absence as "no data" rather than an error: a missing
//! persona or profile is silently omitted from assembled context.

use async_trait::async_trait;

use crate::error::MuninnError;
use crate::traits::adapter::MemoryAdapter;
use crate::types::{OwnerProfile, Persona};

/// Resolves a configured AI persona by agent id.
#[async_trait]
pub trait PersonaProvider: MemoryAdapter {
    /// Returns the persona for `agent_id`, or `None` if not configured.
    async fn get_persona(&self, agent_id: &str) -> Result<Option<Persona>, MuninnError>;
}

/// Resolves owner profile data by owner id.
#[async_trait]
pub trait ProfileProvider: MemoryAdapter {
    /// Returns the profile for `owner_id`, or `None` if not on record.
    async fn get_profile(&self, owner_id: &str) -> Result<Option<OwnerProfile>, MuninnError>;
}
