// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral key-value store trait with per-key TTL.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::MuninnError;
use crate::traits::adapter::MemoryAdapter;

/// Adapter for a key-value store with per-key expiry, used for working memory.
///
/// Keys are partitioned per session by the caller. A `get` on an absent or
/// expired key returns `None`; expiry is never an error.
#[async_trait]
pub trait EphemeralStore: MemoryAdapter {
    /// Returns the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MuninnError>;

    /// Stores `value` under `key`, replacing any prior value and resetting
    /// the key's time-to-live to `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), MuninnError>;

    /// Removes `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), MuninnError>;
}
