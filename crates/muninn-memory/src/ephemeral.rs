// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process implementation of the EphemeralStore trait.
//!
//! Keys expire lazily on read; `purge_expired` sweeps the map for
//! long-running processes. Deployments with an external cache substitute
//! their own adapter behind the same trait.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use muninn_core::{AdapterType, EphemeralStore, HealthStatus, MemoryAdapter, MuninnError};

struct Entry {
    value: Vec<u8>,
    deadline: Instant,
}

/// TTL key-value store backed by a concurrent in-process map.
#[derive(Default)]
pub struct InProcessEphemeralStore {
    entries: DashMap<String, Entry>,
}

impl InProcessEphemeralStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry. Called opportunistically; correctness
    /// does not depend on it because reads check the deadline themselves.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.deadline > now);
    }
}

#[async_trait]
impl MemoryAdapter for InProcessEphemeralStore {
    fn name(&self) -> &str {
        "in-process"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Ephemeral
    }

    async fn health_check(&self) -> Result<HealthStatus, MuninnError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MuninnError> {
        self.entries.clear();
        Ok(())
    }
}

#[async_trait]
impl EphemeralStore for InProcessEphemeralStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MuninnError> {
        if let Some(entry) = self.entries.get(key) {
            if entry.deadline > Instant::now() {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Expired entries are dropped on first read past the deadline.
        self.entries
            .remove_if(key, |_, entry| entry.deadline <= Instant::now());
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), MuninnError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                deadline: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), MuninnError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let store = InProcessEphemeralStore::new();
        store
            .set("k1", b"hello".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k1").await.unwrap(), Some(b"hello".to_vec()));

        store.delete("k1").await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn absent_key_is_none() {
        let store = InProcessEphemeralStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_key_is_none() {
        let store = InProcessEphemeralStore::new();
        store
            .set("k1", b"v".to_vec(), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_resets_ttl() {
        let store = InProcessEphemeralStore::new();
        store
            .set("k1", b"v1".to_vec(), Duration::from_millis(40))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;

        // Rewrite before expiry; the deadline slides forward.
        store
            .set("k1", b"v2".to_vec(), Duration::from_millis(40))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;

        assert_eq!(store.get("k1").await.unwrap(), Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn purge_expired_sweeps_dead_entries() {
        let store = InProcessEphemeralStore::new();
        store
            .set("dead", b"v".to_vec(), Duration::from_millis(5))
            .await
            .unwrap();
        store
            .set("alive", b"v".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        store.purge_expired();
        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.get("alive").await.unwrap(), Some(b"v".to_vec()));
    }
}
