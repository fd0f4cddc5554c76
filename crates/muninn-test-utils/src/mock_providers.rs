// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture-backed persona/profile lookups and a mock completion.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use muninn_core::types::{AdapterType, HealthStatus, OwnerProfile, Persona};
use muninn_core::{
    Completion, MemoryAdapter, MuninnError, PersonaProvider, ProfileProvider,
};

macro_rules! impl_memory_adapter {
    ($ty:ty, $name:expr, $adapter_type:expr) => {
        #[async_trait]
        impl MemoryAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $adapter_type
            }

            async fn health_check(&self) -> Result<HealthStatus, MuninnError> {
                Ok(HealthStatus::Healthy)
            }

            async fn shutdown(&self) -> Result<(), MuninnError> {
                Ok(())
            }
        }
    };
}

/// Persona lookup backed by an in-memory fixture map.
#[derive(Default)]
pub struct MockPersonaProvider {
    personas: HashMap<String, Persona>,
}

impl MockPersonaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a persona fixture under the given agent id.
    pub fn with_persona(mut self, agent_id: &str, persona: Persona) -> Self {
        self.personas.insert(agent_id.to_string(), persona);
        self
    }
}

impl_memory_adapter!(MockPersonaProvider, "mock-persona", AdapterType::Persona);

#[async_trait]
impl PersonaProvider for MockPersonaProvider {
    async fn get_persona(&self, agent_id: &str) -> Result<Option<Persona>, MuninnError> {
        Ok(self.personas.get(agent_id).cloned())
    }
}

/// Profile lookup backed by an in-memory fixture map.
#[derive(Default)]
pub struct MockProfileProvider {
    profiles: HashMap<String, OwnerProfile>,
}

impl MockProfileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile fixture under the given owner id.
    pub fn with_profile(mut self, owner_id: &str, profile: OwnerProfile) -> Self {
        self.profiles.insert(owner_id.to_string(), profile);
        self
    }
}

impl_memory_adapter!(MockProfileProvider, "mock-profile", AdapterType::Profile);

#[async_trait]
impl ProfileProvider for MockProfileProvider {
    async fn get_profile(&self, owner_id: &str) -> Result<Option<OwnerProfile>, MuninnError> {
        Ok(self.profiles.get(owner_id).cloned())
    }
}

/// A mock completion that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default "mock summary" text is returned.
pub struct MockCompletion {
    responses: Arc<Mutex<VecDeque<String>>>,
}

impl MockCompletion {
    /// Create a new mock completion with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a mock completion pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

impl_memory_adapter!(MockCompletion, "mock-completion", AdapterType::Completion);

#[async_trait]
impl Completion for MockCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, MuninnError> {
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock summary".to_string()))
    }
}
