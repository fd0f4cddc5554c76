// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Muninn collaborator boundary.
//!
//! Every external collaborator (embedding provider, vector index, ephemeral
//! cache, persona/profile lookup, completion) sits behind one of these
//! traits. All adapters extend the [`MemoryAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod completion;
pub mod embedding;
pub mod ephemeral;
pub mod persona;
pub mod vector;

pub use adapter::MemoryAdapter;
pub use completion::Completion;
pub use embedding::EmbeddingProvider;
pub use ephemeral::EphemeralStore;
pub use persona::{PersonaProvider, ProfileProvider};
pub use vector::VectorIndex;
