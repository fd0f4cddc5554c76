// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion trait for the summarization LLM call.

use async_trait::async_trait;

use crate::error::MuninnError;
use crate::traits::adapter::MemoryAdapter;

/// Adapter for a single-shot text completion.
///
/// Consumed only by session summarization, which feeds episodic memory;
/// the conversational read/write path never calls this.
#[async_trait]
pub trait Completion: MemoryAdapter {
    /// Returns the model's completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, MuninnError>;
}
