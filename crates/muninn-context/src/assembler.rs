// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic, ordered context composition for a single AI turn.
//!
//! Section order is fixed so prompts are reproducible for the same inputs:
//! persona, profile, semantic knowledge, episodic memories, working memory.
//! Sections with no content are omitted entirely. Any failure anywhere in
//! the pipeline degrades to skipping the section; the caller always
//! receives a string, possibly empty.

use std::sync::Arc;

use chrono::Utc;
use muninn_config::model::ContextConfig;
use muninn_core::{MuninnError, PersonaProvider, ProfileProvider};
use muninn_memory::{EpisodicMemory, SemanticKnowledge, TurnRole, WorkingMemory};
use tracing::warn;

/// Composes persona, profile, and the three memory tiers into one prompt
/// context block.
#[derive(Clone)]
pub struct ContextAssembler {
    personas: Arc<dyn PersonaProvider>,
    profiles: Arc<dyn ProfileProvider>,
    semantic: SemanticKnowledge,
    episodic: EpisodicMemory,
    working: WorkingMemory,
    semantic_limit: usize,
    episodic_limit: usize,
}

impl ContextAssembler {
    /// Creates a new assembler over the given providers and memory tiers.
    pub fn new(
        personas: Arc<dyn PersonaProvider>,
        profiles: Arc<dyn ProfileProvider>,
        semantic: SemanticKnowledge,
        episodic: EpisodicMemory,
        working: WorkingMemory,
        config: &ContextConfig,
    ) -> Self {
        Self {
            personas,
            profiles,
            semantic,
            episodic,
            working,
            semantic_limit: config.semantic_limit,
            episodic_limit: config.episodic_limit,
        }
    }

    /// Build the context block for one AI turn.
    ///
    /// Never fails: the conversation path must always receive some string.
    pub async fn build(
        &self,
        owner_id: &str,
        session_id: &str,
        current_message: &str,
        agent_id: Option<&str>,
    ) -> String {
        match self
            .build_inner(owner_id, session_id, current_message, agent_id)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                warn!(owner_id, session_id, error = %e, "context assembly degraded to empty");
                String::new()
            }
        }
    }

    async fn build_inner(
        &self,
        owner_id: &str,
        session_id: &str,
        current_message: &str,
        agent_id: Option<&str>,
    ) -> Result<String, MuninnError> {
        let mut sections: Vec<String> = Vec::new();

        // 1. Persona block, if the agent resolves. Lookup failures and
        //    absent personas both mean "no section".
        if let Some(agent) = agent_id {
            match self.personas.get_persona(agent).await {
                Ok(Some(persona)) => {
                    let mut block = String::from("## Persona\n");
                    block.push_str(&persona.instructions);
                    block.push_str(&format!("\nTone: {}", persona.tone));
                    if !persona.expertise.is_empty() {
                        block.push_str(&format!("\nExpertise: {}", persona.expertise.join(", ")));
                    }
                    if !persona.constraints.is_empty() {
                        block.push_str(&format!(
                            "\nConstraints: {}",
                            persona.constraints.join("; ")
                        ));
                    }
                    sections.push(block);
                }
                Ok(None) => {}
                Err(e) => warn!(agent, error = %e, "persona lookup failed, omitting section"),
            }
        }

        // 2. Owner profile block, if a profile exists.
        match self.profiles.get_profile(owner_id).await {
            Ok(Some(profile)) => {
                let mut block = String::from("## Child Profile\n");
                block.push_str(&format!("Name: {}", profile.name));
                if let Some(age) = profile.age {
                    block.push_str(&format!("\nAge: {age}"));
                }
                if !profile.interests.is_empty() {
                    block.push_str(&format!("\nInterests: {}", profile.interests.join(", ")));
                }
                block.push_str(&format!("\nLanguage: {}", profile.language));
                sections.push(block);
            }
            Ok(None) => {}
            Err(e) => warn!(owner_id, error = %e, "profile lookup failed, omitting section"),
        }

        // 3. Semantic knowledge: top hits for the current message.
        //    Retrieval degrades internally; an empty result omits the section.
        let facts = self
            .semantic
            .retrieve(owner_id, current_message, Some(self.semantic_limit))
            .await?;
        if !facts.is_empty() {
            let mut block = String::from("## Known Facts\n");
            for hit in &facts.items {
                block.push_str(&format!("- {}\n", hit.content));
            }
            sections.push(block.trim_end().to_string());
        }

        // 4. Episodic memories, persona-scoped, annotated with whole-day age.
        let memories = self
            .episodic
            .retrieve(owner_id, current_message, Some(self.episodic_limit), agent_id)
            .await?;
        if !memories.is_empty() {
            let now = Utc::now();
            let mut block = String::from("## Past Memories\n");
            for record in &memories.items {
                block.push_str(&format!(
                    "- [{}] {}\n",
                    format_age(record.age_in_days(now)),
                    record.content
                ));
            }
            sections.push(block.trim_end().to_string());
        }

        // 5. Working memory: the session's buffered turns in order.
        let turns = self.working.read(session_id).await?;
        if !turns.is_empty() {
            let mut block = String::from("## Current Conversation\n");
            for turn in &turns {
                let role = match turn.role {
                    TurnRole::User => "child",
                    TurnRole::Assistant => "companion",
                    TurnRole::System => "system",
                };
                block.push_str(&format!("{role}: {}\n", turn.content));
            }
            sections.push(block.trim_end().to_string());
        }

        Ok(sections.join("\n"))
    }
}

/// Human-readable whole-day age annotation.
fn format_age(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{n} days ago"),
    }
}
