// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Importance scoring for new episodic records.
//!
//! The score is a bounded, deterministic function of the content and the
//! turn metadata: a fixed base plus additive evidence bumps, clamped to
//! [0, 1]. The keyword list is a naive stand-in for a classifier; any
//! replacement must keep the range and the monotonic-with-evidence shape.

use std::collections::BTreeMap;

/// Base score assigned to every new episodic record.
const BASE_IMPORTANCE: f64 = 0.5;

/// Content length (chars) above which a turn counts as information-dense.
const LONG_CONTENT_THRESHOLD: usize = 120;

/// Emotionally charged vocabulary checked against lowercased content.
const EMOTIONAL_WORDS: &[&str] = &[
    "love", "hate", "scared", "afraid", "excited", "happy", "sad", "angry",
    "cry", "crying", "laugh", "favorite", "best", "worst", "miss", "proud",
    "worried", "nervous", "amazing", "terrible",
];

/// Compute the importance of a new episodic record.
///
/// Base 0.5, +0.2 for emotionally charged vocabulary, +0.15 when the
/// metadata marks the turn user-initiated, +0.1 for long content, +0.1
/// when the metadata lists any emotions. Clamped to 1.0.
pub fn score_importance(
    content: &str,
    metadata: &BTreeMap<String, serde_json::Value>,
) -> f64 {
    let mut score = BASE_IMPORTANCE;

    if contains_emotional_vocabulary(content) {
        score += 0.2;
    }

    if metadata
        .get("user_initiated")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        score += 0.15;
    }

    if content.chars().count() > LONG_CONTENT_THRESHOLD {
        score += 0.1;
    }

    if metadata
        .get("emotions")
        .and_then(|v| v.as_array())
        .is_some_and(|emotions| !emotions.is_empty())
    {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

/// True when the content carries any word from the emotional vocabulary.
fn contains_emotional_vocabulary(content: &str) -> bool {
    let lowered = content.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| EMOTIONAL_WORDS.contains(&word))
}
