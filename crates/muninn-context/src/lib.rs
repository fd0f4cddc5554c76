// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context assembly for Muninn prompt construction.
//!
//! Composes persona, owner profile, semantic knowledge, episodic memories,
//! and working memory into one ordered text block for the completion call.
//! The pipeline is failure-isolated: a memory-subsystem outage degrades to
//! a smaller (possibly empty) context, never an error.

pub mod assembler;

pub use assembler::ContextAssembler;
