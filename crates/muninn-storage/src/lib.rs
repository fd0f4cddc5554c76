// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Muninn memory engine.
//!
//! Owns the database lifecycle: connection setup with WAL mode, embedded
//! refinery migrations, and graceful close with WAL checkpointing. The
//! memory crates receive a [`Database`] handle and run their own typed
//! queries against it.

pub mod database;
pub mod migrations;

pub use database::{map_tr_err, Database};
