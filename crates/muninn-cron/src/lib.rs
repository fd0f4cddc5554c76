// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maintenance scheduling for the Muninn memory engine.
//!
//! Hosts the two unsupervised background jobs over episodic memory:
//! age-proportional importance decay and expiry-lease enforcement. Jobs
//! run on cron schedules in distinct daily slots, guarded by per-job
//! leases that skip (never queue) overlapping runs.

pub mod scheduler;

pub use scheduler::MaintenanceScheduler;
