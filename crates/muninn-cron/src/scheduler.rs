// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron-driven maintenance over episodic memory.
//!
//! Two unsupervised daily jobs: importance decay and expiration. Each job
//! carries a process-local lease that skips a firing entirely while the
//! previous run of the same job is still in progress; runs are never
//! queued. The loop itself is cancellable; decay additionally honors
//! cancellation at page boundaries.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use croner::Cron;
use muninn_config::model::MaintenanceConfig;
use muninn_core::MuninnError;
use muninn_memory::EpisodicMemory;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Fallback poll interval when a cron yields no next occurrence.
const IDLE_INTERVAL: Duration = Duration::from_secs(60);

/// RAII lease over a job's in-progress flag. Released on drop, so a
/// panicking job does not wedge its schedule.
struct JobLease<'a> {
    flag: &'a AtomicBool,
}

impl<'a> JobLease<'a> {
    /// Acquire the lease, or `None` if the job is already running.
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for JobLease<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Runs the decay and expiration jobs on their configured cron schedules.
#[derive(Clone)]
pub struct MaintenanceScheduler {
    episodic: EpisodicMemory,
    decay_cron: Cron,
    expiration_cron: Cron,
    decay_rate: f64,
    page_size: usize,
    decay_running: Arc<AtomicBool>,
    expiration_running: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for MaintenanceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceScheduler")
            .field("decay_rate", &self.decay_rate)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl MaintenanceScheduler {
    /// Creates a scheduler from config; both cron expressions are parsed
    /// up front so a malformed schedule fails at startup, not at 3 AM.
    pub fn new(
        episodic: EpisodicMemory,
        config: &MaintenanceConfig,
    ) -> Result<Self, MuninnError> {
        let decay_cron = Cron::from_str(&config.decay_cron).map_err(|e| {
            MuninnError::Config(format!(
                "invalid decay cron `{}`: {e}",
                config.decay_cron
            ))
        })?;
        let expiration_cron = Cron::from_str(&config.expiration_cron).map_err(|e| {
            MuninnError::Config(format!(
                "invalid expiration cron `{}`: {e}",
                config.expiration_cron
            ))
        })?;

        Ok(Self {
            episodic,
            decay_cron,
            expiration_cron,
            decay_rate: config.decay_rate,
            page_size: config.page_size,
            decay_running: Arc::new(AtomicBool::new(false)),
            expiration_running: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
        })
    }

    /// Token that stops the scheduler loop and, at the next page boundary,
    /// an in-flight decay run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one decay pass now, unless the previous pass is still running.
    ///
    /// Returns the number of records updated, or `None` if the lease was
    /// held and the run was skipped.
    pub async fn run_decay_once(&self) -> Result<Option<u64>, MuninnError> {
        let Some(_lease) = JobLease::try_acquire(&self.decay_running) else {
            warn!("decay job still in progress, skipping this run");
            return Ok(None);
        };

        let now = Utc::now();
        let updated = self
            .episodic
            .decay(self.decay_rate, now, self.page_size, &self.cancel)
            .await?;
        info!(updated, "decay pass complete");
        Ok(Some(updated))
    }

    /// Run one expiration pass now, unless the previous pass is still
    /// running. Returns the number of records deleted, or `None` if skipped.
    pub async fn run_expiration_once(&self) -> Result<Option<u64>, MuninnError> {
        let Some(_lease) = JobLease::try_acquire(&self.expiration_running) else {
            warn!("expiration job still in progress, skipping this run");
            return Ok(None);
        };

        let deleted = self.episodic.expire_older_than(Utc::now()).await?;
        info!(deleted, "expiration pass complete");
        Ok(Some(deleted))
    }

    /// Run the scheduler loop. Spawn this as a background task.
    ///
    /// Jobs run detached so a slow decay cannot delay the expiration
    /// slot; the per-job leases prevent self-overlap.
    pub async fn run(self) {
        info!("maintenance scheduler started");

        loop {
            let now = Utc::now();
            let next_decay = next_occurrence(&self.decay_cron, now);
            let next_expiration = next_occurrence(&self.expiration_cron, now);

            let sleep_for = [next_decay, next_expiration]
                .into_iter()
                .flatten()
                .map(|next| (next - now).to_std().unwrap_or(Duration::ZERO))
                .min()
                .unwrap_or(IDLE_INTERVAL);

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("maintenance scheduler stopped");
                    return;
                }
                _ = tokio::time::sleep(sleep_for) => {}
            }

            let now = Utc::now();
            if due(next_decay, now) {
                let scheduler = self.clone();
                tokio::spawn(async move {
                    debug!("decay slot fired");
                    if let Err(e) = scheduler.run_decay_once().await {
                        error!(error = %e, "decay job failed");
                    }
                });
            }
            if due(next_expiration, now) {
                let scheduler = self.clone();
                tokio::spawn(async move {
                    debug!("expiration slot fired");
                    if let Err(e) = scheduler.run_expiration_once().await {
                        error!(error = %e, "expiration job failed");
                    }
                });
            }
        }
    }
}

/// Next occurrence of a cron schedule strictly after `now`.
fn next_occurrence(cron: &Cron, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    cron.find_next_occurrence(&now, false).ok()
}

/// True when a computed slot has come due.
fn due(slot: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    slot.is_some_and(|at| at <= now)
}
