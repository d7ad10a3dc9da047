//! Reclamation of expired artifacts and jobs.
//!
//! Two clocks run against the same store:
//!
//! - **Artifact expiry**: every artifact is pushed into one time-ordered
//!   [`ExpiryQueue`] when it is produced. A sweep pops everything older than
//!   `artifact_ttl` and deletes the files. The job keeps its `Done` state;
//!   readers then find the file gone.
//! - **Job eviction**: a sweep evicts jobs created more than `job_retention`
//!   ago and deletes whatever artifacts they still own.
//!
//! There are no per-file timers. Sweeps run on an interval, on demand via
//! [`Janitor::trigger`], or directly through [`Janitor::sweep`] with an
//! explicit clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use narrato_core::{ArtifactRef, JobSettings};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::artifacts::ArtifactStore;
use crate::store::{JobStore, cutoff};

// ── Expiry queue ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct ExpiryEntry {
    produced_at: DateTime<Utc>,
    artifact: ArtifactRef,
}

/// Artifacts ordered by production time, oldest first.
#[derive(Debug, Default)]
pub struct ExpiryQueue {
    entries: Mutex<VecDeque<ExpiryEntry>>,
}

impl ExpiryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact produced at `produced_at`.
    ///
    /// Out-of-order pushes are inserted in place so the front is always the
    /// oldest entry.
    pub fn push(&self, artifact: ArtifactRef, produced_at: DateTime<Utc>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let at = entries.partition_point(|e| e.produced_at <= produced_at);
        entries.insert(
            at,
            ExpiryEntry {
                produced_at,
                artifact,
            },
        );
    }

    /// Remove and return every artifact produced at least `ttl` before `now`.
    pub fn pop_expired(&self, now: DateTime<Utc>, ttl: Duration) -> Vec<ArtifactRef> {
        let cutoff = cutoff(now, ttl);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut expired = Vec::new();
        while entries.front().is_some_and(|e| e.produced_at <= cutoff) {
            if let Some(entry) = entries.pop_front() {
                expired.push(entry.artifact);
            }
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Janitor ────────────────────────────────────────────────────────

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub jobs_evicted: usize,
    pub artifacts_deleted: usize,
}

/// Periodic reclaimer for one job store.
#[derive(Debug)]
pub struct Janitor {
    store: Arc<JobStore>,
    artifacts: ArtifactStore,
    expiry: Arc<ExpiryQueue>,
    artifact_ttl: Duration,
    job_retention: Duration,
    sweep_interval: Duration,
    trigger: Notify,
}

impl Janitor {
    pub fn new(
        store: Arc<JobStore>,
        artifacts: ArtifactStore,
        expiry: Arc<ExpiryQueue>,
        settings: &JobSettings,
    ) -> Self {
        Self {
            store,
            artifacts,
            expiry,
            artifact_ttl: settings.artifact_ttl(),
            job_retention: settings.job_retention(),
            sweep_interval: settings.sweep_interval(),
            trigger: Notify::new(),
        }
    }

    /// Request a sweep as soon as the background loop is free.
    ///
    /// Multiple triggers before the loop wakes collapse into one sweep.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Run one sweep against the clock value `now`.
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        let expired = self.expiry.pop_expired(now, self.artifact_ttl);
        if !expired.is_empty() {
            report.artifacts_deleted += self.artifacts.delete_all(&expired).await;
        }

        for job_id in self.store.expired_jobs(now, self.job_retention) {
            let owned = self.store.evict_job(job_id);
            report.jobs_evicted += 1;
            report.artifacts_deleted += self.artifacts.delete_all(&owned).await;
            tracing::info!(
                target: "narrato.janitor",
                job_id = %job_id,
                artifacts = owned.len(),
                "Evicted expired job"
            );
        }

        if report != SweepReport::default() {
            tracing::debug!(
                target: "narrato.janitor",
                jobs_evicted = report.jobs_evicted,
                artifacts_deleted = report.artifacts_deleted,
                remaining_jobs = self.store.len(),
                "Sweep finished"
            );
        }
        report
    }

    /// Spawn the sweep loop. It stops when `cancel` fires.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let janitor = Arc::clone(self);
        tokio::spawn(async move { janitor.run(cancel).await })
    }

    async fn run(&self, cancel: CancellationToken) {
        let mut ticker = interval(self.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(
            target: "narrato.janitor",
            interval_secs = self.sweep_interval.as_secs(),
            "Janitor started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                () = self.trigger.notified() => {}
            }
            self.sweep(Utc::now()).await;
        }

        tracing::debug!(target: "narrato.janitor", "Janitor stopped");
    }
}
