//! Process-wide job store.
//!
//! One mutex guards the whole `JobId → JobRecord` map. Every reader gets a
//! cloned value, so nobody ever observes a half-applied transition, and
//! removing a job removes its artifact bookkeeping in the same critical
//! section.
//!
//! # Chunk lifecycle
//!
//! ```text
//! Pending ──claim──▶ InProgress ──▶ Done(artifact)
//!                               └─▶ Failed(reason)
//! ```
//!
//! Only `mark_in_progress` moves a chunk out of `Pending`, and it succeeds
//! for exactly one caller. Terminal states never change again.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use narrato_core::{
    ArtifactRef, ChunkSnapshot, ChunkState, JobError, JobId, JobSnapshot, VoiceRef,
};
use tokio::sync::Notify;
use tokio::sync::futures::Notified;

/// Everything the store knows about one job.
#[derive(Debug, Clone)]
struct JobRecord {
    chunks: Vec<String>,
    voice: VoiceRef,
    states: Vec<ChunkState>,
    created_at: DateTime<Utc>,
}

impl JobRecord {
    /// Zero-based slot for a 1-based chunk index.
    fn slot(&self, index: usize) -> Option<usize> {
        (1..=self.states.len()).contains(&index).then(|| index - 1)
    }
}

/// What a successful claim hands to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkClaim {
    pub text: String,
    pub voice: VoiceRef,
}

/// Result of a completion write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The chunk moved to the requested terminal state.
    Applied,
    /// The chunk was already terminal; nothing changed.
    Unchanged,
    /// The job (or chunk) no longer exists; the write was dropped.
    Discarded,
}

/// Mutex-guarded job map with change notification.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Mutex<HashMap<JobId, JobRecord>>,
    changed: Notify,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, JobRecord>> {
        // A panic while holding the guard cannot leave a record half-written:
        // every mutation is a single assignment.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a job with every chunk `Pending`, timestamped now.
    pub fn create_job(&self, chunks: Vec<String>, voice: VoiceRef) -> Result<JobId, JobError> {
        self.create_job_at(chunks, voice, Utc::now())
    }

    /// [`create_job`](Self::create_job) with an explicit creation time.
    pub fn create_job_at(
        &self,
        chunks: Vec<String>,
        voice: VoiceRef,
        created_at: DateTime<Utc>,
    ) -> Result<JobId, JobError> {
        if chunks.is_empty() {
            return Err(JobError::InvalidInput(
                "a job needs at least one chunk".to_string(),
            ));
        }

        let id = JobId::new();
        let record = JobRecord {
            states: vec![ChunkState::Pending; chunks.len()],
            chunks,
            voice,
            created_at,
        };
        let total = record.chunks.len();
        self.lock().insert(id, record);

        tracing::debug!(target: "narrato.jobs", job_id = %id, total_chunks = total, "Job stored");
        Ok(id)
    }

    /// Claim a `Pending` chunk for synthesis.
    ///
    /// Returns `None` when the chunk is already claimed or resolved, or when
    /// the job or index does not exist.
    pub fn mark_in_progress(&self, id: JobId, index: usize) -> Option<ChunkClaim> {
        let mut jobs = self.lock();
        let record = jobs.get_mut(&id)?;
        let slot = record.slot(index)?;
        if record.states[slot] != ChunkState::Pending {
            return None;
        }
        record.states[slot] = ChunkState::InProgress;
        Some(ChunkClaim {
            text: record.chunks[slot].clone(),
            voice: record.voice.clone(),
        })
    }

    /// Record a successful synthesis.
    pub fn mark_done(&self, id: JobId, index: usize, artifact: ArtifactRef) -> Transition {
        self.resolve(id, index, ChunkState::Done { artifact })
    }

    /// Record a failed synthesis. A `Done` chunk is never downgraded.
    pub fn mark_failed(&self, id: JobId, index: usize, reason: impl Into<String>) -> Transition {
        self.resolve(
            id,
            index,
            ChunkState::Failed {
                reason: reason.into(),
            },
        )
    }

    fn resolve(&self, id: JobId, index: usize, terminal: ChunkState) -> Transition {
        let transition = {
            let mut jobs = self.lock();
            match jobs.get_mut(&id).and_then(|r| r.slot(index).map(|s| (r, s))) {
                None => Transition::Discarded,
                Some((record, slot)) if record.states[slot].is_terminal() => {
                    if record.states[slot] != terminal {
                        tracing::debug!(
                            target: "narrato.jobs",
                            job_id = %id,
                            index,
                            "Ignoring completion for already resolved chunk"
                        );
                    }
                    Transition::Unchanged
                }
                Some((record, slot)) => {
                    record.states[slot] = terminal;
                    Transition::Applied
                }
            }
        };

        if transition == Transition::Applied {
            self.changed.notify_waiters();
        }
        transition
    }

    /// Current state of one chunk.
    pub fn chunk_state(&self, id: JobId, index: usize) -> Result<ChunkState, JobError> {
        let jobs = self.lock();
        let record = jobs.get(&id).ok_or_else(|| JobError::job_not_found(id))?;
        let slot = record
            .slot(index)
            .ok_or_else(|| JobError::chunk_out_of_range(index, record.states.len()))?;
        Ok(record.states[slot].clone())
    }

    /// Number of chunks in a job.
    pub fn total_chunks(&self, id: JobId) -> Result<usize, JobError> {
        self.lock()
            .get(&id)
            .map(|r| r.chunks.len())
            .ok_or_else(|| JobError::job_not_found(id))
    }

    /// Whole-job view.
    pub fn snapshot(&self, id: JobId) -> Result<JobSnapshot, JobError> {
        let jobs = self.lock();
        let record = jobs.get(&id).ok_or_else(|| JobError::job_not_found(id))?;
        Ok(JobSnapshot {
            id,
            created_at: record.created_at,
            chunks: record
                .states
                .iter()
                .enumerate()
                .map(|(slot, state)| ChunkSnapshot {
                    index: slot + 1,
                    state: state.clone(),
                })
                .collect(),
        })
    }

    /// Remove a job, returning the artifacts it still owned.
    ///
    /// Evicting an unknown job returns an empty list.
    pub fn evict_job(&self, id: JobId) -> Vec<ArtifactRef> {
        let removed = self.lock().remove(&id);
        let Some(record) = removed else {
            return Vec::new();
        };
        // Fetchers waiting on this job must re-check and see it gone.
        self.changed.notify_waiters();
        record
            .states
            .into_iter()
            .filter_map(|state| match state {
                ChunkState::Done { artifact } => Some(artifact),
                _ => None,
            })
            .collect()
    }

    /// Jobs created at least `retention` before `now`.
    pub fn expired_jobs(&self, now: DateTime<Utc>, retention: Duration) -> Vec<JobId> {
        let cutoff = cutoff(now, retention);
        self.lock()
            .iter()
            .filter(|(_, record)| record.created_at <= cutoff)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Future that completes on the next terminal transition or eviction.
    ///
    /// Create (and `enable`) it before re-reading state, otherwise a wake-up
    /// between the read and the await is lost.
    pub fn changed(&self) -> Notified<'_> {
        self.changed.notified()
    }
}

/// `now - age`, saturating at the earliest representable time.
pub(crate) fn cutoff(now: DateTime<Utc>, age: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(age)
        .ok()
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
