//! Synthesis executor.
//!
//! Runs one chunk through the backend and writes the outcome back into the
//! job store. The executor operates on value types and cloned `Arc`
//! dependencies; it never holds the store lock across an `.await`.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use narrato_core::{ArtifactRef, JobError, JobId, SpeechSynthesizer};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::artifacts::ArtifactStore;
use crate::janitor::ExpiryQueue;
use crate::store::{JobStore, Transition};

/// What happened to a chunk handed to [`SynthesisExecutor::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// This call synthesized the chunk.
    Synthesized(ArtifactRef),
    /// The chunk was not claimable (already claimed, resolved, or gone).
    Skipped,
    /// The job was evicted while synthesizing; the artifact was deleted.
    Discarded,
}

/// Shared dependencies for chunk execution. Cheap to clone.
#[derive(Clone)]
pub struct SynthesisExecutor {
    store: Arc<JobStore>,
    artifacts: ArtifactStore,
    backend: Arc<dyn SpeechSynthesizer>,
    permits: Arc<Semaphore>,
    expiry: Arc<ExpiryQueue>,
}

impl std::fmt::Debug for SynthesisExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisExecutor")
            .field("artifacts", &self.artifacts)
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl SynthesisExecutor {
    /// `backend_concurrency` bounds concurrent backend calls across every
    /// clone of this executor.
    pub fn new(
        store: Arc<JobStore>,
        artifacts: ArtifactStore,
        backend: Arc<dyn SpeechSynthesizer>,
        expiry: Arc<ExpiryQueue>,
        backend_concurrency: usize,
    ) -> Self {
        Self {
            store,
            artifacts,
            backend,
            permits: Arc::new(Semaphore::new(backend_concurrency.max(1))),
            expiry,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn SpeechSynthesizer> {
        &self.backend
    }

    /// [`run`](Self::run) on its own task.
    ///
    /// Once claimed, a chunk is always resolved: dropping the returned
    /// handle does not cancel the synthesis.
    pub fn spawn_run(
        &self,
        job_id: JobId,
        index: usize,
    ) -> JoinHandle<Result<ExecutionOutcome, JobError>> {
        let executor = self.clone();
        tokio::spawn(async move { executor.run(job_id, index).await })
    }

    /// Evict `job_id` and delete the artifacts it owned.
    pub async fn discard_job(&self, job_id: JobId) {
        let owned = self.store.evict_job(job_id);
        self.artifacts.delete_all(&owned).await;
    }

    /// Claim, synthesize and record chunk `index` of `job_id`.
    ///
    /// A failed synthesis is recorded as `Failed` and also returned as an
    /// error. No retries.
    pub async fn run(&self, job_id: JobId, index: usize) -> Result<ExecutionOutcome, JobError> {
        let Some(claim) = self.store.mark_in_progress(job_id, index) else {
            tracing::debug!(target: "narrato.jobs", job_id = %job_id, index, "Chunk not claimable, skipping");
            return Ok(ExecutionOutcome::Skipped);
        };

        let artifact = ArtifactRef::for_chunk(job_id, index);
        let output = self.artifacts.path(&artifact);
        let started = Instant::now();

        let result = {
            let Ok(_permit) = self.permits.acquire().await else {
                let reason = "backend permits closed".to_string();
                self.store.mark_failed(job_id, index, reason.clone());
                return Err(JobError::BackendUnavailable(reason));
            };
            self.backend
                .synthesize(&claim.text, &claim.voice, &output)
                .await
        };
        let elapsed_ms = started.elapsed().as_millis();

        match result {
            Ok(()) => match self.store.mark_done(job_id, index, artifact.clone()) {
                Transition::Discarded => {
                    tracing::info!(
                        target: "narrato.jobs",
                        job_id = %job_id,
                        index,
                        "Job evicted during synthesis, discarding artifact"
                    );
                    self.artifacts
                        .delete_all(std::slice::from_ref(&artifact))
                        .await;
                    Ok(ExecutionOutcome::Discarded)
                }
                Transition::Applied | Transition::Unchanged => {
                    self.expiry.push(artifact.clone(), Utc::now());
                    tracing::info!(
                        target: "narrato.jobs",
                        job_id = %job_id,
                        index,
                        artifact = %artifact,
                        elapsed_ms,
                        "Chunk synthesized"
                    );
                    Ok(ExecutionOutcome::Synthesized(artifact))
                }
            },
            Err(e) => {
                tracing::warn!(
                    target: "narrato.jobs",
                    job_id = %job_id,
                    index,
                    elapsed_ms,
                    error = %e,
                    "Chunk synthesis failed"
                );
                self.store.mark_failed(job_id, index, e.to_string());
                // Backends may leave a partial file behind.
                self.artifacts
                    .delete_all(std::slice::from_ref(&artifact))
                    .await;
                Err(JobError::from_synthesis(index, e))
            }
        }
    }
}
