//! Job manager: creation, scheduling and queries.
//!
//! # Job lifecycle
//!
//! ```text
//! Created → Chunk1Synthesizing → Chunk1Ready → BackgroundChunksEnqueued → AllChunksResolved
//! ```
//!
//! Chunk 1 is synthesized before `create_job` returns, so a successful
//! creation always hands back playable audio. Chunks 2..N go
//! to the worker pool according to the [`SchedulePolicy`].
//!
//! # Concurrency model
//!
//! - One inline synthesis per creation request plus `worker_count` workers
//! - A semaphore in the executor bounds concurrent backend calls
//! - The claim (`Pending → InProgress`) guarantees each chunk is attempted
//!   once, however many times it is enqueued or fetched
//! - Inline syntheses run on spawned tasks: a caller that goes away never
//!   strands a claimed chunk
//! - The janitor runs as its own task and stops with the manager

mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use narrato_core::{
    ChunkState, JobError, JobId, JobSettings, JobSnapshot, SchedulePolicy, SpeechSynthesizer,
    SynthesisError, segment,
};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::artifacts::ArtifactStore;
use crate::executor::{ExecutionOutcome, SynthesisExecutor};
use crate::janitor::{ExpiryQueue, Janitor};
use crate::store::JobStore;

use worker::ChunkQueue;
pub use worker::ChunkTask;

/// Input for [`JobManager::create_job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateJobRequest {
    pub text: String,
    /// Backend-specific voice reference (sample file name, voice id).
    pub voice: String,
}

impl CreateJobRequest {
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
        }
    }
}

/// Result of a successful [`JobManager::create_job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedJob {
    pub job_id: JobId,
    pub total_chunks: usize,
    /// Terminal state of chunk 1 (always `Done` on success).
    pub first_chunk: ChunkState,
}

/// Construction parameters for [`JobManager`].
#[derive(Debug, Clone)]
pub struct JobManagerConfig {
    /// Directory artifacts are written to (created if missing).
    pub output_dir: PathBuf,
    pub settings: JobSettings,
}

impl JobManagerConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            settings: JobSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: JobSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Chunked synthesis job manager.
///
/// Dropping the manager stops its workers and janitor.
pub struct JobManager {
    settings: JobSettings,
    store: Arc<JobStore>,
    artifacts: ArtifactStore,
    executor: SynthesisExecutor,
    queue: ChunkQueue,
    janitor: Arc<Janitor>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for JobManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobManager")
            .field("settings", &self.settings)
            .field("jobs", &self.store.len())
            .field("output_dir", &self.artifacts.root())
            .finish_non_exhaustive()
    }
}

impl JobManager {
    /// Validate settings, prepare the output directory, and spawn the worker
    /// pool and janitor. Must be called inside a Tokio runtime.
    pub fn start(
        config: JobManagerConfig,
        backend: Arc<dyn SpeechSynthesizer>,
    ) -> Result<Self, JobError> {
        let JobManagerConfig {
            output_dir,
            settings,
        } = config;
        settings
            .validate()
            .map_err(|e| JobError::InvalidInput(e.to_string()))?;

        let artifacts = ArtifactStore::new(output_dir);
        artifacts.ensure_dir()?;

        let store = Arc::new(JobStore::new());
        let expiry = Arc::new(ExpiryQueue::new());
        let executor = SynthesisExecutor::new(
            Arc::clone(&store),
            artifacts.clone(),
            backend,
            Arc::clone(&expiry),
            settings.backend_concurrency,
        );
        let janitor = Arc::new(Janitor::new(
            Arc::clone(&store),
            artifacts.clone(),
            expiry,
            &settings,
        ));

        let cancel = CancellationToken::new();
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let queue = ChunkQueue::new(queue_tx, Arc::clone(&store));
        let mut tasks = worker::spawn_workers(settings.worker_count, queue_rx, &executor, &cancel);
        tasks.push(janitor.spawn(cancel.clone()));

        tracing::info!(
            target: "narrato.jobs",
            output_dir = %artifacts.root().display(),
            workers = settings.worker_count,
            backend_concurrency = settings.backend_concurrency,
            policy = %settings.policy,
            "Job manager started"
        );

        Ok(Self {
            settings,
            store,
            artifacts,
            executor,
            queue,
            janitor,
            cancel,
            tasks,
        })
    }

    /// Create a job and synthesize its first chunk before returning.
    ///
    /// No job id is handed out when chunk 1 fails: the job is removed and
    /// the error returned. Chunk 1 and the scheduling of the rest run on a
    /// spawned task, so dropping this future still leaves a complete job.
    pub async fn create_job(&self, request: CreateJobRequest) -> Result<CreatedJob, JobError> {
        let backend = self.executor.backend();
        backend.health().map_err(unavailable)?;

        let voice = backend.resolve_voice(&request.voice).map_err(|e| match e {
            SynthesisError::Unavailable(msg) => JobError::BackendUnavailable(msg),
            other => JobError::InvalidInput(other.to_string()),
        })?;

        let chunks = segment(&request.text, self.settings.max_chunk_chars);
        if chunks.is_empty() {
            return Err(JobError::InvalidInput(
                "text contains no sentences".to_string(),
            ));
        }
        let total_chunks = chunks.len();

        let job_id = self.store.create_job(chunks, voice)?;
        self.janitor.trigger();
        tracing::info!(
            target: "narrato.jobs",
            job_id = %job_id,
            total_chunks,
            voice = %request.voice,
            "Job created"
        );

        let first = tokio::spawn(first_chunk(
            self.executor.clone(),
            self.queue.clone(),
            job_id,
            total_chunks,
            self.settings.policy,
        ));
        match first.await {
            Ok(result) => result?,
            Err(e) => {
                self.executor.discard_job(job_id).await;
                return Err(task_failed(1, &e));
            }
        }
        let first_chunk = self.store.chunk_state(job_id, 1)?;

        Ok(CreatedJob {
            job_id,
            total_chunks,
            first_chunk,
        })
    }

    /// Current state of chunk `index`.
    ///
    /// A `Done` chunk whose artifact has already been reclaimed is reported
    /// as [`JobError::ArtifactGone`].
    pub async fn chunk_status(&self, job_id: JobId, index: usize) -> Result<ChunkState, JobError> {
        let state = self.store.chunk_state(job_id, index)?;
        self.ensure_artifact(index, state).await
    }

    /// Whole-job view.
    pub fn job_snapshot(&self, job_id: JobId) -> Result<JobSnapshot, JobError> {
        self.store.snapshot(job_id)
    }

    /// Resolve chunk `index` now.
    ///
    /// A `Pending` chunk is synthesized now (on a task of its own, so it
    /// completes even if this future is dropped); an `InProgress` one is
    /// awaited. Under [`SchedulePolicy::Lookahead`] the
    /// next chunk is then enqueued.
    pub async fn fetch_chunk(&self, job_id: JobId, index: usize) -> Result<ChunkState, JobError> {
        let state = loop {
            let changed = self.store.changed();
            tokio::pin!(changed);
            changed.as_mut().enable();

            match self.store.chunk_state(job_id, index)? {
                ChunkState::Pending => {
                    // A failure is recorded in the store and read back on the
                    // next iteration.
                    match self.executor.spawn_run(job_id, index).await {
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => {
                            tracing::debug!(target: "narrato.jobs", job_id = %job_id, index, error = %e, "Fetched chunk failed");
                        }
                        Err(e) => {
                            let err = task_failed(index, &e);
                            tracing::warn!(target: "narrato.jobs", job_id = %job_id, index, error = %err, "Fetched chunk task died");
                            self.store.mark_failed(job_id, index, err.to_string());
                        }
                    }
                }
                ChunkState::InProgress => changed.await,
                terminal => break terminal,
            }
        };

        if self.settings.policy == SchedulePolicy::Lookahead {
            let next = index + 1;
            if matches!(self.store.chunk_state(job_id, next), Ok(ChunkState::Pending)) {
                self.queue.enqueue(job_id, next);
            }
        }

        self.ensure_artifact(index, state).await
    }

    pub const fn settings(&self) -> &JobSettings {
        &self.settings
    }

    pub const fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub const fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub const fn janitor(&self) -> &Arc<Janitor> {
        &self.janitor
    }

    /// Name of the synthesis backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.executor.backend().name()
    }

    /// Whether the backend can currently accept work.
    pub fn backend_health(&self) -> Result<(), JobError> {
        self.executor.backend().health().map_err(unavailable)
    }

    /// Stop workers and janitor. Queued chunks stay `Pending`.
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!(target: "narrato.jobs", jobs = self.store.len(), "Job manager shutting down");
            self.cancel.cancel();
        }
    }

    /// Whether every background task has exited.
    pub fn is_stopped(&self) -> bool {
        self.tasks.iter().all(JoinHandle::is_finished)
    }

    async fn ensure_artifact(&self, index: usize, state: ChunkState) -> Result<ChunkState, JobError> {
        if let ChunkState::Done { artifact } = &state
            && !self.artifacts.exists(artifact).await
        {
            return Err(JobError::ArtifactGone(format!(
                "audio for chunk {index} ({artifact}) has expired"
            )));
        }
        Ok(state)
    }
}

impl Drop for JobManager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Synthesize chunk 1, then schedule the rest or drop the job.
async fn first_chunk(
    executor: SynthesisExecutor,
    queue: ChunkQueue,
    job_id: JobId,
    total_chunks: usize,
    policy: SchedulePolicy,
) -> Result<(), JobError> {
    match executor.run(job_id, 1).await {
        Ok(ExecutionOutcome::Synthesized(_)) => {
            queue.schedule_after_first(job_id, total_chunks, policy);
            Ok(())
        }
        Ok(outcome) => {
            executor.discard_job(job_id).await;
            Err(JobError::ChunkSynthesis {
                index: 1,
                reason: format!("first chunk was not synthesized ({outcome:?})"),
            })
        }
        Err(e) => {
            executor.discard_job(job_id).await;
            Err(e)
        }
    }
}

fn task_failed(index: usize, err: &JoinError) -> JobError {
    JobError::ChunkSynthesis {
        index,
        reason: format!("synthesis task failed: {err}"),
    }
}

fn unavailable(err: SynthesisError) -> JobError {
    match err {
        SynthesisError::Unavailable(msg) => JobError::BackendUnavailable(msg),
        other => JobError::BackendUnavailable(other.to_string()),
    }
}
