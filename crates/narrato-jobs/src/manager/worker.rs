//! Background worker pool.
//!
//! `worker_count` tasks share one unbounded queue of [`ChunkTask`]s. Each
//! task is a value type; workers never see the manager, only a cloned
//! [`SynthesisExecutor`]. A failed chunk is logged and the worker moves on.

use std::sync::Arc;

use narrato_core::{JobId, SchedulePolicy};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::executor::{ExecutionOutcome, SynthesisExecutor};
use crate::store::JobStore;

/// One unit of background work: synthesize chunk `index` of `job_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkTask {
    pub job_id: JobId,
    pub index: usize,
}

/// Sending side of the worker queue. Cheap to clone.
#[derive(Debug, Clone)]
pub(super) struct ChunkQueue {
    tx: mpsc::UnboundedSender<ChunkTask>,
    store: Arc<JobStore>,
}

impl ChunkQueue {
    pub(super) const fn new(tx: mpsc::UnboundedSender<ChunkTask>, store: Arc<JobStore>) -> Self {
        Self { tx, store }
    }

    /// Hand chunk `index` to the workers. Fails the chunk if the pool has
    /// stopped.
    pub(super) fn enqueue(&self, job_id: JobId, index: usize) {
        if self.tx.send(ChunkTask { job_id, index }).is_err() {
            tracing::warn!(target: "narrato.jobs", job_id = %job_id, index, "Worker pool stopped, chunk not scheduled");
            self.store
                .mark_failed(job_id, index, "job manager is shutting down");
        }
    }

    /// Schedule chunks after the first according to `policy`.
    pub(super) fn schedule_after_first(&self, job_id: JobId, total: usize, policy: SchedulePolicy) {
        match policy {
            SchedulePolicy::Eager => {
                for index in 2..=total {
                    self.enqueue(job_id, index);
                }
            }
            SchedulePolicy::Lookahead => {
                if total >= 2 {
                    self.enqueue(job_id, 2);
                }
            }
        }
    }
}

/// Spawn `count` workers draining `rx`.
///
/// Workers exit when every sender is dropped or `cancel` fires.
pub(super) fn spawn_workers(
    count: usize,
    rx: mpsc::UnboundedReceiver<ChunkTask>,
    executor: &SynthesisExecutor,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));
    (0..count)
        .map(|worker| {
            let rx = Arc::clone(&rx);
            let executor = executor.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { worker_loop(worker, rx, executor, cancel).await })
        })
        .collect()
}

async fn worker_loop(
    worker: usize,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<ChunkTask>>>,
    executor: SynthesisExecutor,
    cancel: CancellationToken,
) {
    tracing::debug!(target: "narrato.jobs", worker, "Worker started");
    loop {
        let task = tokio::select! {
            () = cancel.cancelled() => break,
            task = async { rx.lock().await.recv().await } => task,
        };
        let Some(task) = task else { break };

        match executor.run(task.job_id, task.index).await {
            Ok(ExecutionOutcome::Synthesized(_)) => {}
            Ok(outcome) => {
                tracing::debug!(
                    target: "narrato.jobs",
                    worker,
                    job_id = %task.job_id,
                    index = task.index,
                    ?outcome,
                    "Background chunk not synthesized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    target: "narrato.jobs",
                    worker,
                    job_id = %task.job_id,
                    index = task.index,
                    error = %e,
                    "Background chunk failed"
                );
            }
        }
    }
    tracing::debug!(target: "narrato.jobs", worker, "Worker stopped");
}
