//! Job DTOs.

use chrono::{DateTime, Utc};
use narrato_core::{ArtifactRef, ChunkState, ChunkStatus, JobId, JobSnapshot};
use serde::{Deserialize, Serialize};

/// `POST /jobs` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobBody {
    pub text: String,
    /// Voice reference, e.g. a sample file name under the voices directory.
    pub voice: String,
}

/// One chunk as seen by pollers.
///
/// `InProgress` is reported as `"pending"`; `artifactUrl` is set only for
/// `"done"` and `error` only for `"failed"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkStatusDto {
    pub index: usize,
    pub status: ChunkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChunkStatusDto {
    pub fn from_state(
        index: usize,
        state: &ChunkState,
        artifact_url: impl Fn(&ArtifactRef) -> String,
    ) -> Self {
        let (artifact_url, error) = match state {
            ChunkState::Done { artifact } => (Some(artifact_url(artifact)), None),
            ChunkState::Failed { reason } => (None, Some(reason.clone())),
            ChunkState::Pending | ChunkState::InProgress => (None, None),
        };
        Self {
            index,
            status: state.status(),
            artifact_url,
            error,
        }
    }
}

/// `POST /jobs` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedJobDto {
    pub job_id: JobId,
    pub total_chunks: usize,
    pub first_chunk: ChunkStatusDto,
}

/// `GET /jobs/{jobId}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshotDto {
    pub job_id: JobId,
    pub total_chunks: usize,
    pub created_at: DateTime<Utc>,
    pub chunks: Vec<ChunkStatusDto>,
}

impl JobSnapshotDto {
    pub fn from_snapshot(
        snapshot: &JobSnapshot,
        artifact_url: impl Fn(&ArtifactRef) -> String,
    ) -> Self {
        Self {
            job_id: snapshot.id,
            total_chunks: snapshot.total_chunks(),
            created_at: snapshot.created_at,
            chunks: snapshot
                .chunks
                .iter()
                .map(|c| ChunkStatusDto::from_state(c.index, &c.state, &artifact_url))
                .collect(),
        }
    }
}
