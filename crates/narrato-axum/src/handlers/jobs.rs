//! Axum handlers for the `/jobs` endpoints.
//!
//! Each handler calls exactly one `JobManager` method and converts the
//! result into a DTO.

use axum::Json;
use axum::extract::{Path, State};
use narrato_core::{JobError, JobId};
use narrato_jobs::CreateJobRequest;

use crate::dto::{ChunkStatusDto, CreateJobBody, CreatedJobDto, JobSnapshotDto};
use crate::error::HttpError;
use crate::state::AppState;

/// A malformed id cannot name an existing job.
fn parse_job_id(raw: &str) -> Result<JobId, HttpError> {
    raw.parse::<JobId>()
        .map_err(|_| HttpError::from(JobError::job_not_found(raw)))
}

/// Chunk indices are positive integers; anything else names no chunk.
fn parse_chunk_index(raw: &str) -> Result<usize, HttpError> {
    raw.parse::<usize>()
        .map_err(|_| HttpError::from(JobError::NotFound(format!("chunk {raw} not found"))))
}

/// `POST /jobs`
///
/// Returns once chunk 1 is synthesized.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateJobBody>,
) -> Result<Json<CreatedJobDto>, HttpError> {
    let created = state
        .jobs
        .create_job(CreateJobRequest::new(body.text, body.voice))
        .await?;

    Ok(Json(CreatedJobDto {
        job_id: created.job_id,
        total_chunks: created.total_chunks,
        first_chunk: ChunkStatusDto::from_state(1, &created.first_chunk, |a| {
            state.artifact_url(a)
        }),
    }))
}

/// `GET /jobs/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobSnapshotDto>, HttpError> {
    let snapshot = state.jobs.job_snapshot(parse_job_id(&id)?)?;
    Ok(Json(JobSnapshotDto::from_snapshot(&snapshot, |a| {
        state.artifact_url(a)
    })))
}

/// `GET /jobs/{id}/chunks/{index}`
pub async fn chunk_status(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
) -> Result<Json<ChunkStatusDto>, HttpError> {
    let index = parse_chunk_index(&index)?;
    let chunk = state
        .jobs
        .chunk_status(parse_job_id(&id)?, index)
        .await?;
    Ok(Json(ChunkStatusDto::from_state(index, &chunk, |a| {
        state.artifact_url(a)
    })))
}

/// `POST /jobs/{id}/chunks/{index}/fetch`
///
/// Synthesizes a pending chunk or waits for one in progress.
pub async fn fetch_chunk(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
) -> Result<Json<ChunkStatusDto>, HttpError> {
    let index = parse_chunk_index(&index)?;
    let chunk = state
        .jobs
        .fetch_chunk(parse_job_id(&id)?, index)
        .await?;
    Ok(Json(ChunkStatusDto::from_state(index, &chunk, |a| {
        state.artifact_url(a)
    })))
}
