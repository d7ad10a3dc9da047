//! Axum-specific error types and mappings.
//!
//! Maps [`JobError`] onto HTTP status codes and the JSON error body shared
//! by every endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use narrato_core::JobError;
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The chunk finished but its audio file has been reclaimed.
    #[error("Artifact expired: {0}")]
    ArtifactExpired(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Service unavailable (synthesis backend not loaded).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A chunk failed to synthesize while the caller waited for it.
    #[error("Chunk {index} synthesis failed: {message}")]
    SynthesisFailed { index: usize, message: String },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    error_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
}

impl HttpError {
    /// Status code this error is answered with.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::ArtifactExpired(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::SynthesisFailed { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        }

        let (message, error_type, metadata) = match self {
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => (msg, None, None),
            Self::ArtifactExpired(msg) => (msg, Some("ARTIFACT_EXPIRED"), None),
            Self::SynthesisFailed { index, message } => (
                message,
                Some("CHUNK_SYNTHESIS_FAILED"),
                Some(serde_json::json!({ "index": index })),
            ),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
            error_type,
            metadata,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<JobError> for HttpError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::InvalidInput(msg) => Self::BadRequest(msg),
            JobError::BackendUnavailable(msg) => Self::ServiceUnavailable(msg),
            JobError::ChunkSynthesis { index, reason } => Self::SynthesisFailed {
                index,
                message: reason,
            },
            JobError::NotFound(msg) => Self::NotFound(msg),
            JobError::ArtifactGone(msg) => Self::ArtifactExpired(msg),
            JobError::Io(msg) => Self::Internal(format!("Storage: {msg}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_errors_map_to_statuses() {
        let cases = [
            (JobError::InvalidInput("empty".into()), StatusCode::BAD_REQUEST),
            (
                JobError::BackendUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                JobError::ChunkSynthesis {
                    index: 1,
                    reason: "boom".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (JobError::NotFound("job".into()), StatusCode::NOT_FOUND),
            (JobError::ArtifactGone("gone".into()), StatusCode::NOT_FOUND),
            (JobError::Io("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(HttpError::from(err.clone()).status(), expected, "{err:?}");
        }
    }

    #[test]
    fn test_client_errors_stay_below_500() {
        let err = JobError::ArtifactGone("x".into());
        assert!(err.is_client_error());
        assert!(HttpError::from(err).status().is_client_error());
    }

    #[test]
    fn test_expired_artifact_body_carries_type() {
        let body = ErrorBody {
            error: "gone".into(),
            status: 404,
            error_type: Some("ARTIFACT_EXPIRED"),
            metadata: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "ARTIFACT_EXPIRED");
        assert!(json.get("metadata").is_none());
    }
}
