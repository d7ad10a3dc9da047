//! Job error taxonomy.
//!
//! Client-caused failures (bad input, unknown ids, expired audio) and
//! backend-caused failures are separate variants so adapters can map them to
//! different status codes without string matching.

use thiserror::Error;

use crate::ports::SynthesisError;

/// Errors surfaced by job operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobError {
    /// Empty text, unresolvable voice, malformed ids.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The synthesis backend is not usable.
    #[error("Synthesis backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Synthesis of a specific chunk failed.
    #[error("Chunk {index} synthesis failed: {reason}")]
    ChunkSynthesis { index: usize, reason: String },

    /// Unknown job id or chunk index out of range.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The chunk was synthesized but its artifact has since been deleted.
    #[error("Artifact expired: {0}")]
    ArtifactGone(String),

    /// Output directory or artifact file I/O failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl JobError {
    /// Create an I/O error from any displayable source.
    pub fn io(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Io(format!("{context}: {err}"))
    }

    /// Wrap a backend error that occurred while synthesizing chunk `index`.
    ///
    /// Voice and availability problems keep their own category; anything
    /// else becomes a chunk failure.
    #[must_use]
    pub fn from_synthesis(index: usize, err: SynthesisError) -> Self {
        match err {
            SynthesisError::VoiceNotFound(msg) => Self::InvalidInput(msg),
            SynthesisError::Unavailable(msg) => Self::BackendUnavailable(msg),
            SynthesisError::Failed(reason) | SynthesisError::Io(reason) => {
                Self::ChunkSynthesis { index, reason }
            }
        }
    }

    /// Unknown job.
    pub fn job_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("job {id} not found"))
    }

    /// Chunk index outside `[1, total]`.
    pub fn chunk_out_of_range(index: usize, total: usize) -> Self {
        Self::NotFound(format!("chunk {index} out of range 1..={total}"))
    }

    /// Whether the caller caused this error (4xx-class).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::NotFound(_) | Self::ArtifactGone(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_errors_are_client_errors() {
        let err = JobError::from_synthesis(1, SynthesisError::VoiceNotFound("x.wav".into()));
        assert!(matches!(err, JobError::InvalidInput(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn backend_failures_keep_chunk_index() {
        let err = JobError::from_synthesis(3, SynthesisError::Failed("oom".into()));
        assert_eq!(
            err,
            JobError::ChunkSynthesis {
                index: 3,
                reason: "oom".into()
            }
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn unavailable_is_a_server_error() {
        let err = JobError::from_synthesis(1, SynthesisError::Unavailable("no model".into()));
        assert!(matches!(err, JobError::BackendUnavailable(_)));
        assert!(!err.is_client_error());
    }
}
