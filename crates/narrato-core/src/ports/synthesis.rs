//! Speech synthesis port.
//!
//! The synthesis engine is an external, slow, possibly non-reentrant
//! collaborator. The job manager only talks to it through
//! [`SpeechSynthesizer`].

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::VoiceRef;

/// Errors reported by a synthesis backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisError {
    /// The voice reference does not resolve to anything usable.
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// The backend could not be initialized or is down.
    #[error("Synthesis backend unavailable: {0}")]
    Unavailable(String),

    /// The backend ran but failed for this input.
    #[error("Synthesis failed: {0}")]
    Failed(String),

    /// Writing the artifact failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl SynthesisError {
    /// Whether the caller caused this error.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::VoiceNotFound(_))
    }
}

impl From<std::io::Error> for SynthesisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Backend-agnostic speech synthesizer.
///
/// Implementations must be `Send + Sync`: the job manager shares one
/// instance between the request path and every background worker. Whether
/// concurrent `synthesize` calls are allowed is decided by the caller (see
/// `JobSettings::backend_concurrency`), not by the backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Report whether the backend is usable at all.
    ///
    /// Called before a job is created so a dead backend is reported as
    /// unavailable instead of as a chunk failure.
    fn health(&self) -> Result<(), SynthesisError> {
        Ok(())
    }

    /// Validate a client-supplied voice reference.
    ///
    /// Only existence/recognition is checked; the reference is not loaded.
    fn resolve_voice(&self, reference: &str) -> Result<VoiceRef, SynthesisError>;

    /// Synthesize `text` with `voice` and write the artifact to `output`.
    ///
    /// On success the file at `output` exists and is complete.
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceRef,
        output: &Path,
    ) -> Result<(), SynthesisError>;
}
