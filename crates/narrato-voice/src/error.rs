//! Voice backend error types.

use std::path::PathBuf;

use narrato_core::SynthesisError;

/// Errors that can occur inside a synthesis backend.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// The voice reference does not name an existing voice.
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// The voice reference is malformed (absolute path, `..`, empty).
    #[error("Invalid voice reference '{0}'")]
    InvalidVoiceReference(String),

    /// Model file not found at expected path.
    #[error("Voice model not found at {0}")]
    ModelNotFound(PathBuf),

    /// Backend configuration cannot work at all.
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),

    /// Backend failed to load and cannot serve requests.
    #[error("Synthesis backend unavailable: {0}")]
    Unavailable(String),

    /// External TTS process could not be spawned or exited non-zero.
    #[error("TTS process failed: {0}")]
    ProcessFailed(String),

    /// External TTS process did not finish in time.
    #[error("TTS process timed out after {0}s")]
    Timeout(u64),

    /// Backend reported success but no artifact was written.
    #[error("TTS produced no output at {0}")]
    MissingOutput(PathBuf),

    /// Failed to synthesize speech.
    #[error("Speech synthesis failed: {0}")]
    SynthesisError(String),

    /// WAV encoding/decoding failed.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// IO error (voice samples, output files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<VoiceError> for SynthesisError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::VoiceNotFound(_) | VoiceError::InvalidVoiceReference(_) => {
                Self::VoiceNotFound(err.to_string())
            }
            VoiceError::ModelNotFound(_)
            | VoiceError::InvalidConfig(_)
            | VoiceError::Unavailable(_) => Self::Unavailable(err.to_string()),
            VoiceError::Io(_) => Self::Io(err.to_string()),
            VoiceError::ProcessFailed(_)
            | VoiceError::Timeout(_)
            | VoiceError::MissingOutput(_)
            | VoiceError::SynthesisError(_)
            | VoiceError::Wav(_) => Self::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_errors_map_to_voice_not_found() {
        let err: SynthesisError = VoiceError::InvalidVoiceReference("../x".into()).into();
        assert!(matches!(err, SynthesisError::VoiceNotFound(_)));
    }

    #[test]
    fn test_process_failures_map_to_failed() {
        let err: SynthesisError = VoiceError::ProcessFailed("exit 1: boom".into()).into();
        match err {
            SynthesisError::Failed(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_missing_model_maps_to_unavailable() {
        let err: SynthesisError = VoiceError::ModelNotFound(PathBuf::from("/m")).into();
        assert!(matches!(err, SynthesisError::Unavailable(_)));
    }
}
