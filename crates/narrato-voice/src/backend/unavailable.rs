//! Placeholder backend for a server whose real backend failed to load.
//!
//! The process keeps serving; every job creation is answered with
//! `Unavailable` instead of crashing at startup.

use std::path::Path;

use async_trait::async_trait;
use narrato_core::{SpeechSynthesizer, SynthesisError, VoiceRef};

#[derive(Debug, Clone)]
pub struct UnavailableSynthesizer {
    reason: String,
}

impl UnavailableSynthesizer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl SpeechSynthesizer for UnavailableSynthesizer {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn health(&self) -> Result<(), SynthesisError> {
        Err(SynthesisError::Unavailable(self.reason.clone()))
    }

    fn resolve_voice(&self, _reference: &str) -> Result<VoiceRef, SynthesisError> {
        Err(SynthesisError::Unavailable(self.reason.clone()))
    }

    async fn synthesize(
        &self,
        _text: &str,
        _voice: &VoiceRef,
        _output: &Path,
    ) -> Result<(), SynthesisError> {
        Err(SynthesisError::Unavailable(self.reason.clone()))
    }
}
