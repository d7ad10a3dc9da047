//! Synthesis backends, engine-specific implementations of [`SpeechSynthesizer`].
//!
//! The job manager operates on `Arc<dyn SpeechSynthesizer>`.
//!
//! ## Backend implementations
//!
//! | Feature  | Module          | Voice reference          |
//! |----------|-----------------|--------------------------|
//! | default  | [`command`]     | sample file name         |
//! | `sherpa` | `sherpa`        | Kokoro voice id          |
//! | default  | [`unavailable`] | -                        |

pub mod command;
#[cfg(feature = "sherpa")]
pub mod sherpa;
pub mod unavailable;
mod util;

use std::sync::Arc;

use narrato_core::SpeechSynthesizer;
use serde::{Deserialize, Serialize};

pub use command::{CommandConfig, CommandSynthesizer};
#[cfg(feature = "sherpa")]
pub use sherpa::{KOKORO_VOICES, SherpaConfig, SherpaSynthesizer};
pub use unavailable::UnavailableSynthesizer;

use crate::error::VoiceError;

// ── Backend selection ──────────────────────────────────────────────

/// Which backend to build, with its engine-specific options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// External TTS command line.
    Command(CommandConfig),
    /// In-process sherpa-onnx Kokoro.
    #[cfg(feature = "sherpa")]
    Sherpa(SherpaConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Command(CommandConfig::default())
    }
}

/// Build the configured backend.
pub fn try_load_backend(config: &BackendConfig) -> Result<Arc<dyn SpeechSynthesizer>, VoiceError> {
    match config {
        BackendConfig::Command(cfg) => Ok(Arc::new(CommandSynthesizer::new(cfg.clone())?)),
        #[cfg(feature = "sherpa")]
        BackendConfig::Sherpa(cfg) => Ok(Arc::new(SherpaSynthesizer::load(cfg)?)),
    }
}

/// Build the configured backend, degrading to [`UnavailableSynthesizer`].
///
/// A server started with a broken backend keeps running and answers every
/// job with "backend unavailable" instead of refusing to start.
pub fn load_backend(config: &BackendConfig) -> Arc<dyn SpeechSynthesizer> {
    match try_load_backend(config) {
        Ok(backend) => {
            tracing::info!(backend = backend.name(), "Synthesis backend ready");
            backend
        }
        Err(e) => {
            tracing::error!(error = %e, "Synthesis backend failed to load; serving as unavailable");
            Arc::new(UnavailableSynthesizer::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_config_degrades_to_unavailable() {
        let config = BackendConfig::Command(CommandConfig {
            program: String::new(),
            ..CommandConfig::default()
        });
        let backend = load_backend(&config);
        assert_eq!(backend.name(), "unavailable");
        assert!(backend.health().is_err());
    }

    #[test]
    fn test_default_config_is_command() {
        let backend = try_load_backend(&BackendConfig::default()).unwrap();
        assert_eq!(backend.name(), "command");
    }
}
