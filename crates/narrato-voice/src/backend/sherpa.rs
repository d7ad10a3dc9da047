//! Sherpa-ONNX Kokoro TTS backend, implements [`SpeechSynthesizer`] via `sherpa-rs`.
//!
//! `KokoroTts::create` takes `&mut self` while the port uses `&self`, so the
//! engine is wrapped in an `Arc<Mutex<…>>`. Synthesis and WAV writing run on
//! `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use narrato_core::{SpeechSynthesizer, SynthesisError, VoiceRef};
use serde::{Deserialize, Serialize};
use sherpa_rs::tts::{KokoroTts, KokoroTtsConfig};

use super::util::path_to_string;
use crate::error::VoiceError;
use crate::wav;

/// Configuration for the Sherpa Kokoro backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SherpaConfig {
    /// Directory with `model.onnx`, `voices.bin`, `tokens.txt`, `espeak-ng-data/`.
    pub model_dir: PathBuf,

    /// Speed multiplier (0.5–2.0, default 1.0).
    pub speed: f32,
}

impl SherpaConfig {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            speed: 1.0,
        }
    }
}

/// Sherpa-ONNX Kokoro TTS backend.
pub struct SherpaSynthesizer {
    engine: Arc<Mutex<KokoroTts>>,
    speed: f32,
}

impl std::fmt::Debug for SherpaSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SherpaSynthesizer")
            .field("speed", &self.speed)
            .finish_non_exhaustive()
    }
}

impl SherpaSynthesizer {
    /// Load the Kokoro model from `config.model_dir`.
    pub fn load(config: &SherpaConfig) -> Result<Self, VoiceError> {
        let model_dir = &config.model_dir;
        if !model_dir.exists() {
            return Err(VoiceError::ModelNotFound(model_dir.clone()));
        }

        let model_path = model_dir.join("model.onnx");
        let voices_path = model_dir.join("voices.bin");
        let tokens_path = model_dir.join("tokens.txt");
        let data_dir = model_dir.join("espeak-ng-data");

        for (path, desc) in [
            (&model_path, "model.onnx"),
            (&voices_path, "voices.bin"),
            (&tokens_path, "tokens.txt"),
        ] {
            if !path.exists() {
                return Err(VoiceError::ModelNotFound(path.clone()));
            }
            tracing::debug!(path = %path.display(), "Found TTS {desc}");
        }

        tracing::info!(
            dir = %model_dir.display(),
            speed = config.speed,
            "Loading Sherpa Kokoro TTS model"
        );

        let sherpa_config = KokoroTtsConfig {
            model: path_to_string(&model_path, VoiceError::InvalidConfig)?,
            voices: path_to_string(&voices_path, VoiceError::InvalidConfig)?,
            tokens: path_to_string(&tokens_path, VoiceError::InvalidConfig)?,
            data_dir: path_to_string(&data_dir, VoiceError::InvalidConfig)?,
            length_scale: config.speed,
            ..Default::default()
        };

        let engine = KokoroTts::new(sherpa_config);
        tracing::info!("Sherpa Kokoro TTS model loaded successfully");

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            speed: config.speed.clamp(0.5, 2.0),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for SherpaSynthesizer {
    fn name(&self) -> &'static str {
        "sherpa-kokoro"
    }

    fn resolve_voice(&self, reference: &str) -> Result<VoiceRef, SynthesisError> {
        let sid = voice_id_to_speaker_id(reference.trim())
            .ok_or_else(|| SynthesisError::VoiceNotFound(reference.to_string()))?;
        Ok(VoiceRef::new(reference, sid.to_string()))
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceRef,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let sid: i32 = voice
            .resolved
            .parse()
            .map_err(|_| SynthesisError::VoiceNotFound(voice.requested.clone()))?;

        tracing::debug!(
            text_len = text.chars().count(),
            voice = %voice.requested,
            speaker_id = sid,
            "Synthesizing speech (Sherpa Kokoro)"
        );

        let started = Instant::now();
        let engine = Arc::clone(&self.engine);
        let speed = self.speed;
        let text = text.to_string();
        let output = output.to_path_buf();

        let samples = tokio::task::spawn_blocking(move || -> Result<usize, VoiceError> {
            let audio = engine
                .lock()
                .map_err(|e| VoiceError::SynthesisError(format!("TTS engine lock poisoned: {e}")))
                .and_then(|mut guard| {
                    guard
                        .create(&text, sid, speed)
                        .map_err(|e| VoiceError::SynthesisError(format!("{e}")))
                })?;
            wav::write_wav(&output, &audio.samples, audio.sample_rate)?;
            Ok(audio.samples.len())
        })
        .await
        .map_err(|e| SynthesisError::Failed(format!("spawn_blocking join error: {e}")))??;

        tracing::debug!(
            samples,
            elapsed_ms = started.elapsed().as_millis(),
            "Speech synthesized (Sherpa Kokoro)"
        );
        Ok(())
    }
}

// ── Voice catalogue ────────────────────────────────────────────────
//
// Kokoro v0.19 English ships 11 voice styles. The speaker IDs are the
// indices into the packed `voices.bin` style matrix.

/// Kokoro voice ids accepted by [`SherpaSynthesizer`], in speaker-id order.
pub const KOKORO_VOICES: [&str; 11] = [
    "af",
    "af_bella",
    "af_nicole",
    "af_sarah",
    "af_sky",
    "am_adam",
    "am_michael",
    "bf_emma",
    "bf_isabella",
    "bm_george",
    "bm_lewis",
];

/// Map a voice id (e.g. `"af_sarah"`) to its sherpa-onnx speaker id.
fn voice_id_to_speaker_id(voice_id: &str) -> Option<i32> {
    KOKORO_VOICES
        .iter()
        .position(|v| *v == voice_id)
        .and_then(|i| i32::try_from(i).ok())
}
