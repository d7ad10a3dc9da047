//! External-command TTS backend.
//!
//! Spawns a TTS command line once per chunk. Placeholders in the argument
//! template are expanded per call; each expands inside exactly one argv entry
//! and the process is spawned without a shell, so chunk text is never
//! interpreted.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use narrato_core::{SpeechSynthesizer, SynthesisError, VoiceRef};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use super::util::path_to_string;
use crate::error::VoiceError;
use crate::voices::{DEFAULT_VOICES_DIR, VoiceLibrary};
use crate::wav;

/// Default TTS program (Coqui TTS CLI).
pub const DEFAULT_PROGRAM: &str = "tts";

/// Default synthesis language.
pub const DEFAULT_LANGUAGE: &str = "ar";

/// Default per-chunk time limit.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

const TEXT: &str = "{text}";
const VOICE: &str = "{voice}";
const OUTPUT: &str = "{output}";
const LANGUAGE: &str = "{language}";

/// Argument template for the Coqui CLI with the multilingual XTTS v2 model.
#[must_use]
pub fn default_args() -> Vec<String> {
    [
        "--model_name",
        "tts_models/multilingual/multi-dataset/xtts_v2",
        "--text",
        TEXT,
        "--speaker_wav",
        VOICE,
        "--language_idx",
        LANGUAGE,
        "--out_path",
        OUTPUT,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Configuration for [`CommandSynthesizer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Program to spawn (looked up on `PATH` when not absolute).
    pub program: String,

    /// Argument template with `{text}`, `{voice}`, `{output}`, `{language}`.
    pub args: Vec<String>,

    /// Language code substituted for `{language}`.
    pub language: String,

    /// Directory holding voice samples.
    pub voices_dir: PathBuf,

    /// Seconds before a running synthesis is killed.
    pub timeout_secs: u64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: default_args(),
            language: DEFAULT_LANGUAGE.to_string(),
            voices_dir: PathBuf::from(DEFAULT_VOICES_DIR),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Synthesizer that shells out to a TTS command line.
#[derive(Debug)]
pub struct CommandSynthesizer {
    config: CommandConfig,
    voices: VoiceLibrary,
}

impl CommandSynthesizer {
    /// Validate `config` and build the backend.
    ///
    /// The template must reference both `{text}` and `{output}`; without them
    /// the command cannot produce the requested artifact.
    pub fn new(config: CommandConfig) -> Result<Self, VoiceError> {
        if config.program.trim().is_empty() {
            return Err(VoiceError::InvalidConfig("TTS program is empty".to_string()));
        }
        for required in [TEXT, OUTPUT] {
            if !config.args.iter().any(|a| a.contains(required)) {
                return Err(VoiceError::InvalidConfig(format!(
                    "argument template must contain {required}"
                )));
            }
        }
        if config.timeout_secs == 0 {
            return Err(VoiceError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }

        tracing::info!(
            program = %config.program,
            voices_dir = %config.voices_dir.display(),
            language = %config.language,
            "Command TTS backend configured"
        );

        let voices = VoiceLibrary::new(config.voices_dir.clone());
        Ok(Self { config, voices })
    }

    #[must_use]
    pub const fn config(&self) -> &CommandConfig {
        &self.config
    }

    #[must_use]
    pub const fn voices(&self) -> &VoiceLibrary {
        &self.voices
    }

    /// Expand the argument template for one call.
    fn expand_args(&self, text: &str, voice: &str, output: &str) -> Vec<String> {
        let values = [
            (TEXT, text),
            (VOICE, voice),
            (OUTPUT, output),
            (LANGUAGE, self.config.language.as_str()),
        ];
        self.config
            .args
            .iter()
            .map(|arg| substitute(arg, &values))
            .collect()
    }

    async fn run(&self, text: &str, voice: &VoiceRef, output: &Path) -> Result<(), VoiceError> {
        let output_str = path_to_string(output, VoiceError::SynthesisError)?;
        let args = self.expand_args(text, &voice.resolved, &output_str);

        let child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                VoiceError::ProcessFailed(format!("failed to spawn {}: {e}", self.config.program))
            })?;

        let timeout = Duration::from_secs(self.config.timeout_secs);
        // Dropping the future on timeout drops the child, which kills it.
        let result = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| VoiceError::Timeout(self.config.timeout_secs))?
            .map_err(|e| VoiceError::ProcessFailed(e.to_string()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(VoiceError::ProcessFailed(format!(
                "{}: {}",
                result.status,
                stderr.trim()
            )));
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(VoiceError::MissingOutput(output.to_path_buf()));
        }

        let probe_path = output.to_path_buf();
        let info = tokio::task::spawn_blocking(move || wav::probe(&probe_path))
            .await
            .map_err(|e| VoiceError::SynthesisError(format!("spawn_blocking join error: {e}")))??;

        tracing::debug!(
            output = %output.display(),
            sample_rate = info.sample_rate,
            duration_ms = info.duration().as_millis(),
            "Command TTS wrote artifact"
        );
        Ok(())
    }
}

/// Replace every placeholder in `template` in one left-to-right pass.
///
/// Substituted values are never scanned again; unknown `{...}` sequences
/// are kept verbatim.
fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = values
            .iter()
            .find(|(placeholder, _)| tail.starts_with(placeholder));
        match hit {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    fn name(&self) -> &'static str {
        "command"
    }

    fn health(&self) -> Result<(), SynthesisError> {
        if self.voices.root().is_dir() {
            Ok(())
        } else {
            Err(SynthesisError::Unavailable(format!(
                "voices directory {} does not exist",
                self.voices.root().display()
            )))
        }
    }

    fn resolve_voice(&self, reference: &str) -> Result<VoiceRef, SynthesisError> {
        let path = self.voices.resolve(reference)?;
        let resolved = path_to_string(&path, VoiceError::InvalidVoiceReference)?;
        Ok(VoiceRef::new(reference, resolved))
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceRef,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let started = Instant::now();
        tracing::debug!(
            text_len = text.chars().count(),
            voice = %voice.requested,
            output = %output.display(),
            "Synthesizing speech (command)"
        );

        self.run(text, voice, output).await.map_err(|e| {
            tracing::warn!(
                error = %e,
                elapsed_ms = started.elapsed().as_millis(),
                "Command TTS failed"
            );
            SynthesisError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth_with(args: &[&str]) -> Result<CommandSynthesizer, VoiceError> {
        CommandSynthesizer::new(CommandConfig {
            args: args.iter().map(ToString::to_string).collect(),
            ..CommandConfig::default()
        })
    }

    #[test]
    fn test_default_template_is_valid() {
        assert!(CommandSynthesizer::new(CommandConfig::default()).is_ok());
    }

    #[test]
    fn test_template_requires_text_and_output() {
        assert!(matches!(
            synth_with(&["--out", "{output}"]),
            Err(VoiceError::InvalidConfig(_))
        ));
        assert!(matches!(
            synth_with(&["{text}"]),
            Err(VoiceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_expand_args_keeps_text_in_one_argument() {
        let synth = synth_with(&["--text={text}", "{voice}", "{output}", "{language}"]).unwrap();
        let args = synth.expand_args("hello; rm -rf / {voice}", "v.wav", "/out/1.wav");
        assert_eq!(
            args,
            vec![
                "--text=hello; rm -rf / {voice}",
                "v.wav",
                "/out/1.wav",
                "ar"
            ]
        );
    }

    #[test]
    fn test_substituted_values_are_not_expanded_again() {
        let synth = synth_with(&["{voice}", "{output}", "{text}", "{{text}}", "{rate}"]).unwrap();
        let args = synth.expand_args("hi", "/voices/{text}.wav", "/out/{voice}{language}.wav");
        assert_eq!(
            args,
            vec![
                "/voices/{text}.wav",
                "/out/{voice}{language}.wav",
                "hi",
                "{hi}",
                "{rate}"
            ]
        );
    }

    #[test]
    fn test_missing_voices_dir_is_unhealthy() {
        let synth = CommandSynthesizer::new(CommandConfig {
            voices_dir: PathBuf::from("/definitely/not/here"),
            ..CommandConfig::default()
        })
        .unwrap();
        assert!(matches!(
            synth.health(),
            Err(SynthesisError::Unavailable(_))
        ));
    }
}
