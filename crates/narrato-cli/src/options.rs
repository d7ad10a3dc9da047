//! Argument groups shared by several commands.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
#[cfg(feature = "sherpa")]
use narrato_voice::SherpaConfig;
use narrato_voice::backend::command::{
    DEFAULT_LANGUAGE, DEFAULT_PROGRAM, DEFAULT_TIMEOUT_SECS, default_args,
};
use narrato_voice::{BackendConfig, CommandConfig, DEFAULT_VOICES_DIR};

use crate::error::CliError;

/// Synthesis backend selection.
#[derive(Debug, Clone, Args)]
pub struct BackendArgs {
    /// TTS program spawned once per chunk
    #[arg(long, env = "NARRATO_TTS_PROGRAM", default_value = DEFAULT_PROGRAM)]
    pub tts_program: String,

    /// Whitespace-separated argument template; placeholders are
    /// {text}, {voice}, {output} and {language}
    #[arg(long, env = "NARRATO_TTS_ARGS", allow_hyphen_values = true)]
    pub tts_args: Option<String>,

    /// Language code passed as {language}
    #[arg(long, env = "NARRATO_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Directory holding voice samples
    #[arg(long, env = "NARRATO_VOICES_DIR", default_value = DEFAULT_VOICES_DIR)]
    pub voices_dir: PathBuf,

    /// Seconds before a running synthesis is killed
    #[arg(long, env = "NARRATO_TTS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub tts_timeout_secs: u64,

    /// Use the in-process Kokoro backend with the model in this directory
    #[cfg(feature = "sherpa")]
    #[arg(long, env = "NARRATO_SHERPA_MODEL_DIR")]
    pub sherpa_model_dir: Option<PathBuf>,

    /// Kokoro speech speed multiplier
    #[cfg(feature = "sherpa")]
    #[arg(long, env = "NARRATO_SHERPA_SPEED", default_value_t = 1.0)]
    pub sherpa_speed: f32,
}

impl BackendArgs {
    pub fn backend_config(&self) -> BackendConfig {
        #[cfg(feature = "sherpa")]
        if let Some(model_dir) = &self.sherpa_model_dir {
            return BackendConfig::Sherpa(SherpaConfig {
                model_dir: model_dir.clone(),
                speed: self.sherpa_speed,
            });
        }

        let args = self.tts_args.as_deref().map_or_else(default_args, |template| {
            template.split_whitespace().map(String::from).collect()
        });
        BackendConfig::Command(CommandConfig {
            program: self.tts_program.clone(),
            args,
            language: self.language.clone(),
            voices_dir: self.voices_dir.clone(),
            timeout_secs: self.tts_timeout_secs,
        })
    }
}

/// Text given inline, from a file, or on stdin.
#[derive(Debug, Clone, Args)]
pub struct TextInput {
    /// Text to process (reads stdin when neither this nor --file is given)
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

impl TextInput {
    pub fn read(&self) -> Result<String, CliError> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .map_err(|e| CliError::Io(format!("{}: {e}", path.display())));
        }
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    }
}
