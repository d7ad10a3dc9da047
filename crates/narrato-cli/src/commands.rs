//! Main commands enum and per-command arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use narrato_axum::{CorsConfig, ServerConfig};
use narrato_core::{
    DEFAULT_ARTIFACT_TTL_SECS, DEFAULT_BACKEND_CONCURRENCY, DEFAULT_JOB_RETENTION_SECS,
    DEFAULT_MAX_CHUNK_CHARS, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_WORKER_COUNT, JobSettings,
    SchedulePolicy,
};
use narrato_voice::DEFAULT_VOICES_DIR;

use crate::error::CliError;
use crate::options::{BackendArgs, TextInput};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP job server
    Serve(ServeArgs),

    /// Print how a text would be split into chunks
    Split(SplitArgs),

    /// Synthesize a whole text to a directory, one file per chunk
    Synth(SynthArgs),

    /// List voice samples available to the command backend
    Voices(VoicesArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "NARRATO_PORT", default_value_t = narrato_axum::bootstrap::DEFAULT_PORT)]
    pub port: u16,

    /// Directory artifacts are written to and served from
    #[arg(long, env = "NARRATO_OUTPUT_DIR", default_value = "outputs")]
    pub output_dir: PathBuf,

    /// Base for absolute artifact URLs (e.g. https://tts.example.com)
    #[arg(long, env = "NARRATO_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Allowed CORS origins, comma separated (any origin when unset)
    #[arg(long, env = "NARRATO_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allow_origin: Vec<String>,

    /// Background scheduling: eager or lookahead
    #[arg(long, env = "NARRATO_POLICY", default_value = "eager")]
    pub policy: SchedulePolicy,

    /// Background worker tasks
    #[arg(long, env = "NARRATO_WORKERS", default_value_t = DEFAULT_WORKER_COUNT)]
    pub workers: usize,

    /// Concurrent calls into the synthesis backend
    #[arg(long, env = "NARRATO_BACKEND_CONCURRENCY", default_value_t = DEFAULT_BACKEND_CONCURRENCY)]
    pub backend_concurrency: usize,

    /// Maximum characters per chunk
    #[arg(long, env = "NARRATO_MAX_CHUNK_CHARS", default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
    pub max_chunk_chars: usize,

    /// Seconds an artifact is kept after synthesis
    #[arg(long, env = "NARRATO_ARTIFACT_TTL_SECS", default_value_t = DEFAULT_ARTIFACT_TTL_SECS)]
    pub artifact_ttl_secs: u64,

    /// Seconds a job is kept after creation
    #[arg(long, env = "NARRATO_JOB_RETENTION_SECS", default_value_t = DEFAULT_JOB_RETENTION_SECS)]
    pub job_retention_secs: u64,

    /// Seconds between janitor sweeps
    #[arg(long, env = "NARRATO_SWEEP_INTERVAL_SECS", default_value_t = DEFAULT_SWEEP_INTERVAL_SECS)]
    pub sweep_interval_secs: u64,

    #[command(flatten)]
    pub backend: BackendArgs,
}

impl ServeArgs {
    pub fn job_settings(&self) -> Result<JobSettings, CliError> {
        let settings = JobSettings {
            max_chunk_chars: self.max_chunk_chars,
            worker_count: self.workers,
            backend_concurrency: self.backend_concurrency,
            artifact_ttl_secs: self.artifact_ttl_secs,
            job_retention_secs: self.job_retention_secs,
            sweep_interval_secs: self.sweep_interval_secs,
            policy: self.policy,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn server_config(&self) -> Result<ServerConfig, CliError> {
        let mut config = ServerConfig::default()
            .with_port(self.port)
            .with_output_dir(self.output_dir.clone())
            .with_job_settings(self.job_settings()?)
            .with_backend(self.backend.backend_config());
        if let Some(url) = &self.public_url {
            config = config.with_public_base_url(url.clone());
        }
        let origins: Vec<String> = self
            .allow_origin
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        config.cors = if origins.is_empty() {
            CorsConfig::AllowAll
        } else {
            CorsConfig::AllowOrigins(origins)
        };
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub struct SplitArgs {
    #[command(flatten)]
    pub input: TextInput,

    /// Maximum characters per chunk
    #[arg(long, env = "NARRATO_MAX_CHUNK_CHARS", default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
    pub max_chunk_chars: usize,

    /// Print the chunks as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SynthArgs {
    #[command(flatten)]
    pub input: TextInput,

    /// Voice reference (sample file name, or Kokoro voice id)
    #[arg(long)]
    pub voice: String,

    /// Directory the chunk files are written to
    #[arg(short, long, default_value = "outputs")]
    pub output_dir: PathBuf,

    /// File name prefix; files are named <prefix>_part<N>.wav
    #[arg(long, default_value = "output")]
    pub prefix: String,

    /// Maximum characters per chunk
    #[arg(long, env = "NARRATO_MAX_CHUNK_CHARS", default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
    pub max_chunk_chars: usize,

    #[command(flatten)]
    pub backend: BackendArgs,
}

#[derive(Debug, Args)]
pub struct VoicesArgs {
    /// Directory holding voice samples
    #[arg(long, env = "NARRATO_VOICES_DIR", default_value = DEFAULT_VOICES_DIR)]
    pub voices_dir: PathBuf,

    /// Print the samples as JSON
    #[arg(long)]
    pub json: bool,
}
