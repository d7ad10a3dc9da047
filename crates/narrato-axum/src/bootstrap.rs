//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the Axum web adapter. All concrete implementations are instantiated here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use narrato_core::{ArtifactRef, JobSettings, SpeechSynthesizer};
use narrato_jobs::{DEFAULT_OUTPUT_DIR, JobManager, JobManagerConfig};
use narrato_voice::{BackendConfig, load_backend};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// URL prefix artifacts are served under.
pub const OUTPUTS_ROUTE: &str = "/outputs";

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Directory artifacts are written to and served from.
    pub output_dir: PathBuf,
    /// Absolute base for artifact URLs, e.g. `https://tts.example.com`.
    /// Relative `/outputs/...` URLs are returned when unset.
    pub public_base_url: Option<String>,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Job manager tuning.
    pub jobs: JobSettings,
    /// Synthesis backend selection.
    pub backend: BackendConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            public_base_url: None,
            cors: CorsConfig::default(),
            jobs: JobSettings::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Set the listening port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the artifact directory.
    #[must_use]
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    /// Return absolute artifact URLs under `base`.
    #[must_use]
    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        self.public_base_url = Some(base.into());
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    #[must_use]
    pub fn with_job_settings(mut self, jobs: JobSettings) -> Self {
        self.jobs = jobs;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// The job manager every handler delegates to.
    pub jobs: Arc<JobManager>,
    /// Prefix joined with an artifact's file name to form its URL.
    artifact_base: String,
}

impl AxumContext {
    pub fn new(jobs: Arc<JobManager>, public_base_url: Option<&str>) -> Self {
        Self {
            jobs,
            artifact_base: artifact_base(public_base_url),
        }
    }

    /// Public URL of `artifact`.
    pub fn artifact_url(&self, artifact: &ArtifactRef) -> String {
        format!("{}/{}", self.artifact_base, artifact.file_name())
    }
}

/// Bootstrap the Axum server: load the configured backend and start the
/// job manager.
///
/// A backend that fails to load does not abort startup; jobs are then
/// rejected as unavailable.
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let backend = load_backend(&config.backend);
    bootstrap_with_backend(config, backend)
}

/// Bootstrap with an already constructed backend.
pub fn bootstrap_with_backend(
    config: &ServerConfig,
    backend: Arc<dyn SpeechSynthesizer>,
) -> Result<AxumContext> {
    tracing::info!(
        output_dir = %config.output_dir.display(),
        backend = backend.name(),
        public_base_url = config.public_base_url.as_deref().unwrap_or("-"),
        "Axum bootstrap"
    );

    let manager = JobManager::start(
        JobManagerConfig::new(config.output_dir.clone()).with_settings(config.jobs.clone()),
        backend,
    )
    .context("failed to start job manager")?;

    Ok(AxumContext::new(
        Arc::new(manager),
        config.public_base_url.as_deref(),
    ))
}

/// Start the web server on the configured port.
///
/// Runs until Ctrl-C, then stops the job manager's background tasks.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(&config)?;
    let jobs = Arc::clone(&ctx.jobs);
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("narrato server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    jobs.shutdown();
    info!("narrato server stopped");
    Ok(())
}

fn artifact_base(public_base_url: Option<&str>) -> String {
    match public_base_url {
        Some(base) => format!("{}{OUTPUTS_ROUTE}", base.trim_end_matches('/')),
        None => OUTPUTS_ROUTE.to_string(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
