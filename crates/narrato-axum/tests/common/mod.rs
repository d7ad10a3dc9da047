//! Shared helpers for narrato-axum route tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use narrato_axum::{CorsConfig, ServerConfig, bootstrap_with_backend, create_router};
use narrato_core::{SpeechSynthesizer, SynthesisError, VoiceRef};
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tower::ServiceExt;

/// Text containing this marker fails to synthesize.
pub const FAIL_MARKER: &str = "FAIL";

/// Text containing this marker blocks until [`StubSynth::release`].
pub const SLOW_MARKER: &str = "SLOW";

/// Writes a fixed payload per chunk.
pub struct StubSynth {
    healthy: AtomicBool,
    gate: Semaphore,
}

impl StubSynth {
    pub fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            gate: Semaphore::new(0),
        }
    }

    pub fn unhealthy() -> Self {
        let synth = Self::new();
        synth.healthy.store(false, Ordering::SeqCst);
        synth
    }

    pub fn release(&self) {
        self.gate.add_permits(1_000);
    }
}

pub const AUDIO: &[u8] = b"RIFF\x24\x00\x00\x00WAVE";

#[async_trait]
impl SpeechSynthesizer for StubSynth {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn health(&self) -> Result<(), SynthesisError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SynthesisError::Unavailable("model failed to load".to_string()))
        }
    }

    fn resolve_voice(&self, reference: &str) -> Result<VoiceRef, SynthesisError> {
        if reference.ends_with(".wav") && !reference.starts_with("missing") {
            Ok(VoiceRef::new(reference, reference))
        } else {
            Err(SynthesisError::VoiceNotFound(reference.to_string()))
        }
    }

    async fn synthesize(
        &self,
        text: &str,
        _voice: &VoiceRef,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        if text.contains(SLOW_MARKER) {
            self.gate
                .acquire()
                .await
                .map_err(|e| SynthesisError::Failed(e.to_string()))?
                .forget();
        }
        if text.contains(FAIL_MARKER) {
            return Err(SynthesisError::Failed("engine crashed".to_string()));
        }
        tokio::fs::write(output, AUDIO).await?;
        Ok(())
    }
}

/// A router over a stub backend and a temporary output directory.
pub struct TestApp {
    pub router: Router,
    pub synth: Arc<StubSynth>,
    pub jobs: Arc<narrato_jobs::JobManager>,
    pub dir: TempDir,
}

pub fn test_app(synth: StubSynth) -> TestApp {
    test_app_with(synth, ServerConfig::default())
}

pub fn test_app_with(synth: StubSynth, config: ServerConfig) -> TestApp {
    let dir = TempDir::new().unwrap();
    let synth = Arc::new(synth);
    let config = config.with_output_dir(dir.path().join("outputs"));
    let ctx = bootstrap_with_backend(&config, Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>)
        .unwrap();
    let jobs = Arc::clone(&ctx.jobs);
    TestApp {
        router: create_router(ctx, &CorsConfig::AllowAll),
        synth,
        jobs,
        dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self
            .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        (status, parse_json(&body))
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let (status, body) = self
            .send(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        (status, parse_json(&body))
    }

    pub async fn create_job(&self, text: &str) -> serde_json::Value {
        let (status, json) = self
            .post_json(
                "/jobs",
                &serde_json::json!({ "text": text, "voice": "speaker.wav" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {json}");
        json
    }
}

pub fn parse_json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        panic!(
            "Expected valid JSON body: {e}: {}",
            String::from_utf8_lossy(body)
        )
    })
}

/// Two sentences long enough to land in separate chunks.
pub fn two_chunk_text(second: &str) -> String {
    format!("{}. {second}{}.", "a".repeat(300), "b".repeat(300))
}
