//! Shared fixtures for job manager integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use narrato_jobs::{
    ChunkState, JobError, JobId, JobManager, JobManagerConfig, JobSettings, SpeechSynthesizer,
    SynthesisError, VoiceRef,
};
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Marker that makes [`FakeSynth`] fail a chunk.
pub const FAIL_MARKER: &str = "FAIL";

/// Marker that makes [`FakeSynth`] block a chunk until [`FakeSynth::release`].
pub const SLOW_MARKER: &str = "SLOW";

/// Marker that makes [`FakeSynth`] leave a directory at the output path and
/// fail.
pub const JUNK_MARKER: &str = "JUNK";

/// In-memory backend that writes a tiny file per chunk and records calls.
pub struct FakeSynth {
    healthy: AtomicBool,
    delay: Duration,
    gate: Semaphore,
    calls: Mutex<HashMap<String, usize>>,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSynth {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            healthy: AtomicBool::new(true),
            delay,
            gate: Semaphore::new(0),
            calls: Mutex::new(HashMap::new()),
            completed: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Let every blocked (`SLOW`) chunk proceed.
    pub fn release(&self) {
        self.gate.add_permits(1_000);
    }

    pub fn calls_for(&self, text: &str) -> usize {
        self.calls.lock().unwrap().get(text).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynth {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn health(&self) -> Result<(), SynthesisError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SynthesisError::Unavailable("model not loaded".to_string()))
        }
    }

    fn resolve_voice(&self, reference: &str) -> Result<VoiceRef, SynthesisError> {
        if reference == "missing.wav" {
            return Err(SynthesisError::VoiceNotFound(reference.to_string()));
        }
        Ok(VoiceRef::new(reference, format!("/voices/{reference}")))
    }

    async fn synthesize(
        &self,
        text: &str,
        _voice: &VoiceRef,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(text.to_string())
            .or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if text.contains(SLOW_MARKER) {
            self.gate
                .acquire()
                .await
                .map_err(|e| SynthesisError::Failed(e.to_string()))?
                .forget();
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = if text.contains(FAIL_MARKER) {
            Err(SynthesisError::Failed(format!("cannot say {text:?}")))
        } else if text.contains(JUNK_MARKER) {
            match tokio::fs::create_dir_all(output).await {
                Ok(()) => Err(SynthesisError::Failed("left a directory behind".to_string())),
                Err(e) => Err(e.into()),
            }
        } else {
            tokio::fs::write(output, b"RIFF....WAVE").await.map_err(SynthesisError::from)
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// A started manager over a temporary output directory.
pub struct Harness {
    pub manager: JobManager,
    pub synth: Arc<FakeSynth>,
    pub dir: TempDir,
}

pub fn harness(synth: FakeSynth, settings: JobSettings) -> Harness {
    let dir = TempDir::new().unwrap();
    let synth = Arc::new(synth);
    let config = JobManagerConfig::new(dir.path().join("outputs")).with_settings(settings);
    let manager = JobManager::start(config, Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>)
        .unwrap();
    Harness {
        manager,
        synth,
        dir,
    }
}

/// `count` sentences of `len` characters each (terminator included).
pub fn sentences(count: usize, len: usize) -> String {
    (0..count)
        .map(|i| {
            let body: String = std::iter::repeat(char::from(b'a' + (i % 26) as u8))
                .take(len - 1)
                .collect();
            format!("{body}.")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Poll until chunk `index` is terminal (or the chunk errors).
pub async fn wait_terminal(
    manager: &JobManager,
    job_id: JobId,
    index: usize,
) -> Result<ChunkState, JobError> {
    for _ in 0..500 {
        match manager.chunk_status(job_id, index).await {
            Ok(state) if !state.is_terminal() => {}
            other => return other,
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("chunk {index} of {job_id} never resolved");
}

/// Poll `check` until it is true or five seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
