#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod settings;
pub mod text;

// Re-export commonly used types for convenience
pub use domain::{
    ArtifactRef, ChunkSnapshot, ChunkState, ChunkStatus, JobId, JobSnapshot, VoiceRef,
};
pub use error::JobError;
pub use ports::{SpeechSynthesizer, SynthesisError};
pub use settings::{
    DEFAULT_ARTIFACT_TTL_SECS, DEFAULT_BACKEND_CONCURRENCY, DEFAULT_JOB_RETENTION_SECS,
    DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_WORKER_COUNT, JobSettings, SchedulePolicy,
    SettingsError,
};
pub use text::{DEFAULT_MAX_CHUNK_CHARS, segment, segment_default};

// Only the integration tests drive async code
#[cfg(test)]
use tokio as _;
