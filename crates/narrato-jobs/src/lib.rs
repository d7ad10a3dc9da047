#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

// Re-export core types for convenience
pub use narrato_core::{
    ArtifactRef, ChunkState, ChunkStatus, JobError, JobId, JobSettings, JobSnapshot,
    SchedulePolicy, SpeechSynthesizer, SynthesisError, VoiceRef,
};

pub mod artifacts;
pub mod executor;
pub mod janitor;
pub mod store;

mod manager;

pub use artifacts::{ArtifactStore, DEFAULT_OUTPUT_DIR};
pub use executor::{ExecutionOutcome, SynthesisExecutor};
pub use janitor::{ExpiryQueue, Janitor, SweepReport};
pub use manager::{ChunkTask, CreateJobRequest, CreatedJob, JobManager, JobManagerConfig};
pub use store::{ChunkClaim, JobStore, Transition};

// Dev-dependencies used only by the integration tests
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use mockall as _;
