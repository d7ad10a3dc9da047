//! Domain types shared by every narrato crate.

mod job;

pub use job::{
    ArtifactRef, ChunkSnapshot, ChunkState, ChunkStatus, JobId, JobSnapshot, VoiceRef,
};
