//! Job and chunk domain types.
//!
//! A job is one synthesis request: an ordered, immutable list of text chunks
//! plus one [`ChunkState`] per chunk. Chunk indices are 1-based everywhere
//! in the public API.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, unique job identifier.
///
/// Generated once at creation (UUID v4) and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Allocate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Locator of a synthesized artifact.
///
/// This is the artifact's file name inside the output directory, e.g.
/// `"3f0c…_part2.wav"`. It is enough to build both a filesystem path and a
/// public URL without leaking absolute paths to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    /// File extension used for every artifact.
    pub const EXTENSION: &'static str = "wav";

    /// Canonical artifact name for chunk `index` of `job`.
    #[must_use]
    pub fn for_chunk(job: JobId, index: usize) -> Self {
        Self(format!("{job}_part{index}.{}", Self::EXTENSION))
    }

    /// The artifact file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.0
    }

    /// Absolute location of this artifact under `output_dir`.
    #[must_use]
    pub fn path_in(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.0)
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A voice reference that a backend has already validated.
///
/// Only [`SpeechSynthesizer::resolve_voice`](crate::ports::SpeechSynthesizer::resolve_voice)
/// creates these, so holding one means the reference existed at job creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRef {
    /// The reference exactly as the client supplied it.
    pub requested: String,
    /// Backend-specific resolved form (a sample file path, a voice id, ...).
    pub resolved: String,
}

impl VoiceRef {
    pub fn new(requested: impl Into<String>, resolved: impl Into<String>) -> Self {
        Self {
            requested: requested.into(),
            resolved: resolved.into(),
        }
    }
}

/// Synthesis status of one chunk.
///
/// `Done` and `Failed` are terminal: once a chunk reaches either, the job
/// store never moves it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ChunkState {
    Pending,
    InProgress,
    Done { artifact: ArtifactRef },
    Failed { reason: String },
}

impl ChunkState {
    /// Whether the chunk has been resolved (successfully or not).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed { .. })
    }

    /// The artifact, if the chunk is done.
    #[must_use]
    pub const fn artifact(&self) -> Option<&ArtifactRef> {
        match self {
            Self::Done { artifact } => Some(artifact),
            _ => None,
        }
    }

    /// Collapse into the three statuses exposed to pollers.
    #[must_use]
    pub const fn status(&self) -> ChunkStatus {
        match self {
            Self::Pending | Self::InProgress => ChunkStatus::Pending,
            Self::Done { .. } => ChunkStatus::Done,
            Self::Failed { .. } => ChunkStatus::Failed,
        }
    }
}

/// Client-facing chunk status. `InProgress` is reported as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    Pending,
    Done,
    Failed,
}

/// Point-in-time copy of one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSnapshot {
    /// 1-based chunk index.
    pub index: usize,
    pub state: ChunkState,
}

/// Point-in-time copy of a whole job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub id: JobId,
    pub created_at: DateTime<Utc>,
    pub chunks: Vec<ChunkSnapshot>,
}

impl JobSnapshot {
    /// Number of chunks in the job.
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Whether every chunk is `Done` or `Failed`.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.chunks.iter().all(|c| c.state.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_round_trips_through_display() {
        let id = JobId::new();
        let parsed: JobId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn job_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<JobId>().is_err());
    }

    #[test]
    fn artifact_name_is_stable_per_chunk() {
        let id = JobId::new();
        let a = ArtifactRef::for_chunk(id, 3);
        assert_eq!(a.file_name(), format!("{id}_part3.wav"));
        assert_eq!(a, ArtifactRef::for_chunk(id, 3));
        assert_ne!(a, ArtifactRef::for_chunk(id, 4));
    }

    #[test]
    fn artifact_path_is_inside_output_dir() {
        let a = ArtifactRef::for_chunk(JobId::new(), 1);
        let path = a.path_in(Path::new("/srv/outputs"));
        assert_eq!(path.parent(), Some(Path::new("/srv/outputs")));
    }

    #[test]
    fn in_progress_is_reported_as_pending() {
        assert_eq!(ChunkState::InProgress.status(), ChunkStatus::Pending);
        assert_eq!(ChunkState::Pending.status(), ChunkStatus::Pending);
        assert!(!ChunkState::InProgress.is_terminal());
    }

    #[test]
    fn chunk_state_serializes_with_tag() {
        let state = ChunkState::Failed {
            reason: "boom".to_string(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "boom");
    }
}
