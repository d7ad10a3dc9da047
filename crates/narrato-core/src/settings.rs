//! Job manager settings and validation.
//!
//! Pure domain types with no infrastructure dependencies. Durations are
//! stored as whole seconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::text::DEFAULT_MAX_CHUNK_CHARS;

/// Default number of background synthesis workers.
pub const DEFAULT_WORKER_COUNT: usize = 2;

/// Default number of concurrent calls into the synthesis backend.
pub const DEFAULT_BACKEND_CONCURRENCY: usize = 1;

/// Default lifetime of a produced artifact.
pub const DEFAULT_ARTIFACT_TTL_SECS: u64 = 300;

/// Default lifetime of a job record (and whatever artifacts it still owns).
pub const DEFAULT_JOB_RETENTION_SECS: u64 = 3600;

/// Default interval between janitor sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// When chunks after the first are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulePolicy {
    /// Enqueue every remaining chunk at creation.
    #[default]
    Eager,
    /// Enqueue chunk 2 at creation; fetching chunk k enqueues k + 1.
    Lookahead,
}

impl std::str::FromStr for SchedulePolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eager" => Ok(Self::Eager),
            "lookahead" => Ok(Self::Lookahead),
            other => Err(SettingsError::UnknownPolicy(other.to_string())),
        }
    }
}

impl std::fmt::Display for SchedulePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eager => f.write_str("eager"),
            Self::Lookahead => f.write_str("lookahead"),
        }
    }
}

/// Tunables for chunking, scheduling and cleanup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JobSettings {
    /// Chunk cap in characters.
    pub max_chunk_chars: usize,

    /// Number of background workers draining the chunk queue.
    pub worker_count: usize,

    /// Concurrent backend calls permitted across the whole process.
    /// `1` serializes every synthesis call.
    pub backend_concurrency: usize,

    /// Seconds an artifact lives after it was produced.
    pub artifact_ttl_secs: u64,

    /// Seconds a job record lives after creation.
    pub job_retention_secs: u64,

    /// Seconds between janitor sweeps.
    pub sweep_interval_secs: u64,

    /// Scheduling of chunks 2..N.
    pub policy: SchedulePolicy,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl JobSettings {
    /// Create settings with the stock defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            worker_count: DEFAULT_WORKER_COUNT,
            backend_concurrency: DEFAULT_BACKEND_CONCURRENCY,
            artifact_ttl_secs: DEFAULT_ARTIFACT_TTL_SECS,
            job_retention_secs: DEFAULT_JOB_RETENTION_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            policy: SchedulePolicy::Eager,
        }
    }

    #[must_use]
    pub const fn artifact_ttl(&self) -> Duration {
        Duration::from_secs(self.artifact_ttl_secs)
    }

    #[must_use]
    pub const fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }

    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Reject values the manager cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_chunk_chars == 0 {
            return Err(SettingsError::InvalidChunkSize);
        }
        if !(1..=64).contains(&self.worker_count) {
            return Err(SettingsError::InvalidWorkerCount(self.worker_count));
        }
        if !(1..=64).contains(&self.backend_concurrency) {
            return Err(SettingsError::InvalidBackendConcurrency(
                self.backend_concurrency,
            ));
        }
        if self.artifact_ttl_secs == 0 {
            return Err(SettingsError::ZeroDuration("artifact_ttl_secs"));
        }
        if self.job_retention_secs == 0 {
            return Err(SettingsError::ZeroDuration("job_retention_secs"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(SettingsError::ZeroDuration("sweep_interval_secs"));
        }
        Ok(())
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Max chunk size must be at least 1 character")]
    InvalidChunkSize,

    #[error("Worker count must be between 1 and 64, got {0}")]
    InvalidWorkerCount(usize),

    #[error("Backend concurrency must be between 1 and 64, got {0}")]
    InvalidBackendConcurrency(usize),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Unknown schedule policy '{0}' (expected 'eager' or 'lookahead')")]
    UnknownPolicy(String),
}
