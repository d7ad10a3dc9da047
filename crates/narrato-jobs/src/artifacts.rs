//! Artifact storage on the local filesystem.
//!
//! Artifacts live flat in one output directory under their
//! [`ArtifactRef`] file name. Deletion is idempotent: removing a file that
//! is already gone is not an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use narrato_core::{ArtifactRef, JobError};

/// Default output directory for artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Handle to the artifact output directory. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: Arc<PathBuf>,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    /// Ensure the output directory exists, creating it if necessary.
    pub fn ensure_dir(&self) -> Result<(), JobError> {
        if !self.root.exists() {
            std::fs::create_dir_all(self.root.as_path())
                .map_err(|e| JobError::io("create output dir", e))?;
        }
        Ok(())
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location for `artifact`.
    #[must_use]
    pub fn path(&self, artifact: &ArtifactRef) -> PathBuf {
        artifact.path_in(&self.root)
    }

    /// Whether the artifact file is still present.
    pub async fn exists(&self, artifact: &ArtifactRef) -> bool {
        tokio::fs::try_exists(self.path(artifact))
            .await
            .unwrap_or(false)
    }

    /// Delete the artifact file.
    ///
    /// Returns `Ok(true)` if a file was removed and `Ok(false)` if it was
    /// already gone.
    pub async fn delete(&self, artifact: &ArtifactRef) -> Result<bool, JobError> {
        match tokio::fs::remove_file(self.path(artifact)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(JobError::io("delete artifact", e)),
        }
    }

    /// Delete every artifact in `artifacts`, logging failures.
    ///
    /// Returns how many files were actually removed.
    pub async fn delete_all(&self, artifacts: &[ArtifactRef]) -> usize {
        let mut removed = 0;
        for artifact in artifacts {
            match self.delete(artifact).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(artifact = %artifact, error = %e, "Failed to delete artifact");
                }
            }
        }
        removed
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}
