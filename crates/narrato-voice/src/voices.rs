//! Voice sample lookup.
//!
//! Clients name a voice sample by file name (`"sound4.wav"`); the library
//! resolves it under a fixed directory and refuses anything that could
//! escape it.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::VoiceError;

/// Default directory holding reference voice samples.
pub const DEFAULT_VOICES_DIR: &str = "sounds";

/// One voice sample on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSample {
    /// Reference clients pass as `voice`.
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Directory of voice samples addressed by relative name.
#[derive(Debug, Clone)]
pub struct VoiceLibrary {
    root: PathBuf,
}

impl VoiceLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `reference` to an existing file under the library root.
    ///
    /// Only plain relative paths are accepted; absolute paths, `..` and
    /// root/prefix components are rejected before touching the filesystem.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf, VoiceError> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(VoiceError::InvalidVoiceReference(reference.to_string()));
        }

        let relative = Path::new(trimmed);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !plain {
            return Err(VoiceError::InvalidVoiceReference(reference.to_string()));
        }

        let path = self.root.join(relative);
        if !path.is_file() {
            return Err(VoiceError::VoiceNotFound(reference.to_string()));
        }
        Ok(path)
    }

    /// List `.wav` samples directly under the root, sorted by name.
    pub fn list(&self) -> Result<Vec<VoiceSample>, VoiceError> {
        let mut samples = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let is_wav = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
            if !is_wav {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            samples.push(VoiceSample {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                size_bytes: metadata.len(),
            });
        }
        samples.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(samples)
    }
}

impl Default for VoiceLibrary {
    fn default() -> Self {
        Self::new(DEFAULT_VOICES_DIR)
    }
}
