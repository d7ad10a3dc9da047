//! Shared utilities for backend implementations.

use std::path::Path;

/// Convert a `Path` to a `String`, mapping invalid UTF-8 to a caller-supplied error.
///
/// Backends pass the [`VoiceError`](crate::error::VoiceError) variant that
/// fits the context, e.g. `InvalidVoiceReference` for voice samples and
/// `SynthesisError` for output paths.
pub(super) fn path_to_string<E>(path: &Path, err: impl FnOnce(String) -> E) -> Result<String, E> {
    path.to_str()
        .map(ToString::to_string)
        .ok_or_else(|| err(format!("Invalid UTF-8 path: {}", path.display())))
}
