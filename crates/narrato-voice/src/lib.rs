#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod backend;
pub mod error;
pub mod voices;
pub mod wav;

// Re-export key types for convenience
pub use backend::{
    BackendConfig, CommandConfig, CommandSynthesizer, UnavailableSynthesizer, load_backend,
    try_load_backend,
};
#[cfg(feature = "sherpa")]
pub use backend::{KOKORO_VOICES, SherpaConfig, SherpaSynthesizer};
pub use error::VoiceError;
pub use voices::{DEFAULT_VOICES_DIR, VoiceLibrary, VoiceSample};
