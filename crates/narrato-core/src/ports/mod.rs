//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.

pub mod synthesis;

pub use synthesis::{SpeechSynthesizer, SynthesisError};
