//! Text preprocessing for synthesis.

mod segment;

pub use segment::{DEFAULT_MAX_CHUNK_CHARS, segment, segment_default};
