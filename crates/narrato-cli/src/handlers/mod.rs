//! Command handlers.
//!
//! Each handler exposes `pub async fn execute(args) -> anyhow::Result<()>`:
//! it reads its input, calls into the library crates and formats output
//! for the terminal.

pub mod serve;
pub mod split;
pub mod synth;
pub mod voices;
