//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin wrappers that delegate to `JobManager`.

pub mod jobs;
pub mod system;
