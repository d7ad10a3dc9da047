//! CLI-specific error types and exit codes.

use narrato_core::{JobError, SettingsError, SynthesisError};
use narrato_voice::VoiceError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument or input validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The synthesis backend could not be used or failed.
    #[error("Synthesis error: {0}")]
    Synthesis(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Synthesis(_) => 1,
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        Self::Synthesis(err.to_string())
    }
}

impl From<SynthesisError> for CliError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::VoiceNotFound(msg) => Self::Arguments(format!("voice not found: {msg}")),
            other => Self::Synthesis(other.to_string()),
        }
    }
}

impl From<JobError> for CliError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::InvalidInput(msg) => Self::Arguments(msg),
            JobError::Io(msg) => Self::Io(msg),
            other => Self::Synthesis(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
