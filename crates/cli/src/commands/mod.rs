//! Subcommand implementations.
//!
//! Each command returns the text to print; `main` does the printing.

use thiserror::Error;

pub mod message_ts;
pub mod payload;
pub mod sign;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Neither `--body` nor `--body-file` was given.
    #[error("Pass the body with --body or --body-file")]
    MissingBody,

    /// The body file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadBody {
        /// File that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The system clock is before the unix epoch.
    #[error("System clock error: {0}")]
    Clock(#[from] std::time::SystemTimeError),

    /// The message id cannot be converted.
    #[error(transparent)]
    MessageTs(#[from] gohan_core::MessageTsError),
}
