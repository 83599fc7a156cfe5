//! Error types for the summary generator.
//!
//! Library crates use [`SummaryError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all summary generator operations.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The input file extension is not one of the supported tabular formats.
    #[error("unsupported file format: {extension:?} (expected .xlsx, .csv or .txt)")]
    UnsupportedFormat { extension: String },

    /// A supported tabular file could not be read (corrupt, bad encoding, etc.).
    #[error("could not read the input table: {message}")]
    Ingest { message: String },

    /// A generated document could not be parsed back.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Document packaging failed; the artifact is unusable.
    #[error("serialization error: {message}")]
    Serialize { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Caller input outside what an operation accepts (bad row index, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SummaryError>;

impl SummaryError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an ingest error from any displayable message.
    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a serialization error from any displayable message.
    pub fn serialize(msg: impl Into<String>) -> Self {
        Self::Serialize {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
