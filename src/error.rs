//! Error types for the organizer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the organizer.
#[derive(Error, Debug)]
pub enum Error {
    // Scan errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to scan {path}: {reason}")]
    Scan { path: PathBuf, reason: String },

    // Guessing errors (always recovered by the extractor)
    #[error("Failed to guess metadata for {0}")]
    Guess(String),

    // Planning errors
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Execution errors
    #[error("Failed to transfer {from} -> {to}: {reason}")]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    #[error("Transcode failed for {path}: {reason}")]
    Transcode { path: PathBuf, reason: String },

    // Interactive prompt errors
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    // Config errors
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
