//! Common error types for the journal crates

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for journal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the player and the assistant
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration loaded but failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging could not be initialised
    #[error("Logging error: {0}")]
    Logging(String),
}
