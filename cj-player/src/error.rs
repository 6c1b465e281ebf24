//! Error types for cj-player

use thiserror::Error;

/// Main error type for the player
#[derive(Error, Debug)]
pub enum Error {
    /// Jump target outside the deck
    ///
    /// Jump requests are validated by the input layer, so reaching this is a
    /// contract violation rather than a user mistake.
    #[error("Invalid slide index {index} (deck has {slide_count} slides)")]
    InvalidIndex { index: usize, slide_count: usize },

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(#[from] cj_common::Error),

    /// Terminal I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the player Error
pub type Result<T> = std::result::Result<T, Error>;
