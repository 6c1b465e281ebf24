//! Error types for cj-ai

use thiserror::Error;

/// Text generation errors
///
/// None of these reach the user directly: callers that need text no matter
/// what use [`crate::GenerativeClient::generate_or_fallback`].
#[derive(Debug, Error)]
pub enum AiError {
    /// No API key in config or environment
    #[error("No API key configured (set [assistant].api_key or GEMINI_API_KEY)")]
    MissingApiKey,

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// API returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse API response JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response carried no usable text
    #[error("Response contained no text")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, AiError>;
