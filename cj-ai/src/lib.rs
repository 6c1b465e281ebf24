//! # Confession Journal Writing Assistant (cj-ai)
//!
//! Turns a short idea into a poem, a sentence or a paragraph for the journal
//! using a hosted generative language model. Failures never surface as
//! errors to the writer: a fixed quote is offered instead.

pub mod assistant;
pub mod client;
pub mod error;
pub mod prompts;

pub use assistant::Assistant;
pub use client::{GenerativeClient, FALLBACK_TEXT};
pub use error::{AiError, Result};
pub use prompts::PromptKind;
