//! # Confession Journal Common Library
//!
//! Shared code for the journal player and the writing assistant:
//! - Slide and track descriptors
//! - Session event types and the EventBus
//! - Configuration loading (TOML + compiled defaults)
//! - Logging initialisation

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;

pub use error::{Error, Result};
pub use model::{LoopPolicy, SlideContent, SlideDescriptor, Track};
