//! Slide and track descriptors
//!
//! Both lists are fixed at startup and never mutated during a session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Renderable content of one slide
///
/// Opaque to the controllers; only the renderer looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideContent {
    pub title: String,
    #[serde(default)]
    pub body: Vec<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// One screen of the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideDescriptor {
    /// Position in the deck (0-based)
    pub index: usize,
    pub content: SlideContent,
    /// Background image URI
    pub background: String,
}

/// How a track repeats once it reaches its end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPolicy {
    /// Repeated natively by the backend; no ended signal is expected
    LoopAlways,
    /// Plays once, then hands over to the next track
    LoopNever,
    /// First play hands over to the next track, later plays loop natively
    LoopAfterFirst,
}

impl std::fmt::Display for LoopPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopPolicy::LoopAlways => write!(f, "loop_always"),
            LoopPolicy::LoopNever => write!(f, "loop_never"),
            LoopPolicy::LoopAfterFirst => write!(f, "loop_after_first"),
        }
    }
}

/// Background music track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Audio source URI
    pub source: String,
    pub loop_policy: LoopPolicy,
    /// Known length of the asset in seconds, if any
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

impl Track {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
    }

    /// Whether the backend should loop this track natively, given how many
    /// times it has already played to the end
    pub fn loops_natively(&self, completed_plays: u32) -> bool {
        match self.loop_policy {
            LoopPolicy::LoopAlways => true,
            LoopPolicy::LoopNever => false,
            LoopPolicy::LoopAfterFirst => completed_plays > 0,
        }
    }
}
