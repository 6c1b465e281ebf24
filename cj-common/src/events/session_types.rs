//! Supporting types for session events

use serde::{Deserialize, Serialize};

/// Audible playback state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn from_playing(is_playing: bool) -> Self {
        if is_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Why playback could not start or continue
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackFailure {
    /// Platform refused to play without a fresh user gesture
    AutoplayRejected,
    /// The audio asset could not be fetched or decoded
    MediaSource,
}

impl std::fmt::Display for PlaybackFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackFailure::AutoplayRejected => write!(f, "autoplay rejected"),
            PlaybackFailure::MediaSource => write!(f, "media source error"),
        }
    }
}

/// Why the active track changed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackChangeTrigger {
    /// Derived from the slide index
    Navigation,
    /// Playback time on the first track reached the hand-over threshold
    TimeThreshold,
    /// Previous track ended and does not loop
    TrackEnded,
    /// Explicit skip by the user
    UserSkip,
}

/// Snapshot for the status display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub slide_index: usize,
    pub slide_count: usize,
    pub started: bool,
    pub is_playing: bool,
    /// None until the media side has been activated
    pub track_title: Option<String>,
}
