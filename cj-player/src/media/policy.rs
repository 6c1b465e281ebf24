//! Track selection policies

use cj_common::config::PolicyConfig;
use std::time::Duration;

/// Decides which track should be active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPolicy {
    /// Track 1 on the final slide, track 0 everywhere else
    SlidePosition,
    /// Track 0 until it has played for `threshold`, then track 1 for good
    TimeBoxed { threshold: Duration },
}

impl From<PolicyConfig> for TrackPolicy {
    fn from(config: PolicyConfig) -> Self {
        match config {
            PolicyConfig::SlidePosition => TrackPolicy::SlidePosition,
            PolicyConfig::TimeBoxed { threshold_secs } => TrackPolicy::TimeBoxed {
                threshold: Duration::from_secs_f64(threshold_secs),
            },
        }
    }
}

impl TrackPolicy {
    /// Track demanded by a slide index, or None when the index is irrelevant
    pub fn track_for_slide(&self, slide_index: usize, slide_count: usize) -> Option<usize> {
        match self {
            TrackPolicy::SlidePosition => {
                Some(if slide_index + 1 == slide_count { 1 } else { 0 })
            }
            TrackPolicy::TimeBoxed { .. } => None,
        }
    }

    /// Track to load when the session starts
    pub fn initial_track(&self, slide_index: usize, slide_count: usize) -> usize {
        self.track_for_slide(slide_index, slide_count).unwrap_or(0)
    }

    /// Whether playback time on the active track calls for the one-time
    /// hand-over to track 1
    pub fn handover_due(&self, active_track: usize, position: Duration, handed_over: bool) -> bool {
        match self {
            TrackPolicy::SlidePosition => false,
            TrackPolicy::TimeBoxed { threshold } => {
                !handed_over && active_track == 0 && position >= *threshold
            }
        }
    }
}

impl std::fmt::Display for TrackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackPolicy::SlidePosition => write!(f, "slide position"),
            TrackPolicy::TimeBoxed { threshold } => {
                write!(f, "time boxed ({}s)", threshold.as_secs_f64())
            }
        }
    }
}
