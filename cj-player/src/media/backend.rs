//! Playback backend seam
//!
//! A backend wraps exactly one audio output handle. Commands are issued
//! synchronously; their outcomes come back later as [`MediaSignal`]s on the
//! session's signal channel, in the order the backend observed them.

use cj_common::Track;
use std::time::Duration;
use tokio::sync::mpsc;

/// Identifies one source assignment
///
/// Every `load` gets a fresh token. Signals carrying an older token describe
/// a source that has since been replaced and are dropped by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceToken(pub u64);

impl SourceToken {
    pub fn next(self) -> Self {
        SourceToken(self.0 + 1)
    }
}

impl std::fmt::Display for SourceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Asynchronous media lifecycle notifications
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSignal {
    /// Source accepted and ready to play
    SourceReady { token: SourceToken },
    /// Source could not be fetched or decoded
    SourceFailed { token: SourceToken, reason: String },
    /// A play command succeeded
    PlayStarted { token: SourceToken },
    /// A play command was refused (autoplay policy)
    PlayRejected { token: SourceToken, reason: String },
    /// Periodic playback position
    Progress { token: SourceToken, position: Duration },
    /// Reached the end of a non-looping source
    Ended { token: SourceToken },
    /// Fallback sequencing timer fired after a source swap
    ResumeDue { token: SourceToken },
}

impl MediaSignal {
    pub fn token(&self) -> SourceToken {
        match self {
            MediaSignal::SourceReady { token }
            | MediaSignal::SourceFailed { token, .. }
            | MediaSignal::PlayStarted { token }
            | MediaSignal::PlayRejected { token, .. }
            | MediaSignal::Progress { token, .. }
            | MediaSignal::Ended { token }
            | MediaSignal::ResumeDue { token } => *token,
        }
    }
}

/// Sender half handed to backends and timers
pub type SignalSender = mpsc::UnboundedSender<MediaSignal>;

/// Receiver half drained by the session loop
pub type SignalReceiver = mpsc::UnboundedReceiver<MediaSignal>;

/// Create a signal channel
pub fn signal_channel() -> (SignalSender, SignalReceiver) {
    mpsc::unbounded_channel()
}

/// Audio output controlled by the media sync controller
pub trait MediaBackend {
    fn set_volume(&mut self, volume: f32);

    /// Replace the current source; stops whatever was playing
    fn load(&mut self, track: &Track, token: SourceToken, looping: bool);

    /// Start the source loaded under `token`
    ///
    /// Answers with `PlayStarted` or `PlayRejected`; with no usable source
    /// loaded it answers `SourceFailed` instead.
    fn play(&mut self, token: SourceToken);

    fn pause(&mut self);

    /// Whether this backend emits [`MediaSignal::SourceReady`] after `load`
    ///
    /// Backends that cannot tell are sequenced with a fixed delay instead.
    fn reports_readiness(&self) -> bool {
        false
    }
}
