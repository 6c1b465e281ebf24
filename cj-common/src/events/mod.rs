//! Event types for the journal session
//!
//! Provides the session event definitions and the EventBus that carries them
//! to the renderer, the status display and any other observer.

mod session_types;

pub use session_types::{PlaybackFailure, PlaybackState, SessionStatus, TrackChangeTrigger};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Journal session events
///
/// Serialized with a `type` tag so external observers can filter on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JournalEvent {
    /// The cover was dismissed and the journal opened
    SessionStarted {
        session_id: Uuid,
        slide_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Current slide changed
    SlideChanged {
        old_index: usize,
        new_index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Active track changed
    TrackChanged {
        old_track: usize,
        new_track: usize,
        title: String,
        trigger: TrackChangeTrigger,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Confirmed playing ↔ paused transition
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback attempt failed; the session keeps going silently
    PlaybackFailed {
        track: usize,
        failure: PlaybackFailure,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Status line changed, or the user asked for it
    StatusUpdated {
        status: SessionStatus,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl JournalEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            JournalEvent::SessionStarted { .. } => "SessionStarted",
            JournalEvent::SlideChanged { .. } => "SlideChanged",
            JournalEvent::TrackChanged { .. } => "TrackChanged",
            JournalEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            JournalEvent::PlaybackFailed { .. } => "PlaybackFailed",
            JournalEvent::StatusUpdated { .. } => "StatusUpdated",
        }
    }
}

/// One-to-many session event broadcaster
///
/// Thin wrapper over `tokio::sync::broadcast`. Slow subscribers lose the
/// oldest events once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JournalEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<JournalEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: JournalEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
