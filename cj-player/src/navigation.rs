//! Slide navigation
//!
//! `NavigationController` is the only owner of the current slide index and
//! the started flag. Every index change is returned to the caller as a
//! [`SlideChange`] and published on a watch channel for read-only observers
//! such as the input reader and the renderer.

use crate::error::{Error, Result};
use cj_common::SlideDescriptor;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Navigation state as seen by observers
///
/// Invariant: `current_index < slide_count`; `started` never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub current_index: usize,
    pub started: bool,
}

/// Index transition produced by a navigation operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideChange {
    pub old_index: usize,
    pub new_index: usize,
}

pub struct NavigationController {
    slides: Arc<[SlideDescriptor]>,
    state: NavigationState,
    watch_tx: watch::Sender<NavigationState>,
}

impl NavigationController {
    /// Create a controller at `(0, not started)`
    pub fn new(slides: Vec<SlideDescriptor>) -> Result<Self> {
        if slides.is_empty() {
            return Err(Error::InvalidState("slide deck is empty".to_string()));
        }
        let state = NavigationState::default();
        let (watch_tx, _) = watch::channel(state);
        Ok(Self {
            slides: slides.into(),
            state,
            watch_tx,
        })
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn is_started(&self) -> bool {
        self.state.started
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> Arc<[SlideDescriptor]> {
        Arc::clone(&self.slides)
    }

    pub fn current_slide(&self) -> &SlideDescriptor {
        &self.slides[self.state.current_index]
    }

    pub fn is_last(&self) -> bool {
        self.state.current_index == self.slides.len() - 1
    }

    /// Read-only view of the navigation state for observers
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.watch_tx.subscribe()
    }

    /// Open the journal
    ///
    /// Returns true on the one and only false→true transition.
    pub fn start(&mut self) -> bool {
        if self.state.started {
            debug!("start() ignored: session already started");
            return false;
        }
        self.state.started = true;
        self.publish();
        info!("Journal opened ({} slides)", self.slides.len());
        true
    }

    /// Move forward one slide, clamping silently at the last slide
    pub fn advance(&mut self) -> Option<SlideChange> {
        let target = (self.state.current_index + 1).min(self.slides.len() - 1);
        self.set_index(target)
    }

    /// Move back one slide, clamping silently at the first slide
    pub fn retreat(&mut self) -> Option<SlideChange> {
        let target = self.state.current_index.saturating_sub(1);
        self.set_index(target)
    }

    /// Jump straight to `index`
    ///
    /// Out-of-range targets fail with [`Error::InvalidIndex`] and leave the
    /// index untouched.
    pub fn jump_to(&mut self, index: usize) -> Result<Option<SlideChange>> {
        if index >= self.slides.len() {
            return Err(Error::InvalidIndex {
                index,
                slide_count: self.slides.len(),
            });
        }
        Ok(self.set_index(index))
    }

    fn set_index(&mut self, new_index: usize) -> Option<SlideChange> {
        let old_index = self.state.current_index;
        if new_index == old_index {
            debug!("Slide index unchanged at {}", old_index);
            return None;
        }
        self.state.current_index = new_index;
        self.publish();
        debug!("Slide {} -> {}", old_index, new_index);
        Some(SlideChange {
            old_index,
            new_index,
        })
    }

    fn publish(&self) {
        self.watch_tx.send_replace(self.state);
    }
}
