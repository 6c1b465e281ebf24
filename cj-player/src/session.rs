//! Journal session: the single event loop tying navigation to media
//!
//! All mutation happens here, one input or signal at a time:
//! user input → `NavigationController` → `SlideChange` →
//! `MediaSyncController::on_slide_changed`, and backend/timer signals →
//! `MediaSyncController::handle_signal`.

use crate::error::{Error, Result};
use crate::input::UserInput;
use crate::media::{MediaBackend, MediaSignal, MediaSyncController, SignalReceiver, SignalSender, TrackPolicy};
use crate::navigation::{NavigationController, SlideChange};
use cj_common::config::JournalConfig;
use cj_common::events::{EventBus, JournalEvent, SessionStatus};
use std::future::Future;
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub struct Session<B> {
    id: Uuid,
    navigation: NavigationController,
    media: MediaSyncController<B>,
    bus: EventBus,
    /// Last status published on the bus
    reported: SessionStatus,
}

impl<B: MediaBackend> Session<B> {
    /// Build a session from validated configuration
    ///
    /// `signals` must be the sender half of the channel later passed to
    /// [`Session::run`]; the backend should hold a clone of it too.
    pub fn new(
        config: &JournalConfig,
        backend: B,
        signals: SignalSender,
        bus: EventBus,
    ) -> Result<Self> {
        config.validate()?;

        let navigation = NavigationController::new(config.slide_deck())?;
        let media = MediaSyncController::new(
            config.tracks.clone(),
            TrackPolicy::from(config.playback.policy),
            &config.playback,
            backend,
            signals,
            bus.clone(),
        )?;

        let reported = status_of(&navigation, &media);
        Ok(Self {
            id: Uuid::new_v4(),
            navigation,
            media,
            bus,
            reported,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn media(&self) -> &MediaSyncController<B> {
        &self.media
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn status(&self) -> SessionStatus {
        status_of(&self.navigation, &self.media)
    }

    /// Apply one user action
    ///
    /// Navigation and playback controls are ignored until the journal has
    /// been opened. An out-of-range jump is a contract violation: debug
    /// builds return the error, release builds clamp to the last slide.
    /// A change of track or play state is followed by a `StatusUpdated`
    /// event; `ShowStatus` publishes one unconditionally.
    pub fn handle_input(&mut self, input: UserInput) -> Result<ControlFlow<()>> {
        match input {
            UserInput::Quit => {
                info!("Quit requested");
                return Ok(ControlFlow::Break(()));
            }
            UserInput::ShowStatus => {
                self.publish_status(true);
                return Ok(ControlFlow::Continue(()));
            }
            _ => {}
        }

        self.apply_input(input)?;
        self.publish_status(false);
        Ok(ControlFlow::Continue(()))
    }

    fn apply_input(&mut self, input: UserInput) -> Result<()> {
        if input == UserInput::Start {
            self.start();
            return Ok(());
        }

        if !self.navigation.is_started() {
            debug!("{:?} ignored: journal not opened yet", input);
            return Ok(());
        }

        match input {
            UserInput::Advance => {
                let change = self.navigation.advance();
                self.apply_slide_change(change);
            }
            UserInput::Retreat => {
                let change = self.navigation.retreat();
                self.apply_slide_change(change);
            }
            UserInput::JumpTo(index) => {
                let change = match self.navigation.jump_to(index) {
                    Ok(change) => change,
                    Err(err @ Error::InvalidIndex { .. }) => {
                        let target = invalid_jump_target(
                            err,
                            self.navigation.slide_count(),
                            cfg!(debug_assertions),
                        )?;
                        self.navigation.jump_to(target)?
                    }
                    Err(err) => return Err(err),
                };
                self.apply_slide_change(change);
            }
            UserInput::TogglePlay => self.media.toggle_play(),
            UserInput::SkipTrack => {
                self.media.skip_track();
            }
            UserInput::Start | UserInput::ShowStatus | UserInput::Quit => {}
        }

        Ok(())
    }

    /// Apply one backend or timer signal
    pub fn handle_signal(&mut self, signal: MediaSignal) {
        self.media.handle_signal(signal);
        self.publish_status(false);
    }

    /// Emit `StatusUpdated` when the music side changed, or always if forced
    ///
    /// Page moves alone are not reported; the rendered page already shows
    /// its number.
    fn publish_status(&mut self, force: bool) {
        let status = self.status();
        let music_changed = status.is_playing != self.reported.is_playing
            || status.track_title != self.reported.track_title;
        if !force && !music_changed {
            return;
        }
        debug!("Status: {:?}", status);
        self.bus.emit_lossy(JournalEvent::StatusUpdated {
            status: status.clone(),
            timestamp: chrono::Utc::now(),
        });
        self.reported = status;
    }

    fn start(&mut self) {
        if !self.navigation.start() {
            return;
        }
        self.bus.emit_lossy(JournalEvent::SessionStarted {
            session_id: self.id,
            slide_count: self.navigation.slide_count(),
            timestamp: chrono::Utc::now(),
        });
        self.media
            .on_start(self.navigation.current_index(), self.navigation.slide_count());
    }

    fn apply_slide_change(&mut self, change: Option<SlideChange>) {
        let Some(change) = change else {
            return;
        };
        self.bus.emit_lossy(JournalEvent::SlideChanged {
            old_index: change.old_index,
            new_index: change.new_index,
            timestamp: chrono::Utc::now(),
        });
        self.media
            .on_slide_changed(change.new_index, self.navigation.slide_count());
    }

    /// Run the session loop until quit, input EOF or `shutdown` resolves
    pub async fn run<F>(
        mut self,
        mut inputs: mpsc::Receiver<UserInput>,
        mut signals: SignalReceiver,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Session {} running", self.id);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                input = inputs.recv() => {
                    let Some(input) = input else {
                        debug!("Input channel closed");
                        break;
                    };
                    if self.handle_input(input)?.is_break() {
                        break;
                    }
                }
                Some(signal) = signals.recv() => self.handle_signal(signal),
            }
        }

        info!("Session {} finished on slide {}", self.id, self.navigation.current_index() + 1);
        Ok(())
    }
}

fn status_of<B: MediaBackend>(
    navigation: &NavigationController,
    media: &MediaSyncController<B>,
) -> SessionStatus {
    SessionStatus {
        slide_index: navigation.current_index(),
        slide_count: navigation.slide_count(),
        started: navigation.is_started(),
        is_playing: media.is_playing(),
        track_title: media.active_track().map(|t| t.title.clone()),
    }
}

/// Where an out-of-range jump lands
///
/// `strict` surfaces the error unchanged; otherwise the jump clamps to the
/// last slide.
fn invalid_jump_target(err: Error, slide_count: usize, strict: bool) -> Result<usize> {
    if strict {
        error!("{}", err);
        return Err(err);
    }
    let last = slide_count.saturating_sub(1);
    warn!("{}; clamping to slide {}", err, last);
    Ok(last)
}
