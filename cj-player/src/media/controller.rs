//! Media sync controller
//!
//! Keeps the active track consistent with the navigation index (or, for the
//! time-boxed policy, with playback time on the first track) and tracks
//! whether audio is confirmed to be playing.
//!
//! Sequencing rules:
//! - Every source assignment gets a fresh [`SourceToken`]; signals for older
//!   tokens are dropped, so a superseded resume can never restart a track the
//!   user has navigated away from.
//! - A play command after a source swap is only issued once the source has
//!   settled: on `SourceReady` for backends that report readiness, otherwise
//!   after the configured switch delay.
//! - `is_playing` only becomes true on a confirmed `PlayStarted`.

use super::backend::{MediaBackend, MediaSignal, SignalSender, SourceToken};
use super::policy::TrackPolicy;
use crate::error::{Error, Result};
use cj_common::config::PlaybackConfig;
use cj_common::events::{
    EventBus, JournalEvent, PlaybackFailure, PlaybackState, TrackChangeTrigger,
};
use cj_common::{LoopPolicy, Track};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Audio-side state, created when the session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaState {
    pub active_track: usize,
    pub is_playing: bool,
}

/// Whether a track switch should resume playback afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    IfPlaying,
    Always,
}

pub struct MediaSyncController<B> {
    tracks: Vec<Track>,
    policy: TrackPolicy,
    backend: B,
    volume: f32,
    switch_delay: Duration,
    signals: SignalSender,
    bus: EventBus,

    state: Option<MediaState>,
    token: SourceToken,
    /// A play command for `token` has been issued and not yet answered
    play_pending: bool,
    /// Waiting for the current source to settle before issuing play
    resume_pending: bool,
    resume_timer: Option<JoinHandle<()>>,
    /// Completed plays per track, for `LoopAfterFirst`
    completed_plays: Vec<u32>,
    /// Time-boxed hand-over to track 1 has happened
    handed_over: bool,
    /// The current source failed to load; play must reload it first
    source_failed: bool,
}

impl<B: MediaBackend> MediaSyncController<B> {
    pub fn new(
        tracks: Vec<Track>,
        policy: TrackPolicy,
        settings: &PlaybackConfig,
        backend: B,
        signals: SignalSender,
        bus: EventBus,
    ) -> Result<Self> {
        if tracks.is_empty() {
            return Err(Error::InvalidState("no tracks configured".to_string()));
        }
        let completed_plays = vec![0; tracks.len()];
        Ok(Self {
            tracks,
            policy,
            backend,
            volume: settings.volume.clamp(0.0, 1.0),
            switch_delay: settings.switch_delay(),
            signals,
            bus,
            state: None,
            token: SourceToken::default(),
            play_pending: false,
            resume_pending: false,
            resume_timer: None,
            completed_plays,
            handed_over: false,
            source_failed: false,
        })
    }

    /// None until the session has started
    pub fn state(&self) -> Option<MediaState> {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.map(|s| s.is_playing).unwrap_or(false)
    }

    pub fn active_track(&self) -> Option<&Track> {
        self.state.map(|s| &self.tracks[s.active_track])
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn policy(&self) -> TrackPolicy {
        self.policy
    }

    /// Token of the source currently assigned to the backend
    pub fn current_token(&self) -> SourceToken {
        self.token
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Activate audio after the user opened the journal
    ///
    /// Sets the attenuated start volume, loads the track the policy picks for
    /// the current slide and attempts playback once the source has settled.
    pub fn on_start(&mut self, slide_index: usize, slide_count: usize) {
        if self.state.is_some() {
            debug!("Media already active; start ignored");
            return;
        }

        let track = self
            .policy
            .initial_track(slide_index, slide_count)
            .min(self.tracks.len() - 1);

        self.backend.set_volume(self.volume);
        self.state = Some(MediaState {
            active_track: track,
            is_playing: false,
        });
        info!(
            "Media activated: track {} '{}' at volume {:.2} ({} policy)",
            track, self.tracks[track].title, self.volume, self.policy
        );

        self.load_source(track);
        self.schedule_resume();
    }

    /// Pause if playing, otherwise attempt to play
    pub fn toggle_play(&mut self) {
        let Some(state) = self.state else {
            debug!("Toggle ignored: media not active yet");
            return;
        };

        if state.is_playing || self.play_pending || self.resume_pending {
            self.cancel_resume();
            self.play_pending = false;
            self.backend.pause();
            self.set_playing(false);
            info!("Playback paused by user");
        } else if self.source_failed {
            info!(
                "Playback requested by user; reloading '{}' after source error",
                self.tracks[state.active_track].title
            );
            self.load_source(state.active_track);
            self.schedule_resume();
        } else {
            info!("Playback requested by user");
            self.request_play();
        }
    }

    /// Switch to `target`, resuming playback only if audio was playing
    ///
    /// Returns false when nothing changed.
    pub fn switch_track(&mut self, target: usize, trigger: TrackChangeTrigger) -> bool {
        self.switch_to(target, trigger, Resume::IfPlaying)
    }

    /// Move to the next track in rotation and play it
    pub fn skip_track(&mut self) -> bool {
        let Some(state) = self.state else {
            debug!("Skip ignored: media not active yet");
            return false;
        };
        let next = (state.active_track + 1) % self.tracks.len();
        if matches!(self.policy, TrackPolicy::TimeBoxed { .. }) && next == 1 {
            self.handed_over = true;
        }
        self.switch_to(next, TrackChangeTrigger::UserSkip, Resume::Always)
    }

    /// Re-derive the track after a navigation change
    pub fn on_slide_changed(&mut self, slide_index: usize, slide_count: usize) {
        if self.state.is_none() {
            return;
        }
        if let Some(target) = self.policy.track_for_slide(slide_index, slide_count) {
            self.switch_to(target, TrackChangeTrigger::Navigation, Resume::IfPlaying);
        }
    }

    /// Apply one backend or timer signal
    pub fn handle_signal(&mut self, signal: MediaSignal) {
        if self.state.is_none() {
            debug!("Ignoring {:?}: media not active", signal);
            return;
        }
        if signal.token() != self.token {
            debug!("Dropping stale signal {:?} (current source {})", signal, self.token);
            return;
        }

        match signal {
            MediaSignal::SourceReady { token } => {
                if self.resume_pending && self.backend.reports_readiness() {
                    self.resume_pending = false;
                    self.request_play();
                } else {
                    debug!("Source {} ready", token);
                }
            }
            MediaSignal::ResumeDue { .. } => {
                self.resume_timer = None;
                if self.resume_pending {
                    self.resume_pending = false;
                    self.request_play();
                }
            }
            MediaSignal::SourceFailed { reason, .. } => self.on_source_failed(reason),
            MediaSignal::PlayStarted { .. } => {
                if self.play_pending {
                    self.play_pending = false;
                    self.set_playing(true);
                } else {
                    // User paused while the play command was in flight
                    debug!("Late play confirmation after pause; pausing again");
                    self.backend.pause();
                }
            }
            MediaSignal::PlayRejected { reason, .. } => {
                if !self.play_pending {
                    debug!("Late play rejection ignored: {}", reason);
                    return;
                }
                self.play_pending = false;
                info!(
                    "Play refused ({}): {}; waiting for user interaction",
                    PlaybackFailure::AutoplayRejected,
                    reason
                );
                self.set_playing(false);
                self.emit_failure(PlaybackFailure::AutoplayRejected, reason);
            }
            MediaSignal::Progress { position, .. } => self.on_progress(position),
            MediaSignal::Ended { .. } => self.on_track_ended(),
        }
    }

    /// The active track played to its end
    pub fn on_track_ended(&mut self) {
        let Some(state) = self.state else {
            return;
        };
        let active = state.active_track;
        let first_play = self.completed_plays[active] == 0;
        self.completed_plays[active] += 1;
        self.play_pending = false;

        let loop_policy = self.tracks[active].loop_policy;
        match loop_policy {
            LoopPolicy::LoopAlways => {
                debug!("Ended signal for natively looping track {}; ignoring", active);
            }
            LoopPolicy::LoopAfterFirst if !first_play => {
                debug!("Ended signal for track {} after its first play; ignoring", active);
            }
            LoopPolicy::LoopNever | LoopPolicy::LoopAfterFirst => {
                let mut next = (active + 1) % self.tracks.len();
                if matches!(self.policy, TrackPolicy::TimeBoxed { .. }) {
                    if next == 1 {
                        self.handed_over = true;
                    } else if self.handed_over && next == 0 {
                        // Never fall back to the opening track on our own
                        next = active;
                    }
                }

                info!(
                    "Track {} '{}' ended, continuing with track {}",
                    active, self.tracks[active].title, next
                );

                if next == active {
                    self.load_source(active);
                    self.schedule_resume();
                } else {
                    self.switch_to(next, TrackChangeTrigger::TrackEnded, Resume::Always);
                }
            }
        }
    }

    fn on_progress(&mut self, position: Duration) {
        let Some(state) = self.state else {
            return;
        };
        if self
            .policy
            .handover_due(state.active_track, position, self.handed_over)
        {
            self.handed_over = true;
            info!(
                "Opening track played for {:.1}s, handing over to track 1",
                position.as_secs_f64()
            );
            self.switch_to(1, TrackChangeTrigger::TimeThreshold, Resume::IfPlaying);
        }
    }

    fn on_source_failed(&mut self, reason: String) {
        self.cancel_resume();
        self.play_pending = false;
        self.source_failed = true;
        warn!(
            "Source {} failed ({}): {}; playback stays paused",
            self.token,
            PlaybackFailure::MediaSource,
            reason
        );
        self.set_playing(false);
        self.emit_failure(PlaybackFailure::MediaSource, reason);
    }

    fn switch_to(&mut self, target: usize, trigger: TrackChangeTrigger, resume: Resume) -> bool {
        let Some(state) = self.state else {
            debug!("Track switch ignored: media not active yet");
            return false;
        };
        if target == state.active_track {
            debug!("Track {} already active", target);
            return false;
        }
        if target >= self.tracks.len() {
            warn!(
                "Track {} requested but only {} configured",
                target,
                self.tracks.len()
            );
            return false;
        }

        let was_playing = state.is_playing || self.play_pending || self.resume_pending;
        let old_track = state.active_track;

        if let Some(state) = self.state.as_mut() {
            state.active_track = target;
        }
        self.load_source(target);
        self.set_playing(false);

        info!(
            "Track {} -> {} '{}' ({:?})",
            old_track, target, self.tracks[target].title, trigger
        );
        self.bus.emit_lossy(JournalEvent::TrackChanged {
            old_track,
            new_track: target,
            title: self.tracks[target].title.clone(),
            trigger,
            timestamp: chrono::Utc::now(),
        });

        if was_playing || resume == Resume::Always {
            self.schedule_resume();
        }
        true
    }

    /// Assign the track to the backend under a fresh token
    fn load_source(&mut self, index: usize) {
        self.cancel_resume();
        self.play_pending = false;
        self.source_failed = false;
        self.token = self.token.next();

        let track = &self.tracks[index];
        let looping = track.loops_natively(self.completed_plays[index]);
        debug!(
            "Loading source {} for track {} ({}, looping: {})",
            self.token, index, track.source, looping
        );
        self.backend.load(track, self.token, looping);
    }

    /// Issue play for the current source once it has settled
    fn schedule_resume(&mut self) {
        self.resume_pending = true;
        if self.backend.reports_readiness() {
            debug!("Waiting for source {} to report ready", self.token);
            return;
        }

        let token = self.token;
        let delay = self.switch_delay;
        let tx = self.signals.clone();
        debug!("Resume of source {} scheduled in {:?}", token, delay);
        self.resume_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(MediaSignal::ResumeDue { token });
        }));
    }

    fn cancel_resume(&mut self) {
        self.resume_pending = false;
        if let Some(timer) = self.resume_timer.take() {
            timer.abort();
        }
    }

    fn request_play(&mut self) {
        if self.play_pending {
            debug!("Play for source {} already in flight", self.token);
            return;
        }
        self.play_pending = true;
        self.backend.play(self.token);
    }

    fn set_playing(&mut self, playing: bool) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.is_playing == playing {
            return;
        }
        state.is_playing = playing;

        let old_state = PlaybackState::from_playing(!playing);
        let new_state = PlaybackState::from_playing(playing);
        info!("Playback state changed: {} -> {}", old_state, new_state);
        self.bus.emit_lossy(JournalEvent::PlaybackStateChanged {
            old_state,
            new_state,
            timestamp: chrono::Utc::now(),
        });
    }

    fn emit_failure(&self, failure: PlaybackFailure, reason: String) {
        let track = self.state.map(|s| s.active_track).unwrap_or(0);
        self.bus.emit_lossy(JournalEvent::PlaybackFailed {
            track,
            failure,
            reason,
            timestamp: chrono::Utc::now(),
        });
    }
}

impl<B> Drop for MediaSyncController<B> {
    fn drop(&mut self) {
        if let Some(timer) = self.resume_timer.take() {
            timer.abort();
        }
    }
}
