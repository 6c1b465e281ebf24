//! Test helpers for cj-player integration tests
//!
//! - `RecordingBackend`: media backend that logs every command and answers
//!   with configurable signals
//! - `Harness`: a session wired to a recording backend, with helpers to
//!   drain signals and collect bus events

#![allow(dead_code)]

use cj_common::config::{JournalConfig, PolicyConfig};
use cj_common::events::{EventBus, JournalEvent};
use cj_common::Track;
use cj_player::media::{signal_channel, MediaBackend, MediaSignal, SignalReceiver, SignalSender, SourceToken};
use cj_player::{Session, UserInput};
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

/// One command issued to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetVolume(f32),
    Load {
        title: String,
        token: SourceToken,
        looping: bool,
    },
    Play(SourceToken),
    Pause,
}

/// Shared backend state, inspected and tweaked by tests
#[derive(Debug, Default)]
pub struct Recorded {
    pub commands: Vec<Command>,
    /// Number of upcoming play commands to refuse
    pub reject_plays: u32,
    /// Sources that fail to load
    pub failing_sources: Vec<String>,
    /// Answer play commands with `PlayStarted`
    pub confirm_plays: bool,
}

pub struct RecordingBackend {
    tx: SignalSender,
    readiness: bool,
    shared: Arc<Mutex<Recorded>>,
}

impl RecordingBackend {
    pub fn new(tx: SignalSender, readiness: bool, shared: Arc<Mutex<Recorded>>) -> Self {
        Self { tx, readiness, shared }
    }
}

impl MediaBackend for RecordingBackend {
    fn set_volume(&mut self, volume: f32) {
        self.shared.lock().unwrap().commands.push(Command::SetVolume(volume));
    }

    fn load(&mut self, track: &Track, token: SourceToken, looping: bool) {
        let mut shared = self.shared.lock().unwrap();
        shared.commands.push(Command::Load {
            title: track.title.clone(),
            token,
            looping,
        });
        if shared.failing_sources.contains(&track.source) {
            let _ = self.tx.send(MediaSignal::SourceFailed {
                token,
                reason: "404 Not Found".to_string(),
            });
        } else if self.readiness {
            let _ = self.tx.send(MediaSignal::SourceReady { token });
        }
    }

    fn play(&mut self, token: SourceToken) {
        let mut shared = self.shared.lock().unwrap();
        shared.commands.push(Command::Play(token));
        if shared.reject_plays > 0 {
            shared.reject_plays -= 1;
            let _ = self.tx.send(MediaSignal::PlayRejected {
                token,
                reason: "NotAllowedError".to_string(),
            });
        } else if shared.confirm_plays {
            let _ = self.tx.send(MediaSignal::PlayStarted { token });
        }
    }

    fn pause(&mut self) {
        self.shared.lock().unwrap().commands.push(Command::Pause);
    }

    fn reports_readiness(&self) -> bool {
        self.readiness
    }
}

/// Backend behaviour for a harness
#[derive(Debug, Clone)]
pub struct BackendOptions {
    pub readiness: bool,
    pub confirm_plays: bool,
    pub reject_plays: u32,
    pub failing_sources: Vec<String>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            readiness: true,
            confirm_plays: true,
            reject_plays: 0,
            failing_sources: Vec::new(),
        }
    }
}

pub struct Harness {
    pub session: Session<RecordingBackend>,
    pub signals: SignalReceiver,
    pub sender: SignalSender,
    pub shared: Arc<Mutex<Recorded>>,
    pub events: broadcast::Receiver<JournalEvent>,
    pub switch_delay: Duration,
}

impl Harness {
    pub fn new(config: JournalConfig, options: BackendOptions) -> Self {
        let shared = Arc::new(Mutex::new(Recorded {
            reject_plays: options.reject_plays,
            failing_sources: options.failing_sources,
            confirm_plays: options.confirm_plays,
            ..Recorded::default()
        }));
        let (tx, signals) = signal_channel();
        let backend = RecordingBackend::new(tx.clone(), options.readiness, shared.clone());
        let bus = EventBus::new(256);
        let events = bus.subscribe();
        let switch_delay = config.playback.switch_delay();
        let session = Session::new(&config, backend, tx.clone(), bus).unwrap();

        Self {
            session,
            signals,
            sender: tx,
            shared,
            events,
            switch_delay,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(journal_config(7, PolicyConfig::SlidePosition), BackendOptions::default())
    }

    pub fn input(&mut self, input: UserInput) -> ControlFlow<()> {
        self.session.handle_input(input).unwrap()
    }

    /// Apply an input, then deliver every signal it produced
    pub fn act(&mut self, input: UserInput) {
        self.input(input);
        self.pump();
    }

    /// Deliver queued signals until the channel is empty
    pub fn pump(&mut self) {
        while let Ok(signal) = self.signals.try_recv() {
            self.session.handle_signal(signal);
        }
    }

    /// Deliver one signal as if the backend had sent it, then pump
    pub fn deliver(&mut self, signal: MediaSignal) {
        self.session.handle_signal(signal);
        self.pump();
    }

    /// Let the fallback switch delay elapse (paused clock), then pump
    pub async fn settle(&mut self) {
        tokio::time::sleep(self.switch_delay + Duration::from_millis(1)).await;
        self.pump();
    }

    pub fn token(&self) -> SourceToken {
        self.session.media().current_token()
    }

    pub fn active_track(&self) -> usize {
        self.session.media().state().map(|s| s.active_track).unwrap()
    }

    pub fn is_playing(&self) -> bool {
        self.session.media().is_playing()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.shared.lock().unwrap().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.shared.lock().unwrap().commands.clear();
    }

    pub fn plays(&self) -> Vec<SourceToken> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Play(token) => Some(token),
                _ => None,
            })
            .collect()
    }

    pub fn loads(&self) -> Vec<(String, SourceToken, bool)> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Load { title, token, looping } => Some((title, token, looping)),
                _ => None,
            })
            .collect()
    }

    /// Events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<JournalEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Default journal config with `slide_count` slides and the given policy
pub fn journal_config(slide_count: usize, policy: PolicyConfig) -> JournalConfig {
    let mut config = JournalConfig::default();
    let template = config.slides[0].clone();
    config.slides = (0..slide_count)
        .map(|i| {
            let mut slide = template.clone();
            slide.content.title = format!("Slide {}", i + 1);
            slide
        })
        .collect();
    config.playback.policy = policy;
    config
}

pub fn track_titles(config: &JournalConfig) -> Vec<String> {
    config.tracks.iter().map(|t| t.title.clone()).collect()
}
