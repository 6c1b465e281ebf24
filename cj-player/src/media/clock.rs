//! Simulated media element
//!
//! `ClockBackend` stands in for a real audio element: it accepts sources,
//! runs a playback clock on tokio timers while "playing", reports progress
//! ticks, honours native looping and known track durations, and can be told
//! to refuse the first play command the way browsers refuse autoplay.
//!
//! It reports readiness explicitly, so the controller never needs the
//! fixed-delay fallback with it.

use super::backend::{MediaBackend, MediaSignal, SignalSender, SourceToken};
use cj_common::Track;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

const SUPPORTED_SCHEMES: [&str; 3] = ["https://", "http://", "file://"];

/// Behaviour knobs for the simulated element
#[derive(Debug, Clone)]
pub struct ClockOptions {
    /// Interval between progress ticks
    pub tick: Duration,
    /// Refuse the very first play command (autoplay policy)
    pub reject_first_play: bool,
}

impl Default for ClockOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            reject_first_play: false,
        }
    }
}

#[derive(Debug, Clone)]
struct LoadedSource {
    token: SourceToken,
    duration: Option<Duration>,
    looping: bool,
}

pub struct ClockBackend {
    signals: SignalSender,
    options: ClockOptions,
    volume: f32,
    source: Option<LoadedSource>,
    /// Position accumulated by earlier runs of the current source
    offset: Duration,
    run_started: Option<Instant>,
    ticker: Option<JoinHandle<()>>,
    plays_attempted: u32,
}

impl ClockBackend {
    pub fn new(signals: SignalSender, options: ClockOptions) -> Self {
        Self {
            signals,
            options,
            volume: 1.0,
            source: None,
            offset: Duration::ZERO,
            run_started: None,
            ticker: None,
            plays_attempted: 0,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_running(&self) -> bool {
        self.run_started.is_some()
    }

    /// Playback position of the current source
    pub fn position(&self) -> Duration {
        let elapsed = self.offset + self.run_started.map(|s| s.elapsed()).unwrap_or_default();
        match &self.source {
            Some(LoadedSource {
                duration: Some(d),
                looping: true,
                ..
            }) => wrap(elapsed, *d),
            Some(LoadedSource {
                duration: Some(d), ..
            }) => elapsed.min(*d),
            _ => elapsed,
        }
    }

    fn stop_clock(&mut self) {
        if let Some(started) = self.run_started.take() {
            self.offset += started.elapsed();
        }
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn send(&self, signal: MediaSignal) {
        if self.signals.send(signal).is_err() {
            debug!("Signal receiver gone; dropping media signal");
        }
    }
}

impl MediaBackend for ClockBackend {
    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn load(&mut self, track: &Track, token: SourceToken, looping: bool) {
        self.stop_clock();
        self.offset = Duration::ZERO;

        if !SUPPORTED_SCHEMES.iter().any(|s| track.source.starts_with(s)) {
            self.source = None;
            self.send(MediaSignal::SourceFailed {
                token,
                reason: format!("unsupported source URI '{}'", track.source),
            });
            return;
        }

        self.source = Some(LoadedSource {
            token,
            duration: track.duration(),
            looping,
        });
        self.send(MediaSignal::SourceReady { token });
    }

    fn play(&mut self, token: SourceToken) {
        self.plays_attempted += 1;

        let Some(source) = self.source.clone() else {
            self.send(MediaSignal::SourceFailed {
                token,
                reason: "no source loaded".to_string(),
            });
            return;
        };
        if source.token != token {
            self.send(MediaSignal::PlayRejected {
                token,
                reason: format!("source {} was replaced by {}", token, source.token),
            });
            return;
        }
        if self.options.reject_first_play && self.plays_attempted == 1 {
            self.send(MediaSignal::PlayRejected {
                token,
                reason: "NotAllowedError: play() needs a user gesture".to_string(),
            });
            return;
        }
        if self.run_started.is_some() {
            self.send(MediaSignal::PlayStarted { token });
            return;
        }

        let started = Instant::now();
        self.run_started = Some(started);
        self.send(MediaSignal::PlayStarted { token });
        self.ticker = Some(tokio::spawn(run_clock(
            self.signals.clone(),
            token,
            self.offset,
            started,
            source,
            self.options.tick,
        )));
    }

    fn pause(&mut self) {
        self.stop_clock();
    }

    fn reports_readiness(&self) -> bool {
        true
    }
}

impl Drop for ClockBackend {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

async fn run_clock(
    tx: SignalSender,
    token: SourceToken,
    offset: Duration,
    started: Instant,
    source: LoadedSource,
    tick: Duration,
) {
    let mut interval = tokio::time::interval(tick);
    // First tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        let elapsed = offset + started.elapsed();

        let position = match source.duration {
            Some(d) if source.looping => wrap(elapsed, d),
            Some(d) if elapsed >= d => {
                let _ = tx.send(MediaSignal::Ended { token });
                break;
            }
            _ => elapsed,
        };

        if tx.send(MediaSignal::Progress { token, position }).is_err() {
            break;
        }
    }
}

fn wrap(elapsed: Duration, length: Duration) -> Duration {
    let length_ns = length.as_nanos().max(1);
    Duration::from_nanos((elapsed.as_nanos() % length_ns) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::backend::signal_channel;
    use cj_common::LoopPolicy;

    fn track(source: &str, duration_secs: Option<f64>) -> Track {
        Track {
            title: "Test".to_string(),
            description: None,
            source: source.to_string(),
            loop_policy: LoopPolicy::LoopNever,
            duration_secs,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_play_and_tick() {
        let (tx, mut rx) = signal_channel();
        let mut backend = ClockBackend::new(tx, ClockOptions::default());
        let token = SourceToken(1);

        backend.load(&track("https://example.com/a.mp3", None), token, true);
        assert_eq!(rx.recv().await, Some(MediaSignal::SourceReady { token }));

        backend.play(token);
        assert_eq!(rx.recv().await, Some(MediaSignal::PlayStarted { token }));
        assert!(backend.is_running());

        match rx.recv().await {
            Some(MediaSignal::Progress { token: t, position }) => {
                assert_eq!(t, token);
                assert!(position >= Duration::from_millis(250));
            }
            other => panic!("expected progress, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_looping_source_ends() {
        let (tx, mut rx) = signal_channel();
        let options = ClockOptions {
            tick: Duration::from_millis(100),
            reject_first_play: false,
        };
        let mut backend = ClockBackend::new(tx, options);
        let token = SourceToken(3);

        backend.load(&track("file:///tmp/a.mp3", Some(1.0)), token, false);
        backend.play(token);

        let mut ended = false;
        while let Some(signal) = rx.recv().await {
            if signal == (MediaSignal::Ended { token }) {
                ended = true;
                break;
            }
        }
        assert!(ended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_play_rejected_then_allowed() {
        let (tx, mut rx) = signal_channel();
        let options = ClockOptions {
            reject_first_play: true,
            ..ClockOptions::default()
        };
        let mut backend = ClockBackend::new(tx, options);
        let token = SourceToken(1);

        backend.load(&track("https://example.com/a.mp3", None), token, true);
        backend.play(token);
        backend.play(token);

        assert_eq!(rx.recv().await, Some(MediaSignal::SourceReady { token }));
        assert!(matches!(rx.recv().await, Some(MediaSignal::PlayRejected { .. })));
        assert_eq!(rx.recv().await, Some(MediaSignal::PlayStarted { token }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_source_fails() {
        let (tx, mut rx) = signal_channel();
        let mut backend = ClockBackend::new(tx, ClockOptions::default());

        backend.load(&track("ftp://example.com/a.mp3", None), SourceToken(1), true);
        assert!(matches!(
            rx.recv().await,
            Some(MediaSignal::SourceFailed { token: SourceToken(1), .. })
        ));

        // Playing a failed source is a source error, not an autoplay refusal
        backend.play(SourceToken(1));
        assert!(matches!(
            rx.recv().await,
            Some(MediaSignal::SourceFailed { token: SourceToken(1), ref reason })
                if reason == "no source loaded"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_keeps_position() {
        let (tx, _rx) = signal_channel();
        let mut backend = ClockBackend::new(tx, ClockOptions::default());
        let token = SourceToken(1);

        backend.load(&track("https://example.com/a.mp3", None), token, true);
        backend.play(token);
        tokio::time::advance(Duration::from_secs(2)).await;
        backend.pause();
        tokio::time::advance(Duration::from_secs(5)).await;

        assert!(!backend.is_running());
        let position = backend.position();
        assert!(position >= Duration::from_secs(2), "{:?}", position);
        assert!(position < Duration::from_secs(3), "{:?}", position);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(
            wrap(Duration::from_millis(2500), Duration::from_secs(1)),
            Duration::from_millis(500)
        );
    }
}
