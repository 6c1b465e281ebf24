//! End-to-end session loop tests with the simulated clock backend

use cj_common::config::{JournalConfig, PolicyConfig};
use cj_common::events::{EventBus, JournalEvent, TrackChangeTrigger};
use cj_player::media::{signal_channel, ClockBackend, ClockOptions};
use cj_player::{Session, UserInput};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

fn collect(rx: &mut broadcast::Receiver<JournalEvent>) -> Vec<JournalEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn spawn_session(
    config: JournalConfig,
    options: ClockOptions,
) -> (
    mpsc::Sender<UserInput>,
    oneshot::Sender<()>,
    broadcast::Receiver<JournalEvent>,
    tokio::task::JoinHandle<cj_player::Result<()>>,
) {
    let bus = EventBus::new(256);
    let events = bus.subscribe();
    let (signal_tx, signal_rx) = signal_channel();
    let backend = ClockBackend::new(signal_tx.clone(), options);
    let session = Session::new(&config, backend, signal_tx, bus).unwrap();

    let (input_tx, input_rx) = mpsc::channel(16);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(session.run(input_rx, signal_rx, async {
        let _ = stop_rx.await;
    }));
    (input_tx, stop_tx, events, handle)
}

#[tokio::test(start_paused = true)]
async fn test_run_until_quit() {
    let (inputs, _stop, mut events, handle) =
        spawn_session(JournalConfig::default(), ClockOptions::default());

    inputs.send(UserInput::Start).await.unwrap();
    inputs.send(UserInput::Advance).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    inputs.send(UserInput::Quit).await.unwrap();

    handle.await.unwrap().unwrap();

    let events = collect(&mut events);
    let types: Vec<_> = events.iter().map(|e| e.event_type().to_string()).collect();
    assert_eq!(types[0], "SessionStarted");
    assert!(types.contains(&"SlideChanged".to_string()));
    assert!(types.contains(&"PlaybackStateChanged".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_future_stops_loop() {
    let (_inputs, stop, _events, handle) =
        spawn_session(JournalConfig::default(), ClockOptions::default());

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_time_boxed_handover_with_clock_backend() {
    let mut config = JournalConfig::default();
    config.playback.policy = PolicyConfig::TimeBoxed { threshold_secs: 30.0 };
    let (inputs, _stop, mut events, handle) = spawn_session(config, ClockOptions::default());

    inputs.send(UserInput::Start).await.unwrap();
    tokio::time::sleep(Duration::from_secs(29)).await;
    assert!(collect(&mut events)
        .iter()
        .all(|e| !matches!(e, JournalEvent::TrackChanged { .. })));

    tokio::time::sleep(Duration::from_secs(90)).await;
    inputs.send(UserInput::Quit).await.unwrap();
    handle.await.unwrap().unwrap();

    let handovers: Vec<_> = collect(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            JournalEvent::TrackChanged {
                new_track, trigger, ..
            } => Some((new_track, trigger)),
            _ => None,
        })
        .collect();
    assert_eq!(handovers, vec![(1, TrackChangeTrigger::TimeThreshold)]);
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_rejection_then_user_toggle() {
    let options = ClockOptions {
        reject_first_play: true,
        ..ClockOptions::default()
    };
    let (inputs, _stop, mut events, handle) = spawn_session(JournalConfig::default(), options);

    inputs.send(UserInput::Start).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    let first = collect(&mut events);
    assert!(first
        .iter()
        .any(|e| matches!(e, JournalEvent::PlaybackFailed { .. })));
    assert!(first
        .iter()
        .all(|e| !matches!(e, JournalEvent::PlaybackStateChanged { .. })));

    inputs.send(UserInput::TogglePlay).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(collect(&mut events)
        .iter()
        .any(|e| matches!(e, JournalEvent::PlaybackStateChanged { .. })));

    inputs.send(UserInput::Quit).await.unwrap();
    handle.await.unwrap().unwrap();
}
