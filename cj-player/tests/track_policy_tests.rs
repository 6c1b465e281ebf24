//! Time-boxed hand-over, loop policies and user skip

mod helpers;

use cj_common::config::PolicyConfig;
use cj_common::events::{JournalEvent, TrackChangeTrigger};
use cj_common::LoopPolicy;
use cj_player::media::MediaSignal;
use cj_player::UserInput;
use helpers::{journal_config, BackendOptions, Harness};
use std::time::Duration;

fn time_boxed() -> PolicyConfig {
    PolicyConfig::TimeBoxed { threshold_secs: 30.0 }
}

fn triggers(events: &[JournalEvent]) -> Vec<TrackChangeTrigger> {
    events
        .iter()
        .filter_map(|e| match e {
            JournalEvent::TrackChanged { trigger, .. } => Some(*trigger),
            _ => None,
        })
        .collect()
}

fn progress(h: &mut Harness, secs: u64) {
    let token = h.token();
    h.deliver(MediaSignal::Progress {
        token,
        position: Duration::from_secs(secs),
    });
}

#[tokio::test]
async fn test_time_boxed_hands_over_exactly_once() {
    let mut h = Harness::new(journal_config(7, time_boxed()), BackendOptions::default());
    h.act(UserInput::Start);
    assert_eq!(h.active_track(), 0);

    progress(&mut h, 10);
    assert_eq!(h.active_track(), 0);

    progress(&mut h, 30);
    assert_eq!(h.active_track(), 1);
    assert!(h.is_playing());

    // Navigation never drives the track under this policy
    h.act(UserInput::JumpTo(6));
    h.act(UserInput::JumpTo(0));
    progress(&mut h, 120);
    assert_eq!(h.active_track(), 1);

    assert_eq!(triggers(&h.drain_events()), vec![TrackChangeTrigger::TimeThreshold]);
}

#[tokio::test]
async fn test_time_boxed_never_reverts_on_its_own() {
    let mut config = journal_config(7, time_boxed());
    config.tracks[1].loop_policy = LoopPolicy::LoopNever;
    let mut h = Harness::new(config, BackendOptions::default());
    h.act(UserInput::Start);
    progress(&mut h, 45);
    assert_eq!(h.active_track(), 1);
    let loads_before = h.loads().len();

    // Closing track ends: replay it rather than falling back to the opener
    let token = h.token();
    h.deliver(MediaSignal::Ended { token });

    assert_eq!(h.active_track(), 1);
    assert!(h.is_playing());
    let loads = h.loads();
    assert_eq!(loads.len(), loads_before + 1);
    assert_eq!(loads.last().unwrap().0, "River of Love");

    // Going back to the opener by hand does not re-arm the hand-over
    h.act(UserInput::SkipTrack);
    assert_eq!(h.active_track(), 0);
    progress(&mut h, 31);
    assert_eq!(h.active_track(), 0);
}

#[tokio::test]
async fn test_progress_for_replaced_source_is_ignored() {
    let mut h = Harness::new(journal_config(7, time_boxed()), BackendOptions::default());
    h.act(UserInput::Start);
    let opener = h.token();

    h.act(UserInput::SkipTrack);
    h.act(UserInput::SkipTrack);
    assert_eq!(h.active_track(), 0);
    assert_ne!(h.token(), opener);

    h.deliver(MediaSignal::Progress {
        token: opener,
        position: Duration::from_secs(300),
    });
    assert_eq!(h.active_track(), 0);
}

#[tokio::test]
async fn test_loop_never_moves_to_next_track() {
    let mut config = journal_config(7, PolicyConfig::SlidePosition);
    config.tracks[0].loop_policy = LoopPolicy::LoopNever;
    let mut h = Harness::new(config, BackendOptions::default());

    h.act(UserInput::Start);
    assert!(!h.loads()[0].2, "non-looping track is not looped natively");

    let token = h.token();
    h.deliver(MediaSignal::Ended { token });

    assert_eq!(h.active_track(), 1);
    assert!(h.is_playing());
    assert_eq!(triggers(&h.drain_events()), vec![TrackChangeTrigger::TrackEnded]);
}

#[tokio::test]
async fn test_loop_after_first_loops_on_later_plays() {
    let mut config = journal_config(7, PolicyConfig::SlidePosition);
    config.tracks[0].loop_policy = LoopPolicy::LoopAfterFirst;
    let mut h = Harness::new(config, BackendOptions::default());

    h.act(UserInput::Start);
    assert!(!h.loads()[0].2);

    let token = h.token();
    h.deliver(MediaSignal::Ended { token });
    assert_eq!(h.active_track(), 1);

    h.act(UserInput::SkipTrack);
    assert_eq!(h.active_track(), 0);
    let (title, _, looping) = h.loads().last().cloned().unwrap();
    assert_eq!(title, "Gymnopedie No. 1");
    assert!(looping, "second play loops natively");

    let token = h.token();
    h.deliver(MediaSignal::Ended { token });
    assert_eq!(h.active_track(), 0);
}

#[tokio::test]
async fn test_loop_always_ignores_ended() {
    let mut h = Harness::with_defaults();
    h.act(UserInput::Start);
    let loads = h.loads().len();

    let token = h.token();
    h.deliver(MediaSignal::Ended { token });

    assert_eq!(h.active_track(), 0);
    assert_eq!(h.loads().len(), loads);
}

#[tokio::test]
async fn test_skip_plays_next_track_even_when_paused() {
    let mut h = Harness::with_defaults();
    h.act(UserInput::Start);
    h.act(UserInput::TogglePlay);
    assert!(!h.is_playing());

    h.act(UserInput::SkipTrack);
    assert_eq!(h.active_track(), 1);
    assert!(h.is_playing());
    assert_eq!(
        h.session.status().track_title.as_deref(),
        Some("River of Love")
    );

    // The slide mapping takes over again on the next page turn
    h.act(UserInput::Advance);
    assert_eq!(h.active_track(), 0);
    assert_eq!(
        triggers(&h.drain_events()),
        vec![TrackChangeTrigger::UserSkip, TrackChangeTrigger::Navigation]
    );
}
