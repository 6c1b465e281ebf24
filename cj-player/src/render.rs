//! Terminal rendering of the journal
//!
//! The renderer is a passive EventBus subscriber: it never touches session
//! state, it only turns `JournalEvent`s into text. The formatting functions
//! return `String`s so they can be checked without a terminal.

use cj_common::config::JournalMeta;
use cj_common::events::{JournalEvent, PlaybackState, SessionStatus, TrackChangeTrigger};
use cj_common::SlideDescriptor;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const RULE: &str = "────────────────────────────────────────";

/// Everything the renderer needs to draw a page
#[derive(Debug, Clone)]
pub struct JournalView {
    pub meta: JournalMeta,
    pub slides: Arc<[SlideDescriptor]>,
}

impl JournalView {
    pub fn new(meta: JournalMeta, slides: Arc<[SlideDescriptor]>) -> Self {
        Self { meta, slides }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// Closed-book cover shown before the journal is opened
pub fn render_cover(view: &JournalView) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("  {}\n", view.meta.title));
    out.push_str(&format!("  for {}\n", view.meta.recipient));
    out.push_str(RULE);
    out.push('\n');
    out.push_str("  Press Enter to open. Type 'q' to leave.\n");
    out
}

/// One page of the journal
///
/// The last page is signed with the sender and date.
pub fn render_slide(view: &JournalView, index: usize) -> String {
    let Some(slide) = view.slides.get(index) else {
        return format!("  (no page {})\n", index + 1);
    };

    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "  Page {}/{}  {}\n\n",
        index + 1,
        view.slide_count(),
        slide.content.title
    ));
    for paragraph in &slide.content.body {
        out.push_str(&format!("  {}\n", paragraph));
    }
    if let Some(caption) = &slide.content.caption {
        out.push_str(&format!("\n  ~ {} ~\n", caption));
    }
    out.push_str(&format!("\n  [background: {}]\n", slide.background));

    if index + 1 == view.slide_count() {
        out.push_str(&format!("\n  With love, {}\n", view.meta.sender));
        if !view.meta.date.is_empty() {
            out.push_str(&format!("  {}\n", view.meta.date));
        }
    }

    out.push_str(RULE);
    out.push('\n');
    out.push_str("  [Enter] next  [p] back  [1-9] jump  [m] music  [s] skip  [?] status  [q] quit\n");
    out
}

/// Single status line for the music indicator
pub fn render_status(status: &SessionStatus) -> String {
    if !status.started {
        return "closed".to_string();
    }
    let state = PlaybackState::from_playing(status.is_playing);
    match &status.track_title {
        Some(title) => format!(
            "page {}/{} | music {} | {}",
            status.slide_index + 1,
            status.slide_count,
            state,
            title
        ),
        None => format!("page {}/{} | music off", status.slide_index + 1, status.slide_count),
    }
}

/// Text for one event, or None when it needs no output
pub fn render_event(view: &JournalView, event: &JournalEvent) -> Option<String> {
    match event {
        JournalEvent::SessionStarted { .. } => Some(render_slide(view, 0)),
        JournalEvent::SlideChanged { new_index, .. } => Some(render_slide(view, *new_index)),
        JournalEvent::TrackChanged { title, trigger, .. } => {
            let why = match trigger {
                TrackChangeTrigger::Navigation => "",
                TrackChangeTrigger::TimeThreshold => " (time's up for the opener)",
                TrackChangeTrigger::TrackEnded => " (previous track ended)",
                TrackChangeTrigger::UserSkip => " (skipped)",
            };
            Some(format!("  ♪ now: {}{}\n", title, why))
        }
        // Reported through the status line that follows
        JournalEvent::PlaybackStateChanged { .. } => None,
        JournalEvent::PlaybackFailed { failure, .. } => Some(format!(
            "  ♪ music unavailable ({}); press 'm' to try again\n",
            failure
        )),
        JournalEvent::StatusUpdated { status, .. } => {
            Some(format!("  ♪ {}\n", render_status(status)))
        }
    }
}

/// Draw events until the bus closes
///
/// Write errors are logged and the event is dropped; rendering never stops
/// the session.
pub async fn run_renderer<W>(mut rx: broadcast::Receiver<JournalEvent>, view: JournalView, mut out: W)
where
    W: Write + Send,
{
    debug!("Renderer started");

    loop {
        match rx.recv().await {
            Ok(event) => {
                let Some(text) = render_event(&view, &event) else {
                    continue;
                };
                if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
                    warn!("Renderer: failed to write {}: {}", event.event_type(), e);
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Renderer: lagged {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Renderer: event bus closed, shutting down");
                break;
            }
        }
    }

    debug!("Renderer stopped");
}
