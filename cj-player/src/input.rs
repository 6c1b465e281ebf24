//! Terminal input mapping
//!
//! Each line typed on stdin becomes at most one [`UserInput`]. Before the
//! journal is opened an empty line opens it; afterwards it turns the page.

use crate::navigation::NavigationState;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// User actions understood by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput {
    /// Open the journal (one-shot)
    Start,
    Advance,
    Retreat,
    /// Jump to a 0-based slide index
    JumpTo(usize),
    TogglePlay,
    SkipTrack,
    /// Print the status line
    ShowStatus,
    Quit,
}

/// Translate one input line
///
/// Slide numbers are typed 1-based and validated here, so the session only
/// ever receives in-range jumps.
pub fn parse_line(line: &str, state: NavigationState, slide_count: usize) -> Option<UserInput> {
    let key = line.trim().to_ascii_lowercase();

    if !state.started {
        return match key.as_str() {
            "" | "o" | "open" | "start" => Some(UserInput::Start),
            "?" | "status" => Some(UserInput::ShowStatus),
            "q" | "quit" | "exit" => Some(UserInput::Quit),
            _ => None,
        };
    }

    match key.as_str() {
        "" | "n" | "next" | "right" | "space" => Some(UserInput::Advance),
        "p" | "prev" | "back" | "left" => Some(UserInput::Retreat),
        "m" | "music" | "t" | "toggle" => Some(UserInput::TogglePlay),
        "s" | "skip" => Some(UserInput::SkipTrack),
        "?" | "status" => Some(UserInput::ShowStatus),
        "q" | "quit" | "exit" => Some(UserInput::Quit),
        other => match other.parse::<usize>() {
            Ok(number) if (1..=slide_count).contains(&number) => Some(UserInput::JumpTo(number - 1)),
            Ok(number) => {
                warn!("No slide {} (1-{})", number, slide_count);
                None
            }
            Err(_) => None,
        },
    }
}

/// Read lines until EOF, forwarding parsed inputs to the session
///
/// EOF is forwarded as [`UserInput::Quit`].
pub async fn read_inputs<R>(
    reader: R,
    nav: watch::Receiver<NavigationState>,
    slide_count: usize,
    tx: mpsc::Sender<UserInput>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let state = *nav.borrow();
        match parse_line(&line, state, slide_count) {
            Some(input) => {
                if tx.send(input).await.is_err() {
                    return Ok(());
                }
                if input == UserInput::Quit {
                    return Ok(());
                }
            }
            None => debug!("Unrecognised input {:?}", line),
        }
    }
    let _ = tx.send(UserInput::Quit).await;
    Ok(())
}
