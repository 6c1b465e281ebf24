//! Confession Journal Player (cj-player) - Main entry point
//!
//! Shows the journal cover, opens the journal on Enter and pages through it
//! from the terminal while the simulated audio element plays along.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};

use cj_common::config::{ConfigSource, JournalConfig, CONFIG_ENV_VAR};
use cj_common::events::EventBus;
use cj_common::logging;
use cj_player::input::read_inputs;
use cj_player::media::{signal_channel, ClockBackend, ClockOptions};
use cj_player::render::{render_cover, run_renderer, JournalView};
use cj_player::Session;

/// Stdin may still be blocked on a read when the session ends
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(200);

/// Command-line arguments for cj-player
#[derive(Parser, Debug)]
#[command(name = "cj-player")]
#[command(about = "Paged confession journal with background music")]
#[command(version)]
struct Args {
    /// Journal config file (TOML)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Refuse the first play attempt, as browsers do without a user gesture
    #[arg(long)]
    reject_first_play: bool,

    /// Interval between playback progress ticks in milliseconds
    #[arg(long, default_value = "250")]
    tick_ms: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let result = runtime.block_on(run(args));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    result
}

async fn run(args: Args) -> Result<()> {
    let (config, source) = JournalConfig::load_or_default(args.config.as_deref())
        .context("Failed to load journal config")?;

    logging::init(&config.logging, "cj_player").context("Failed to initialise logging")?;

    match &source {
        ConfigSource::File(path) => info!("Journal config: {}", path.display()),
        ConfigSource::CompiledDefaults => info!("Journal config: compiled defaults"),
    }

    let bus = EventBus::default();
    let (signal_tx, signal_rx) = signal_channel();
    let backend = ClockBackend::new(
        signal_tx.clone(),
        ClockOptions {
            tick: Duration::from_millis(args.tick_ms.max(10)),
            reject_first_play: args.reject_first_play,
        },
    );

    let session = Session::new(&config, backend, signal_tx, bus.clone())
        .context("Failed to initialise journal session")?;
    info!(
        "Session {} ready: {} slides, {} tracks, {} policy",
        session.id(),
        session.navigation().slide_count(),
        session.media().tracks().len(),
        session.media().policy()
    );

    let view = JournalView::new(config.journal.clone(), session.navigation().slides());
    print!("{}", render_cover(&view));

    let renderer = tokio::spawn(run_renderer(bus.subscribe(), view, std::io::stdout()));

    let (input_tx, input_rx) = mpsc::channel(16);
    let reader = tokio::spawn(read_inputs(
        tokio::io::BufReader::new(tokio::io::stdin()),
        session.navigation().subscribe(),
        session.navigation().slide_count(),
        input_tx,
    ));

    let outcome = session.run(input_rx, signal_rx, shutdown_signal()).await;

    drop(bus);
    reader.abort();
    if let Err(e) = renderer.await {
        warn!("Renderer task ended abnormally: {}", e);
    }

    outcome.context("Journal session failed")?;
    info!("Goodbye");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
