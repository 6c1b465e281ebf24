//! Writing assistant (cj-ai) - Main entry point
//!
//! One-shot: `cj-ai --kind poem "her smile"` prints a passage and exits.
//! Without a context it reads ideas from stdin, one per line; `:accept`
//! prints the current draft as accepted and `:quit` leaves.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use cj_ai::{Assistant, GenerativeClient, PromptKind};
use cj_common::config::{JournalConfig, CONFIG_ENV_VAR};
use cj_common::logging;

/// Command-line arguments for cj-ai
#[derive(Parser, Debug)]
#[command(name = "cj-ai")]
#[command(about = "Writing assistant for the confession journal")]
#[command(version)]
struct Args {
    /// Journal config file (TOML)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Kind of passage to write
    #[arg(short, long, value_enum, default_value_t = PromptKind::Poem)]
    kind: PromptKind,

    /// Idea to write about; omit to read ideas from stdin
    context: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, _source) = JournalConfig::load_or_default(args.config.as_deref())
        .context("Failed to load journal config")?;
    logging::init(&config.logging, "cj_ai").context("Failed to initialise logging")?;

    let client =
        GenerativeClient::new(&config.assistant).context("Failed to create API client")?;
    info!("Writing assistant using model {}", client.model());

    if !args.context.is_empty() {
        let idea = args.context.join(" ");
        println!("{}", client.generate_or_fallback(args.kind, &idea).await);
        return Ok(());
    }

    let mut assistant = Assistant::new(client, args.kind);
    println!("Tell me what you want to convey (e.g. \"her smile\", \"our first trip\").");
    println!("Commands: :accept  :short  :long  :poem  :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":accept" => match assistant.accept() {
                Some(text) => println!("Accepted:\n{}", text),
                None => println!("Nothing to accept yet."),
            },
            ":short" => assistant.set_kind(PromptKind::Short),
            ":long" => assistant.set_kind(PromptKind::Long),
            ":poem" => assistant.set_kind(PromptKind::Poem),
            idea => {
                if let Some(draft) = assistant.generate(idea).await {
                    println!("\n{}\n", draft);
                }
            }
        }
    }

    Ok(())
}
