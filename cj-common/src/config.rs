//! Journal configuration loading
//!
//! Everything the session needs is described by one TOML file, `journal.toml`:
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [playback]
//! volume = 0.4
//! switch_delay_ms = 100
//! policy = { kind = "time_boxed", threshold_secs = 30 }
//!
//! [[tracks]]
//! title = "Gymnopedie No. 1"
//! source = "https://example.com/gymnopedie.mp3"
//! loop_policy = "loop_never"
//!
//! [[slides]]
//! title = "The Confession"
//! body = ["Hello again."]
//! background = "https://example.com/intro.png"
//! ```
//!
//! Config file resolution order:
//! 1. Command-line argument (highest priority)
//! 2. `CJ_CONFIG` environment variable
//! 3. `<user config dir>/confession-journal/journal.toml`
//! 4. Compiled defaults (the built-in journal)
//!
//! A missing file never stops the player: it logs a warning and falls back to
//! the compiled defaults. A file that exists but does not parse is an error.

use crate::model::{LoopPolicy, SlideContent, SlideDescriptor, Track};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "CJ_CONFIG";

const CONFIG_DIR_NAME: &str = "confession-journal";
const CONFIG_FILE_NAME: &str = "journal.toml";

/// Complete journal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub journal: JournalMeta,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_tracks")]
    pub tracks: Vec<Track>,

    #[serde(default = "default_slides")]
    pub slides: Vec<SlideEntry>,

    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Who the journal is from and to
#[derive(Debug, Clone, Deserialize)]
pub struct JournalMeta {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_recipient")]
    pub recipient: String,
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default)]
    pub date: String,
}

impl Default for JournalMeta {
    fn default() -> Self {
        Self {
            title: default_title(),
            recipient: default_recipient(),
            sender: default_sender(),
            date: String::new(),
        }
    }
}

/// Background music behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// Volume applied when the session starts (0.0-1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Delay between a source swap and the resume play command, used when
    /// the backend cannot report readiness itself
    #[serde(default = "default_switch_delay_ms")]
    pub switch_delay_ms: u64,

    /// Which track plays when
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl PlaybackConfig {
    pub fn switch_delay(&self) -> Duration {
        Duration::from_millis(self.switch_delay_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            switch_delay_ms: default_switch_delay_ms(),
            policy: PolicyConfig::default(),
        }
    }
}

/// Track selection policy as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    /// Track 1 on the final slide, track 0 everywhere else
    SlidePosition,
    /// Track 0 until it has played for `threshold_secs`, then track 1 for good
    TimeBoxed {
        #[serde(default = "default_threshold_secs")]
        threshold_secs: f64,
    },
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::SlidePosition
    }
}

/// One `[[slides]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct SlideEntry {
    #[serde(flatten)]
    pub content: SlideContent,
    pub background: String,
}

/// Writing assistant settings
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; falls back to the environment when absent
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    CompiledDefaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::CompiledDefaults => write!(f, "compiled defaults"),
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            journal: JournalMeta::default(),
            playback: PlaybackConfig::default(),
            tracks: default_tracks(),
            slides: default_slides(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl JournalConfig {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        let config: JournalConfig = toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    /// Resolve the config file and load it, falling back to compiled defaults
    /// when no file is present
    pub fn load_or_default(cli_arg: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let Some(path) = resolve_config_path(cli_arg) else {
            info!("No journal config found, using compiled defaults");
            return Ok((Self::default(), ConfigSource::CompiledDefaults));
        };

        if !path.exists() {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            return Ok((Self::default(), ConfigSource::CompiledDefaults));
        }

        let config = Self::load(&path)?;
        info!("Loaded journal config from {}", path.display());
        Ok((config, ConfigSource::File(path)))
    }

    /// Check invariants the controllers rely on
    pub fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            return Err(Error::Config("journal needs at least one slide".to_string()));
        }
        if self.tracks.is_empty() {
            return Err(Error::Config("journal needs at least one track".to_string()));
        }
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err(Error::Config(format!(
                "playback.volume must be within 0.0-1.0, got {}",
                self.playback.volume
            )));
        }
        // Both policies hand over to track 1 at some point
        if self.tracks.len() < 2 {
            return Err(Error::Config(format!(
                "policy {:?} needs two tracks, found {}",
                self.playback.policy,
                self.tracks.len()
            )));
        }
        if let PolicyConfig::TimeBoxed { threshold_secs } = self.playback.policy {
            if !threshold_secs.is_finite() || threshold_secs <= 0.0 {
                return Err(Error::Config(format!(
                    "time_boxed threshold must be positive, got {}",
                    threshold_secs
                )));
            }
        }
        Ok(())
    }

    /// Build the indexed slide deck
    pub fn slide_deck(&self) -> Vec<SlideDescriptor> {
        self.slides
            .iter()
            .enumerate()
            .map(|(index, entry)| SlideDescriptor {
                index,
                content: entry.content.clone(),
                background: entry.background.clone(),
            })
            .collect()
    }
}

/// Resolve which config file to read, if any
///
/// The CLI argument and the environment variable are returned even if the
/// file does not exist so the caller can warn about it. The user config dir
/// is only returned when the file is actually there.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .filter(|p| p.exists())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_title() -> String {
    "The Confession".to_string()
}

fn default_recipient() -> String {
    "My Dearest".to_string()
}

fn default_sender() -> String {
    "Yours, always".to_string()
}

fn default_volume() -> f32 {
    0.4
}

fn default_switch_delay_ms() -> u64 {
    100
}

fn default_threshold_secs() -> f64 {
    30.0
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_tracks() -> Vec<Track> {
    vec![
        Track {
            title: "Gymnopedie No. 1".to_string(),
            description: Some("Erik Satie - Gentle Piano".to_string()),
            source: "https://cdn.pixabay.com/download/audio/2022/05/27/audio_1808fbf07a.mp3?filename=gymnopedie-no-1-satie-6512.mp3".to_string(),
            loop_policy: LoopPolicy::LoopAlways,
            duration_secs: None,
        },
        Track {
            title: "River of Love".to_string(),
            description: Some("Romantic Melodies".to_string()),
            source: "https://cdn.pixabay.com/download/audio/2022/03/10/audio_c8c8a73467.mp3?filename=piano-moment-11176.mp3".to_string(),
            loop_policy: LoopPolicy::LoopAlways,
            duration_secs: None,
        },
    ]
}

const IMAGE_BASE: &str = "https://pub-e08d794ef1ea4b5d9b36233b86975b51.r2.dev/generated-images";

fn slide(title: &str, body: &[&str], caption: Option<&str>, image: &str) -> SlideEntry {
    SlideEntry {
        content: SlideContent {
            title: title.to_string(),
            body: body.iter().map(|p| p.to_string()).collect(),
            caption: caption.map(str::to_string),
        },
        background: format!("{}/{}.png", IMAGE_BASE, image),
    }
}

fn default_slides() -> Vec<SlideEntry> {
    vec![
        slide(
            "Chapter One: The Confession",
            &[
                "Hello again! Confessing a second time, and I'm just as nervous.",
                "Straight to the point: I like you most of all, and I want to say it properly.",
            ],
            Some("Beginnings"),
            "77ff766b-f373-4241-a1ef-de912cbc7362",
        ),
        slide(
            "The Gap",
            &[
                "Two years have flown by, full of changes in who we are and where we live.",
                "I thought love would come easily to me. It turned out to be a scramble.",
                "Crossing the gap between knowing and doing is the lesson these two years taught me.",
            ],
            Some("Growth"),
            "cfd760cf-bcac-4e43-bdb1-928b799a2489",
        ),
        slide(
            "Seeing Your Heart",
            &[
                "While we were apart I kept rereading the little guide I wrote about you.",
                "I saw a heart as clear and delicate as glass, the most precious thing there is.",
                "You are a treasure of this world!",
            ],
            Some("Crystal Heart"),
            "5816784c-ea93-4dd4-b748-2df82c58fb0b",
        ),
        slide(
            "Down to Earth",
            &[
                "The first confession was about the love I imagined. This one is about the real you.",
                "I want to be the one who can keep up with you and catch you when you fall.",
            ],
            Some("Promise"),
            "2c06afb5-d221-4bc4-9e26-a928f1f37324",
        ),
        slide(
            "Coming Home",
            &[
                "I don't only want to say it, I want to do it. A few small plans for our reunion:",
                "A box of custom little gifts.",
                "A freshly cleaned home, waiting for you.",
                "More of the travel planning on my shoulders.",
                "Saying plainly that I miss you, and talking when something is wrong.",
            ],
            Some("Action"),
            "97456f33-e0b9-4915-9d62-4cf6b4d28cfe",
        ),
        slide(
            "Confidence",
            &[
                "What we have was built by facing every disagreement honestly.",
                "So I am more confident than ever, and more determined, to take care of us.",
            ],
            Some("Bond"),
            "e71873d7-5aa8-4404-90c2-c870b463bc31",
        ),
        slide(
            "Welcome Home",
            &[
                "The gifts and the little surprises are ready.",
                "If you say yes before you come home, I'll take your hand and say it out loud:",
            ],
            None,
            "741be445-5e62-4a19-b19a-15a0f4a39d00",
        ),
    ]
}
