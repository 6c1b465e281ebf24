//! Prompt templates

use serde::{Deserialize, Serialize};

/// Shape of the text to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    /// One poetic sentence
    Short,
    /// About fifty words for a love letter
    Long,
    /// Four untitled lines
    #[default]
    Poem,
}

impl PromptKind {
    /// Wrap the user's idea in the instruction for this kind
    pub fn render(&self, context: &str) -> String {
        match self {
            PromptKind::Poem => format!(
                "Write a very short, romantic, 4-line poem about: {}. Keep it sweet, elegant, and suitable for a love confession. Do not include a title.",
                context
            ),
            PromptKind::Short => format!(
                "Write a single, beautiful, poetic sentence describing this feeling or memory: \"{}\".",
                context
            ),
            PromptKind::Long => format!(
                "Write a heartfelt paragraph (approx 50 words) for a love letter based on this thought: \"{}\". Use warm, emotive language.",
                context
            ),
        }
    }
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptKind::Short => write!(f, "short"),
            PromptKind::Long => write!(f, "long"),
            PromptKind::Poem => write!(f, "poem"),
        }
    }
}
