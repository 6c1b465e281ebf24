//! Writing assistant session
//!
//! Holds one draft at a time: the user describes an idea, the assistant
//! writes a passage for it, and accepting the passage hands it to the caller
//! and clears the draft.

use crate::client::GenerativeClient;
use crate::prompts::PromptKind;
use tracing::debug;

pub struct Assistant {
    client: GenerativeClient,
    kind: PromptKind,
    prompt: String,
    result: Option<String>,
}

impl Assistant {
    pub fn new(client: GenerativeClient, kind: PromptKind) -> Self {
        Self {
            client,
            kind,
            prompt: String::new(),
            result: None,
        }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: PromptKind) {
        self.kind = kind;
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Latest generated passage, if not yet accepted
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Write a passage for `prompt`
    ///
    /// Blank prompts are ignored and leave any previous draft in place.
    pub async fn generate(&mut self, prompt: &str) -> Option<&str> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            debug!("Blank prompt ignored");
            return None;
        }

        self.prompt = prompt.to_string();
        let text = self.client.generate_or_fallback(self.kind, prompt).await;
        self.result = Some(text);
        self.result.as_deref()
    }

    /// Take the draft and reset the session
    pub fn accept(&mut self) -> Option<String> {
        let text = self.result.take()?;
        self.prompt.clear();
        Some(text)
    }

    /// Throw away the draft without using it
    pub fn discard(&mut self) {
        self.prompt.clear();
        self.result = None;
    }
}
