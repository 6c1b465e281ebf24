//! Generative language API client
//!
//! Sends one prompt per request to the `generateContent` endpoint and returns
//! the first candidate's text.

use crate::error::{AiError, Result};
use crate::prompts::PromptKind;
use cj_common::config::AssistantConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Returned whenever generation fails
pub const FALLBACK_TEXT: &str =
    "Love is not just looking at each other, it's looking in the same direction.";

/// Environment variables checked for an API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

const USER_AGENT: &str = concat!("confession-journal/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated and trimmed
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// API key from config, else the first non-empty environment variable
pub fn resolve_api_key(config: &AssistantConfig) -> Option<String> {
    config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            API_KEY_ENV_VARS
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .find(|k| !k.trim().is_empty())
        })
}

pub struct GenerativeClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GenerativeClient {
    /// Client using the key resolved from config or environment
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        Self::with_api_key(config, resolve_api_key(config))
    }

    pub fn with_api_key(config: &AssistantConfig, api_key: Option<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AiError::Network(e.to_string()))?;

        if api_key.is_none() {
            warn!("No API key configured; the assistant will only offer its fallback text");
        }

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Generate text for `context`
    pub async fn generate(&self, kind: PromptKind, context: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let request = GenerateContentRequest::from_prompt(kind.render(context));

        debug!(model = %self.model, kind = %kind, "Requesting generated text");

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AiError::Api(status.as_u16(), error_text));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        let text = body.first_text().ok_or(AiError::EmptyResponse)?;
        info!(model = %self.model, kind = %kind, chars = text.len(), "Generated text");
        Ok(text)
    }

    /// Generate text, substituting [`FALLBACK_TEXT`] on any failure
    pub async fn generate_or_fallback(&self, kind: PromptKind, context: &str) -> String {
        match self.generate(kind, context).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Text generation failed: {}", e);
                FALLBACK_TEXT.to_string()
            }
        }
    }
}
