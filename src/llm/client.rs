use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompletionError;
use crate::llm::CannedClient;

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Environment variable selecting the provider when `--provider` is absent
pub const PROVIDER_ENV: &str = "MEDSCRIBE_PROVIDER";

/// Anything that turns a prompt into a raw text completion
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Which completion backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Fixed keyword-matched responses, no network
    Canned,
    /// Anthropic Messages API
    Anthropic,
}

impl ProviderKind {
    /// Pick the provider: explicit flag first, then the env value, then
    /// `Canned`. Call after `.env` files are loaded.
    pub fn resolve(
        flag: Option<ProviderKind>,
        env_value: Option<String>,
    ) -> Result<ProviderKind, CompletionError> {
        if let Some(kind) = flag {
            return Ok(kind);
        }
        match env_value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => <ProviderKind as ValueEnum>::from_str(value, true)
                .map_err(|_| CompletionError::UnknownProvider(value.to_string())),
            None => Ok(ProviderKind::Canned),
        }
    }
}

/// Build the completion client for the selected provider.
///
/// The real provider's configuration is only required (and only read) when
/// that provider is selected.
pub fn build_client(
    kind: ProviderKind,
    config: impl FnOnce() -> Result<AnthropicConfig, CompletionError>,
) -> Result<Box<dyn CompletionClient>, CompletionError> {
    match kind {
        ProviderKind::Canned => Ok(Box::new(CannedClient)),
        ProviderKind::Anthropic => Ok(Box::new(AnthropicClient::new(config()?))),
    }
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// API base URL, without the `/v1/messages` path
    pub endpoint: String,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from any variable source. Blank values count as unset.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CompletionError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = var("ANTHROPIC_API_KEY").ok_or(CompletionError::MissingApiKey)?;

        let mut config = Self::new(api_key, DEFAULT_MODEL.to_string());
        if let Some(model) = var("ANTHROPIC_MODEL") {
            config.model = model;
        }
        if let Some(endpoint) = var("ANTHROPIC_BASE_URL") {
            config.endpoint = endpoint.trim_end_matches('/').to_string();
        }

        Ok(config)
    }

    /// Replace the model when an override is given
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
        self
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.1,
            max_tokens: 4096,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.endpoint)
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        debug!(
            "Sending {} char prompt to {}",
            prompt.len(),
            self.config.model
        );

        let response = self
            .client
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api { status, body });
        }

        let response: AnthropicResponse = response.json().await?;

        first_text(&response).ok_or(CompletionError::EmptyResponse)
    }
}

/// Text of the first content block, if it is a text block
fn first_text(response: &AnthropicResponse) -> Option<String> {
    response
        .content
        .first()
        .filter(|c| c.content_type == "text")
        .map(|c| c.text.clone())
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
