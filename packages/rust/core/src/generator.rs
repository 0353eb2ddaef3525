//! Text generation collaborator.
//!
//! [`Generator`] is the seam the orchestrator calls; [`AnthropicGenerator`]
//! implements it over the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use lexdraft_shared::{GeneratedResult, GeneratorConfig, LexDraftError, PromptBundle, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Messages API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Timeout for establishing the connection. The overall call is bounded by
/// the orchestrator.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("LexDraft/", env!("CARGO_PKG_VERSION"));

/// Produces text from a system prompt and a turn sequence.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, bundle: &PromptBundle) -> Result<GeneratedResult>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// AnthropicGenerator
// ---------------------------------------------------------------------------

/// Generator backed by the Anthropic Messages API.
pub struct AnthropicGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    config: GeneratorConfig,
}

impl AnthropicGenerator {
    /// Build a generator. `api_key` comes from the environment, never from config.
    pub fn new(config: &GeneratorConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LexDraftError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            config: config.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Generator for AnthropicGenerator {
    #[instrument(skip_all, fields(model = %self.config.model, turns = bundle.turns.len()))]
    async fn generate(&self, bundle: &PromptBundle) -> Result<GeneratedResult> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: &bundle.system_prompt,
            messages: bundle
                .turns
                .iter()
                .map(|t| WireMessage {
                    role: t.role.as_str(),
                    content: &t.content,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LexDraftError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LexDraftError::Generation(format!("HTTP {status}: {body}")));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LexDraftError::Generation(format!("invalid response body: {e}")))?;

        let raw_text: String = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if raw_text.is_empty() {
            return Err(LexDraftError::Generation("response contained no text".into()));
        }

        debug!(chars = raw_text.len(), "generation complete");
        Ok(GeneratedResult { raw_text })
    }
}
