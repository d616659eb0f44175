//! Generic HTTP provider for OpenAI-compatible `/chat/completions` APIs.
//!
//! Covers every backend in the registry: OpenAI, OpenRouter, DeepSeek, Groq, Gemini.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use camp_core::config::GenerationConfig;

use crate::registry::{apply_model_overrides, resolve_spec, ProviderSpec};
use crate::traits::{GenerationProvider, GenerationRequest, ProviderError};

/// Provider error bodies are cut to this many characters.
const ERROR_BODY_LIMIT: usize = 300;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A generation provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    model: String,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Create a provider from the generation config and a registry spec.
    ///
    /// The API base comes from the config when set, else the spec default.
    pub fn new(config: &GenerationConfig, spec: &'static ProviderSpec) -> Result<Self, ProviderError> {
        let api_base = config
            .api_base
            .clone()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| spec.default_api_base.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ProviderError::Setup(e.to_string()))?;

        Ok(HttpProvider {
            client,
            api_base,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            spec,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl GenerationProvider for HttpProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let temperature = apply_model_overrides(&self.model, self.spec, request.temperature);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        debug!(
            provider = self.spec.display_name,
            model = %self.model,
            prompt_chars = request.prompt.len(),
            "Calling generation provider"
        );

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: request.max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.spec.display_name, error = %e, "HTTP request failed");
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                provider = self.spec.display_name,
                status = %status,
                "API error"
            );
            return Err(match status.as_u16() {
                401 | 403 => ProviderError::Unauthorized(status.as_u16()),
                429 => ProviderError::RateLimited,
                code => ProviderError::Http {
                    status: code,
                    body: error_text.chars().take(ERROR_BODY_LIMIT).collect(),
                },
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(provider = self.spec.display_name, error = %e, "Failed to parse response");
            ProviderError::Malformed(e.to_string())
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::Empty);
        }

        debug!(
            provider = self.spec.display_name,
            chars = text.chars().count(),
            "Generation response received"
        );
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build a provider from the generation config.
///
/// Returns `Ok(None)` when no API key is configured; callers then use the
/// deterministic composer.
pub fn create_provider(config: &GenerationConfig) -> Result<Option<HttpProvider>, ProviderError> {
    if !config.is_configured() {
        debug!("No generation provider configured");
        return Ok(None);
    }

    let spec = resolve_spec(config);
    debug!(
        provider = spec.display_name,
        model = %config.model,
        api_base = config.api_base.as_deref().unwrap_or("default"),
        "Creating generation provider"
    );

    HttpProvider::new(config, spec).map(Some)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
