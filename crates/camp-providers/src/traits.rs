//! Generation provider trait — the boundary to any external text model.
//!
//! The engine treats every [`ProviderError`] the same way (fall back to the
//! deterministic composer); the variants exist for logging and tests.

use async_trait::async_trait;
use thiserror::Error;

/// One generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    /// Optional system instruction.
    pub system: Option<String>,
    pub prompt: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Why a generation call produced no usable text.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected the credentials ({0})")]
    Unauthorized(u16),

    #[error("provider quota or rate limit exceeded")]
    RateLimited,

    #[error("provider call timed out")]
    Timeout,

    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider returned no text")]
    Empty,

    #[error("provider client setup failed: {0}")]
    Setup(String),
}

/// Trait that all generation providers implement.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Run one completion and return the trimmed text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
