//! Provider Configuration
//!
//! Credentials and endpoints are passed explicitly into each adapter; nothing
//! here is global.

use std::fmt;

use chat_core::{ChatError, ProviderKind, Result};

/// Connection settings for one provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// Which provider these settings are for
    pub kind: ProviderKind,

    /// API key (sent as `x-api-key`, bearer token or `x-goog-api-key` header)
    pub api_key: String,

    /// Model identifier (Doubao: the Ark endpoint/model id)
    pub model: String,

    /// API base URL, without trailing slash
    pub base_url: String,

    /// Maximum tokens to generate per round
    pub max_tokens: u32,

    /// Sampling temperature (provider default when unset)
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Settings with the provider's default endpoint and model
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model: default_model(kind).into(),
            base_url: default_base_url(kind).into(),
            max_tokens: 1024,
            temperature: None,
            timeout_secs: 60,
        }
    }

    /// Read `<PREFIX>_API_KEY`, `<PREFIX>_MODEL` and `<PREFIX>_BASE_URL`
    pub fn from_env(kind: ProviderKind) -> Result<Self> {
        let prefix = env_prefix(kind);

        let api_key = std::env::var(format!("{prefix}_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ChatError::Config(format!("{prefix}_API_KEY is not set")))?;

        let mut config = Self::new(kind, api_key);
        if let Ok(model) = std::env::var(format!("{prefix}_MODEL")) {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var(format!("{prefix}_BASE_URL")) {
            config.base_url = base_url;
        }
        if let Some(max_tokens) = std::env::var(format!("{prefix}_MAX_TOKENS"))
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_tokens = max_tokens;
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Base URL with any trailing slash removed
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

pub const fn env_prefix(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Claude => "ANTHROPIC",
        ProviderKind::OpenAi => "OPENAI",
        ProviderKind::Gemini => "GEMINI",
        ProviderKind::Doubao => "DOUBAO",
    }
}

const fn default_base_url(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Claude => "https://api.anthropic.com",
        ProviderKind::OpenAi => "https://api.openai.com/v1",
        ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        ProviderKind::Doubao => "https://ark.cn-beijing.volces.com/api/v3",
    }
}

const fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Claude => "claude-3-5-sonnet-20241022",
        ProviderKind::OpenAi => "gpt-4o-mini",
        ProviderKind::Gemini => "gemini-1.5-flash",
        ProviderKind::Doubao => "doubao-1-5-pro-32k-250115",
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
