//! # chat-providers
//!
//! Hosted model providers for the chat-core tool-call loop.
//!
//! ## Providers
//!
//! - **Claude**: Anthropic messages API (`tool_use` / `tool_result`)
//! - **OpenAI**: chat completions (`tool_calls` / `role: tool`)
//! - **Gemini**: generateContent (`functionCall` / `functionResponse`)
//! - **Doubao**: Volcengine Ark, OpenAI-compatible
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_providers::{Provider, ProviderConfig};
//!
//! let provider = Provider::from_config(ProviderConfig::from_env(ProviderKind::Claude)?)?;
//! let reply = provider.send(&tool_loop, &input, &cancel).await?;
//! ```

pub mod claude;
pub mod config;
pub mod gemini;
pub mod http;
pub mod openai;

pub use claude::ClaudeAdapter;
pub use config::ProviderConfig;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

// Re-export core types for convenience
pub use chat_core::{
    CancellationToken, ChatError, ChatInput, ChatReply, Message, ProviderAdapter, ProviderKind,
    Result, ToolCallLoop,
};

/// A configured adapter, selected at runtime
pub enum Provider {
    Claude(ClaudeAdapter),
    OpenAi(OpenAiAdapter),
    Gemini(GeminiAdapter),
}

impl Provider {
    /// Build the adapter matching `config.kind`
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        Ok(match config.kind {
            ProviderKind::Claude => Self::Claude(ClaudeAdapter::new(config)?),
            ProviderKind::OpenAi | ProviderKind::Doubao => Self::OpenAi(OpenAiAdapter::new(config)?),
            ProviderKind::Gemini => Self::Gemini(GeminiAdapter::new(config)?),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Claude(a) => a.kind(),
            Self::OpenAi(a) => a.kind(),
            Self::Gemini(a) => a.kind(),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::Claude(a) => a.model(),
            Self::OpenAi(a) => a.model(),
            Self::Gemini(a) => a.model(),
        }
    }

    /// Run one send through the loop with this provider
    pub async fn send(
        &self,
        tool_loop: &ToolCallLoop,
        input: &ChatInput,
        cancel: &CancellationToken,
    ) -> Result<ChatReply> {
        match self {
            Self::Claude(a) => tool_loop.run(a, input, cancel).await,
            Self::OpenAi(a) => tool_loop.run(a, input, cancel).await,
            Self::Gemini(a) => tool_loop.run(a, input, cancel).await,
        }
    }
}
