//! Provider Adapter Strategy Pattern
//!
//! Defines the contract every hosted model provider (Claude, OpenAI, Gemini,
//! Doubao) implements, so the tool-call loop never sees a wire format.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_core::provider::ProviderAdapter;
//!
//! let round = adapter.start_round(&conversation, &tools, system_prompt).await?;
//! match round.turn {
//!     Turn::FinalAnswer(text) => println!("{text}"),
//!     Turn::ToolRequests(requests) => {
//!         let results = executor.run_batch(&requests).await;
//!         let next = adapter.continue_round(round.state, &results).await?;
//!     }
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::message::Message;
use crate::tool::{ToolDescriptor, ToolInvocationRequest, ToolInvocationResult};

/// Supported hosted providers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic messages API
    Claude,
    /// OpenAI chat completions
    #[serde(rename = "openai")]
    OpenAi,
    /// Google Gemini generateContent
    Gemini,
    /// Volcengine Ark (OpenAI-compatible)
    Doubao,
}

impl ProviderKind {
    pub const ALL: [Self; 4] = [Self::Claude, Self::OpenAi, Self::Gemini, Self::Doubao];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Doubao => "doubao",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Claude),
            "openai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            "doubao" | "ark" => Ok(Self::Doubao),
            other => Err(ChatError::Config(format!("Unknown provider: {other}"))),
        }
    }
}

/// Outcome of one provider round. Exactly one variant is populated.
#[derive(Clone, Debug, PartialEq)]
pub enum Turn {
    /// Terminal natural-language answer
    FinalAnswer(String),
    /// The provider wants these tools executed before it continues
    ToolRequests(Vec<ToolInvocationRequest>),
}

/// A parsed turn plus the adapter-owned state needed to continue it
#[derive(Debug)]
pub struct Round<S> {
    pub state: S,
    pub turn: Turn,
}

impl<S> Round<S> {
    pub const fn new(state: S, turn: Turn) -> Self {
        Self { state, turn }
    }
}

/// Provider adapter trait (Strategy pattern)
///
/// `State` is opaque to the loop. It holds the accumulated history in the
/// provider's native shape and is threaded from round to round; adapters must
/// not rebuild it from generic messages, because "assistant requested tool X"
/// does not round-trip through plain text.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Native conversation state carried between rounds
    type State: Send;

    /// Which provider this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// Model identifier sent with each request
    fn model(&self) -> &str;

    /// Issue the initial provider call
    async fn start_round(
        &self,
        conversation: &[Message],
        tools: &[ToolDescriptor],
        system_prompt: &str,
    ) -> Result<Round<Self::State>>;

    /// Issue a follow-up call carrying one result per request of the previous turn
    async fn continue_round(
        &self,
        state: Self::State,
        results: &[ToolInvocationResult],
    ) -> Result<Round<Self::State>>;
}
