//! # chat-core
//!
//! Provider-agnostic tool-calling core for a wallet-aware chat assistant.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        ToolCallLoop                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │ ToolExecutor │──│ ToolRegistry │  │  ProviderAdapter   │  │
//! │  │ (join_all)   │  │ (read-only)  │  │  (Strategy)        │  │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `ProviderAdapter` trait hides each provider's wire format (Claude,
//! OpenAI, Gemini, Doubao) so a single loop drives all of them.

pub mod error;
pub mod executor;
pub mod message;
pub mod provider;
pub mod tool;
pub mod tool_loop;

pub use error::{ChatError, Result};
pub use executor::ToolExecutor;
pub use message::{Message, Role};
pub use provider::{ProviderAdapter, ProviderKind, Round, Turn};
pub use tool::{
    ParameterSpec, Tool, ToolArgs, ToolDescriptor, ToolInvocationRequest, ToolInvocationResult,
    ToolRegistry,
};
pub use tool_loop::{ChatInput, ChatReply, LoopConfig, ToolCallLoop, ToolExchange};

/// Re-exported so callers don't need a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
