//! Error Types

use thiserror::Error;

use crate::provider::ProviderKind;

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Chat error types
#[derive(Error, Debug)]
pub enum ChatError {
    /// A tool with this name is already registered
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    /// Tool not found in registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments failed validation
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool handler failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// The provider rejected the request (non-2xx response)
    #[error("{provider} API error ({status}): {message}")]
    ProviderApi {
        provider: ProviderKind,
        status: u16,
        message: String,
    },

    /// The provider answered with a shape we could not interpret
    #[error("{provider} protocol error: {message}")]
    ProviderProtocol {
        provider: ProviderKind,
        message: String,
    },

    /// Provider could not be reached
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider kept requesting tools past the round ceiling
    #[error("Tool loop exceeded {0} rounds")]
    ToolLoopExceeded(usize),

    /// The caller cancelled the send
    #[error("Cancelled")]
    Cancelled,

    /// Caller supplied an unusable request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl ChatError {
    /// Check if error is retryable by the caller
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ProviderUnavailable(_) => true,
            Self::ProviderApi { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::ProviderApi { provider, message, .. } => {
                format!("{provider} rejected the request: {message}")
            }
            Self::ProviderProtocol { provider, .. } => {
                format!("{provider} returned a response that could not be understood.")
            }
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::ToolLoopExceeded(_) => {
                "The request needed too many tool calls. Please try a simpler query.".into()
            }
            Self::Cancelled => "The request was cancelled.".into(),
            Self::InvalidRequest(msg) => format!("Invalid request: {msg}"),
            Self::UnknownTool(name) => format!("The tool '{name}' is not available."),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
