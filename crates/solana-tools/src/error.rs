//! Error Types for Solana Tools

use chat_core::ChatError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolkitError>;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("RPC error {code} in {method}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("Price unavailable for {0}")]
    PriceUnavailable(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Never carries the request URL, which may embed an RPC api key
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ToolkitError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}

impl From<ToolkitError> for ChatError {
    fn from(err: ToolkitError) -> Self {
        match err {
            ToolkitError::InvalidAddress(_) | ToolkitError::InvalidArgument(_) => {
                Self::ToolValidation(err.to_string())
            }
            other => Self::ToolExecution(other.to_string()),
        }
    }
}
