//! Shared HTTP Transport
//!
//! One POST per round. Status and body handling is identical across
//! providers: all four put the human-readable failure in `error.message`.

use std::time::Duration;

use chat_core::{ChatError, ProviderKind, Result, ToolArgs};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ProviderConfig;

/// Build a client honoring the configured timeout
pub fn build_client(config: &ProviderConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ChatError::Config(format!("HTTP client: {e}")))
}

/// Send a prepared request and return the JSON body of a 2xx response
pub async fn send_json(provider: ProviderKind, request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| unavailable(provider, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| unavailable(provider, e))?;

    if !status.is_success() {
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        tracing::warn!(provider = %provider, status = status.as_u16(), error = %message, "Provider rejected request");
        return Err(ChatError::ProviderApi {
            provider,
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| protocol(provider, format!("response is not JSON: {e}")))
}

/// Transport failure; the URL is dropped since it may carry credentials
fn unavailable(provider: ProviderKind, err: reqwest::Error) -> ChatError {
    ChatError::ProviderUnavailable(format!("{provider}: {}", err.without_url()))
}

/// Decode part of a response into a typed shape
pub fn decode<T: DeserializeOwned>(provider: ProviderKind, value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| protocol(provider, format!("unexpected {what}: {e}")))
}

/// Tool arguments must be a JSON object; `null` means no arguments
pub fn tool_args(provider: ProviderKind, value: Value) -> Result<ToolArgs> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ToolArgs::new()),
        other => Err(protocol(provider, format!("tool arguments are not an object: {other}"))),
    }
}

pub fn protocol(provider: ProviderKind, message: impl Into<String>) -> ChatError {
    ChatError::ProviderProtocol {
        provider,
        message: message.into(),
    }
}

/// Extract the provider's own error message from a failure body
fn error_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let trimmed = body.trim();
        return (!trimmed.is_empty()).then(|| trimmed.chars().take(300).collect());
    };

    // Gemini occasionally wraps the error object in a one-element array
    let value = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    };

    value
        .pointer("/error/message")
        .or_else(|| value.get("error").filter(|e| e.is_string()))
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
