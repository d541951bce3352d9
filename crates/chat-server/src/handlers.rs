//! HTTP Handlers

use std::time::Duration;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use chat_core::{
    CancellationToken, ChatError, ChatInput, Message, ProviderKind, ToolDescriptor, ToolExchange,
};
use solana_tools::{SOLANA_ASSISTANT_PROMPT, model::validate_address};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub providers: Vec<ProviderKind>,
    pub default_provider: ProviderKind,
    pub tools: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Provider name; the server default when absent
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default = "default_true")]
    pub tools_enabled: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: Message,
    pub tool_calls: Vec<ToolExchange>,
    pub rounds: usize,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Error body plus status for a failed request
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_REQUEST",
            message: message.into(),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let (status, code) = match &err {
            ChatError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ChatError::Config(_) => (StatusCode::BAD_REQUEST, "PROVIDER_NOT_CONFIGURED"),
            ChatError::ProviderApi { .. } => (StatusCode::BAD_GATEWAY, "PROVIDER_API_ERROR"),
            ChatError::ProviderProtocol { .. } => (StatusCode::BAD_GATEWAY, "PROVIDER_PROTOCOL_ERROR"),
            ChatError::ProviderUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_UNAVAILABLE"),
            ChatError::ToolLoopExceeded(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TOOL_LOOP_EXCEEDED"),
            ChatError::Cancelled => (StatusCode::GATEWAY_TIMEOUT, "CANCELLED"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = match &err {
            ChatError::Config(msg) => msg.clone(),
            other => other.user_message(),
        };

        Self { status, code, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.into(),
        };
        (self.status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        providers: state.configured(),
        default_provider: state.default_provider,
        tools: state.tool_loop.executor().registry().len(),
    })
}

/// Tool declarations sent to providers
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolDescriptor>> {
    Json(state.tool_loop.executor().registry().describe_all())
}

/// Main chat endpoint: runs the tool-calling loop to a final answer
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::invalid_request(e.body_text()))?;

    let kind = match payload.provider.as_deref() {
        Some(name) => name
            .parse::<ProviderKind>()
            .map_err(|_| ApiError::invalid_request(format!("unknown provider '{name}'")))?,
        None => state.default_provider,
    };
    let provider = state.provider(kind, payload.model.as_deref())?;

    let mut input = ChatInput::new(payload.messages)
        .system_prompt(payload.system_prompt.unwrap_or_else(|| SOLANA_ASSISTANT_PROMPT.into()))
        .tools_enabled(payload.tools_enabled);
    if let Some(wallet) = payload.wallet_address.as_deref().filter(|w| !w.trim().is_empty()) {
        let wallet = validate_address(wallet).map_err(|e| ApiError::invalid_request(e.to_string()))?;
        input = input.wallet(wallet);
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("chat", %request_id, provider = %kind, model = provider.model());

    let cancel = CancellationToken::new();
    let deadline = tokio::spawn(cancel_after(cancel.clone(), state.request_timeout));

    let result = provider
        .send(&state.tool_loop, &input, &cancel)
        .instrument(span)
        .await;
    deadline.abort();

    let reply = result.map_err(|e| {
        tracing::error!(%request_id, "Chat error: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(ChatResponse {
        message: reply.message,
        tool_calls: reply.exchanges,
        rounds: reply.rounds,
        request_id,
    }))
}

async fn cancel_after(cancel: CancellationToken, timeout: Duration) {
    tokio::time::sleep(timeout).await;
    tracing::warn!(timeout_secs = timeout.as_secs_f64(), "Request deadline reached, cancelling");
    cancel.cancel();
}
