//! OpenAI-Compatible Adapter
//!
//! Chat completions with `tools` of type `function`. Also serves Doubao:
//! Volcengine Ark exposes the same wire format under a different base URL,
//! with the Ark model/endpoint id in `model`.

use async_trait::async_trait;
use chat_core::{
    ChatError, Message, ProviderAdapter, ProviderKind, Result, Round, ToolArgs, ToolDescriptor,
    ToolInvocationRequest, ToolInvocationResult, Turn, message::split_system,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ProviderConfig;
use crate::http::{self, protocol};

/// Native conversation state threaded between rounds
#[derive(Clone, Debug)]
pub struct OpenAiState {
    tools: Vec<Value>,
    messages: Vec<Value>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Value],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [Value],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Deserialize)]
struct ApiToolCall {
    id: String,
    function: ApiFunctionCall,
}

#[derive(Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

/// Adapter for OpenAI and Doubao chat completions
pub struct OpenAiAdapter {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if !matches!(config.kind, ProviderKind::OpenAi | ProviderKind::Doubao) {
            return Err(ChatError::Config(format!(
                "OpenAI-compatible adapter given {} configuration",
                config.kind
            )));
        }

        Ok(Self {
            client: http::build_client(&config)?,
            config,
        })
    }

    fn declare_tools(tools: &[ToolDescriptor]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.json_schema(),
                    }
                })
            })
            .collect()
    }

    /// System prompt first, then the user/assistant turns
    fn convert_messages(system: &str, conversation: &[&Message]) -> Vec<Value> {
        let system = (!system.is_empty()).then(|| json!({ "role": "system", "content": system }));

        system
            .into_iter()
            .chain(
                conversation
                    .iter()
                    .filter(|m| !m.content.trim().is_empty())
                    .map(|m| json!({ "role": m.role.to_string(), "content": m.content })),
            )
            .collect()
    }

    /// One `tool` message per result
    fn convert_results(results: &[ToolInvocationResult]) -> impl Iterator<Item = Value> + '_ {
        results.iter().map(|r| {
            json!({
                "role": "tool",
                "tool_call_id": r.id,
                "content": r.payload,
            })
        })
    }

    fn interpret(&self, message: AssistantMessage) -> Result<Turn> {
        let provider = self.config.kind;
        let calls = message.tool_calls.unwrap_or_default();

        if !calls.is_empty() {
            let requests = calls
                .into_iter()
                .map(|call| {
                    let args = parse_arguments(provider, &call.function.arguments)?;
                    Ok(ToolInvocationRequest::new(call.id, call.function.name, args))
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Turn::ToolRequests(requests));
        }

        match message.content {
            Some(text) if !text.trim().is_empty() => Ok(Turn::FinalAnswer(text)),
            _ => Err(protocol(provider, "response contained neither text nor tool calls")),
        }
    }

    async fn round(&self, mut state: OpenAiState) -> Result<Round<OpenAiState>> {
        let provider = self.config.kind;
        let request = CompletionRequest {
            model: &self.config.model,
            messages: &state.messages,
            tools: &state.tools,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        tracing::debug!(provider = %provider, model = %self.config.model, messages = state.messages.len(), "Sending round");

        let body = http::send_json(
            provider,
            self.client
                .post(self.config.endpoint("chat/completions"))
                .bearer_auth(&self.config.api_key)
                .json(&request),
        )
        .await?;

        let message = body
            .pointer("/choices/0/message")
            .cloned()
            .ok_or_else(|| protocol(provider, "response has no choices[0].message"))?;
        let turn = self.interpret(http::decode(provider, message.clone(), "assistant message")?)?;

        state.messages.push(message);
        Ok(Round::new(state, turn))
    }
}

/// `arguments` is a JSON-encoded string; empty means no arguments
fn parse_arguments(provider: ProviderKind, raw: &str) -> Result<ToolArgs> {
    if raw.trim().is_empty() {
        return Ok(ToolArgs::new());
    }
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| protocol(provider, format!("tool arguments are not valid JSON: {e}")))?;
    http::tool_args(provider, value)
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    type State = OpenAiState;

    fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn start_round(
        &self,
        conversation: &[Message],
        tools: &[ToolDescriptor],
        system_prompt: &str,
    ) -> Result<Round<OpenAiState>> {
        let (system, turns) = split_system(system_prompt, conversation);
        let state = OpenAiState {
            tools: Self::declare_tools(tools),
            messages: Self::convert_messages(&system, &turns),
        };
        self.round(state).await
    }

    async fn continue_round(
        &self,
        mut state: OpenAiState,
        results: &[ToolInvocationResult],
    ) -> Result<Round<OpenAiState>> {
        state.messages.extend(Self::convert_results(results));
        self.round(state).await
    }
}
