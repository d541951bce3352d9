//! Claude Adapter
//!
//! Anthropic messages API. Tools are declared with `input_schema`, requested
//! through `tool_use` content blocks and answered with `tool_result` blocks
//! inside a user message.

use async_trait::async_trait;
use chat_core::{
    ChatError, Message, ProviderAdapter, ProviderKind, Result, Round, ToolDescriptor,
    ToolInvocationRequest, ToolInvocationResult, Turn, message::split_system,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ProviderConfig;
use crate::http::{self, protocol};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: ProviderKind = ProviderKind::Claude;

/// Native conversation state threaded between rounds
#[derive(Clone, Debug)]
pub struct ClaudeState {
    system: String,
    tools: Vec<Value>,
    messages: Vec<Value>,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: &'a [Value],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [Value],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// Adapter for the Anthropic messages API
pub struct ClaudeAdapter {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl ClaudeAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.kind != PROVIDER {
            return Err(ChatError::Config(format!(
                "Claude adapter given {} configuration",
                config.kind
            )));
        }

        Ok(Self {
            client: http::build_client(&config)?,
            config,
        })
    }

    /// Convert generic tool descriptors to Anthropic tool declarations
    fn declare_tools(tools: &[ToolDescriptor]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "input_schema": t.json_schema(),
                })
            })
            .collect()
    }

    /// Convert generic messages to Anthropic messages
    fn convert_messages(conversation: &[&Message]) -> Vec<Value> {
        conversation
            .iter()
            .filter(|m| !m.content.trim().is_empty())
            .map(|m| json!({ "role": m.role.to_string(), "content": m.content }))
            .collect()
    }

    /// One `tool_result` block per result, all inside a single user message
    fn convert_results(results: &[ToolInvocationResult]) -> Value {
        let blocks: Vec<Value> = results
            .iter()
            .map(|r| {
                json!({
                    "type": "tool_result",
                    "tool_use_id": r.id,
                    "content": r.payload,
                    "is_error": !r.success,
                })
            })
            .collect();

        json!({ "role": "user", "content": blocks })
    }

    fn interpret(response: MessagesResponse) -> Result<Turn> {
        let mut text = String::new();
        let mut requests = Vec::new();

        for block in response.content {
            match block {
                ContentBlock::Text { text: part } => text.push_str(&part),
                ContentBlock::ToolUse { id, name, input } => {
                    requests.push(ToolInvocationRequest::new(id, name, http::tool_args(PROVIDER, input)?));
                }
                ContentBlock::Other => {}
            }
        }

        if !requests.is_empty() {
            return Ok(Turn::ToolRequests(requests));
        }
        if text.trim().is_empty() {
            return Err(protocol(
                PROVIDER,
                format!(
                    "response contained neither text nor tool calls (stop_reason: {})",
                    response.stop_reason.as_deref().unwrap_or("none")
                ),
            ));
        }
        Ok(Turn::FinalAnswer(text))
    }

    async fn round(&self, mut state: ClaudeState) -> Result<Round<ClaudeState>> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: &state.system,
            messages: &state.messages,
            tools: &state.tools,
            temperature: self.config.temperature,
        };

        tracing::debug!(provider = %PROVIDER, model = %self.config.model, messages = state.messages.len(), "Sending round");

        let body = http::send_json(
            PROVIDER,
            self.client
                .post(self.config.endpoint("v1/messages"))
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&request),
        )
        .await?;

        let content = body
            .get("content")
            .cloned()
            .ok_or_else(|| protocol(PROVIDER, "response has no content"))?;
        let turn = Self::interpret(http::decode(PROVIDER, body, "messages response")?)?;

        state.messages.push(json!({ "role": "assistant", "content": content }));
        Ok(Round::new(state, turn))
    }
}

#[async_trait]
impl ProviderAdapter for ClaudeAdapter {
    type State = ClaudeState;

    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn start_round(
        &self,
        conversation: &[Message],
        tools: &[ToolDescriptor],
        system_prompt: &str,
    ) -> Result<Round<ClaudeState>> {
        let (system, turns) = split_system(system_prompt, conversation);
        let state = ClaudeState {
            system,
            tools: Self::declare_tools(tools),
            messages: Self::convert_messages(&turns),
        };
        self.round(state).await
    }

    async fn continue_round(
        &self,
        mut state: ClaudeState,
        results: &[ToolInvocationResult],
    ) -> Result<Round<ClaudeState>> {
        state.messages.push(Self::convert_results(results));
        self.round(state).await
    }
}
