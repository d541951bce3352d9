//! Gemini Adapter
//!
//! `generateContent` with `functionDeclarations`. The model answers with
//! `functionCall` parts and expects `functionResponse` parts back. Older
//! model versions omit call ids, so the adapter derives one per call.

use std::collections::HashSet;

use async_trait::async_trait;
use chat_core::{
    ChatError, Message, ProviderAdapter, ProviderKind, Result, Role, Round, ToolDescriptor,
    ToolInvocationRequest, ToolInvocationResult, Turn, message::split_system,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ProviderConfig;
use crate::http::{self, protocol};

const PROVIDER: ProviderKind = ProviderKind::Gemini;

/// Native conversation state threaded between rounds
#[derive(Clone, Debug)]
pub struct GeminiState {
    system_instruction: Option<Value>,
    tools: Vec<Value>,
    contents: Vec<Value>,
    round: usize,
    /// Ids that came from Gemini itself and must be echoed back
    native_ids: HashSet<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: &'a [Value],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<&'a Value>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [Value],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
    #[serde(default)]
    id: Option<String>,
}

/// Adapter for the Gemini generateContent API
pub struct GeminiAdapter {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl GeminiAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.kind != PROVIDER {
            return Err(ChatError::Config(format!(
                "Gemini adapter given {} configuration",
                config.kind
            )));
        }

        Ok(Self {
            client: http::build_client(&config)?,
            config,
        })
    }

    /// Gemini rejects an object schema with no properties, so
    /// parameterless tools carry no `parameters` at all.
    fn declare_tools(tools: &[ToolDescriptor]) -> Vec<Value> {
        if tools.is_empty() {
            return Vec::new();
        }

        let declarations: Vec<Value> = tools
            .iter()
            .map(|t| {
                let mut declaration = json!({ "name": t.name, "description": t.description });
                if !t.params.is_empty() {
                    declaration["parameters"] = t.json_schema();
                }
                declaration
            })
            .collect();

        vec![json!({ "functionDeclarations": declarations })]
    }

    fn convert_messages(conversation: &[&Message]) -> Vec<Value> {
        conversation
            .iter()
            .filter(|m| !m.content.trim().is_empty())
            .map(|m| {
                let role = if m.role == Role::Assistant { "model" } else { "user" };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect()
    }

    fn convert_results(results: &[ToolInvocationResult], native_ids: &HashSet<String>) -> Value {
        let parts: Vec<Value> = results
            .iter()
            .map(|r| {
                let mut response = json!({ "name": r.name, "response": response_object(&r.payload) });
                if native_ids.contains(&r.id) {
                    response["id"] = json!(r.id);
                }
                json!({ "functionResponse": response })
            })
            .collect();

        json!({ "role": "user", "parts": parts })
    }

    fn interpret(parts: Vec<Part>, state: &mut GeminiState) -> Result<Turn> {
        let mut text = String::new();
        let mut requests = Vec::new();

        for part in parts {
            if let Some(call) = part.function_call {
                let id = match call.id {
                    Some(id) => {
                        state.native_ids.insert(id.clone());
                        id
                    }
                    None => format!("{}-{}-{}", call.name, state.round, requests.len()),
                };
                requests.push(ToolInvocationRequest::new(id, call.name, http::tool_args(PROVIDER, call.args)?));
            } else if let Some(part_text) = part.text {
                text.push_str(&part_text);
            }
        }

        if !requests.is_empty() {
            return Ok(Turn::ToolRequests(requests));
        }
        if text.trim().is_empty() {
            return Err(protocol(PROVIDER, "response contained neither text nor function calls"));
        }
        Ok(Turn::FinalAnswer(text))
    }

    async fn round(&self, mut state: GeminiState) -> Result<Round<GeminiState>> {
        state.round += 1;
        let request = GenerateRequest {
            contents: &state.contents,
            system_instruction: state.system_instruction.as_ref(),
            tools: &state.tools,
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        };

        tracing::debug!(provider = %PROVIDER, model = %self.config.model, contents = state.contents.len(), "Sending round");

        let url = self
            .config
            .endpoint(&format!("models/{}:generateContent", self.config.model));
        let body = http::send_json(
            PROVIDER,
            self.client
                .post(url)
                .header("x-goog-api-key", &self.config.api_key)
                .json(&request),
        )
        .await?;

        let response: GenerateResponse = http::decode(PROVIDER, body, "generateContent response")?;
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".into());
            return Err(protocol(PROVIDER, format!("response has no candidates ({reason})")));
        };
        let Some(content) = candidate.content else {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(protocol(PROVIDER, format!("candidate has no content (finish reason: {reason})")));
        };

        let parts: Vec<Part> = http::decode(
            PROVIDER,
            content.get("parts").cloned().unwrap_or(Value::Null),
            "candidate parts",
        )?;
        let turn = Self::interpret(parts, &mut state)?;

        state.contents.push(content);
        Ok(Round::new(state, turn))
    }
}

/// `functionResponse.response` must be an object
fn response_object(payload: &str) -> Value {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(other) => json!({ "result": other }),
        Err(_) => json!({ "result": payload }),
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    type State = GeminiState;

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
    ) -> Result<Round<GeminiState>> {
        let (system, turns) = split_system(system_prompt, conversation);
        let state = GeminiState {
            system_instruction: (!system.is_empty()).then(|| json!({ "parts": [{ "text": system }] })),
            tools: Self::declare_tools(tools),
            contents: Self::convert_messages(&turns),
            round: 0,
            native_ids: HashSet::new(),
        };
        self.round(state).await
    }

    async fn continue_round(
        &self,
        mut state: GeminiState,
        results: &[ToolInvocationResult],
    ) -> Result<Round<GeminiState>> {
        let reply = Self::convert_results(results, &state.native_ids);
        state.contents.push(reply);
        self.round(state).await
    }
}
