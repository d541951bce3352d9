//! Tool-Call Loop
//!
//! Provider-agnostic driver: ask the adapter for a turn, execute any
//! requested tools, hand the results back, and repeat until the provider
//! answers in plain text.
//!
//! ```text
//! Started ──▶ AwaitingProvider ──▶ Done
//!                 │     ▲
//!                 ▼     │
//!             ExecutingTools        (any error / ceiling / cancel ──▶ Failed)
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{ChatError, Result};
use crate::executor::ToolExecutor;
use crate::message::Message;
use crate::provider::{ProviderAdapter, ProviderKind, Round, Turn};
use crate::tool::{ToolDescriptor, ToolInvocationRequest, ToolInvocationResult};

/// Default ceiling on provider rounds per send
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Loop configuration
#[derive(Clone, Debug)]
pub struct LoopConfig {
    /// Maximum provider rounds before giving up
    pub max_rounds: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl LoopConfig {
    pub fn from_env() -> Self {
        let max_rounds = std::env::var("CHAT_MAX_TOOL_ROUNDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_ROUNDS);

        Self { max_rounds }
    }
}

/// What the caller hands the loop for one send
#[derive(Clone, Debug, Default)]
pub struct ChatInput {
    /// Conversation so far, ending with the user's new message
    pub conversation: Vec<Message>,

    /// Base system prompt
    pub system_prompt: String,

    /// Connected wallet, if any
    pub wallet_address: Option<String>,

    /// Whether tool declarations are sent to the provider
    pub tools_enabled: bool,
}

impl ChatInput {
    pub fn new(conversation: Vec<Message>) -> Self {
        Self {
            conversation,
            system_prompt: String::new(),
            wallet_address: None,
            tools_enabled: true,
        }
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn wallet(mut self, address: impl Into<String>) -> Self {
        self.wallet_address = Some(address.into());
        self
    }

    #[must_use]
    pub const fn tools_enabled(mut self, enabled: bool) -> Self {
        self.tools_enabled = enabled;
        self
    }

    /// System prompt with the wallet context paragraph appended
    pub fn full_system_prompt(&self) -> String {
        let mut prompt = self.system_prompt.trim().to_string();

        if let Some(address) = self.wallet_address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            if !prompt.is_empty() {
                prompt.push_str("\n\n");
            }
            prompt.push_str(&format!(
                "The user has connected the Solana wallet {address}. \
                 When they refer to their wallet or balance, use this address as the tool argument."
            ));
        }

        prompt
    }
}

/// One executed tool call and its result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolExchange {
    /// Provider round that requested the call (1-based)
    pub round: usize,
    pub request: ToolInvocationRequest,
    pub result: ToolInvocationResult,
}

/// Successful loop outcome
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatReply {
    /// Final assistant message, tagged with provider and model
    pub message: Message,

    /// Intermediate tool exchanges in execution order
    pub exchanges: Vec<ToolExchange>,

    /// Provider rounds used
    pub rounds: usize,
}

impl ChatReply {
    /// Final answer text
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Loop state, logged at each transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopPhase {
    Started,
    AwaitingProvider { round: usize },
    ExecutingTools { round: usize, requests: usize },
    Done,
    Failed,
}

/// The provider-agnostic tool-call loop
#[derive(Clone)]
pub struct ToolCallLoop {
    executor: ToolExecutor,
    config: LoopConfig,
}

impl ToolCallLoop {
    pub const fn new(executor: ToolExecutor, config: LoopConfig) -> Self {
        Self { executor, config }
    }

    /// Create with default configuration
    pub fn with_defaults(executor: ToolExecutor) -> Self {
        Self::new(executor, LoopConfig::default())
    }

    /// Get the executor
    pub const fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    /// Get configuration
    pub const fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run one send to completion.
    ///
    /// On cancellation no new provider or tool calls are started; calls
    /// already in flight are awaited before `Cancelled` is returned.
    pub async fn run<A: ProviderAdapter>(
        &self,
        adapter: &A,
        input: &ChatInput,
        cancel: &CancellationToken,
    ) -> Result<ChatReply> {
        let provider = adapter.kind();
        transition(provider, LoopPhase::Started);

        match self.drive(adapter, input, cancel).await {
            Ok(reply) => {
                transition(provider, LoopPhase::Done);
                tracing::info!(
                    provider = %provider,
                    model = adapter.model(),
                    rounds = reply.rounds,
                    tool_calls = reply.exchanges.len(),
                    "Chat loop finished"
                );
                Ok(reply)
            }
            Err(e) => {
                transition(provider, LoopPhase::Failed);
                tracing::warn!(provider = %provider, error = %e, "Chat loop failed");
                Err(e)
            }
        }
    }

    async fn drive<A: ProviderAdapter>(
        &self,
        adapter: &A,
        input: &ChatInput,
        cancel: &CancellationToken,
    ) -> Result<ChatReply> {
        if input.conversation.is_empty() {
            return Err(ChatError::InvalidRequest("conversation is empty".into()));
        }

        let provider = adapter.kind();
        let tools: Vec<ToolDescriptor> = if input.tools_enabled {
            self.executor.registry().describe_all()
        } else {
            Vec::new()
        };
        let system_prompt = input.full_system_prompt();

        let mut exchanges = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut round = 1;

        ensure_live(cancel)?;
        transition(provider, LoopPhase::AwaitingProvider { round });
        let Round { mut state, mut turn } = adapter
            .start_round(&input.conversation, &tools, &system_prompt)
            .await?;

        loop {
            ensure_live(cancel)?;

            let requests = match turn {
                Turn::FinalAnswer(text) => {
                    return Ok(ChatReply {
                        message: Message::assistant(text).with_origin(provider, adapter.model()),
                        exchanges,
                        rounds: round,
                    });
                }
                Turn::ToolRequests(requests) => requests,
            };

            check_requests(provider, &requests, &mut seen_ids)?;

            transition(provider, LoopPhase::ExecutingTools { round, requests: requests.len() });
            let results = self.executor.run_batch(&requests).await;
            record(&mut exchanges, round, requests, &results);

            if round >= self.config.max_rounds {
                return Err(ChatError::ToolLoopExceeded(self.config.max_rounds));
            }
            ensure_live(cancel)?;

            round += 1;
            transition(provider, LoopPhase::AwaitingProvider { round });
            let next = adapter.continue_round(state, &results).await?;
            state = next.state;
            turn = next.turn;
        }
    }
}

fn transition(provider: ProviderKind, phase: LoopPhase) {
    tracing::debug!(provider = %provider, phase = ?phase, "Tool loop transition");
}

fn ensure_live(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(ChatError::Cancelled)
    } else {
        Ok(())
    }
}

/// A tool turn must be non-empty and carry ids unseen in this execution
fn check_requests(
    provider: ProviderKind,
    requests: &[ToolInvocationRequest],
    seen_ids: &mut HashSet<String>,
) -> Result<()> {
    if requests.is_empty() {
        return Err(ChatError::ProviderProtocol {
            provider,
            message: "tool request turn without any tool calls".into(),
        });
    }

    for request in requests {
        if !seen_ids.insert(request.id.clone()) {
            return Err(ChatError::ProviderProtocol {
                provider,
                message: format!("duplicate tool call id '{}'", request.id),
            });
        }
    }

    Ok(())
}

fn record(
    exchanges: &mut Vec<ToolExchange>,
    round: usize,
    requests: Vec<ToolInvocationRequest>,
    results: &[ToolInvocationResult],
) {
    exchanges.extend(requests.into_iter().zip(results.iter().cloned()).map(
        |(request, result)| ToolExchange {
            round,
            request,
            result,
        },
    ));
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::tool::{ParameterSpec, ToolArgs, ToolRegistry};

    type Script = Box<dyn Fn(usize, &[ToolInvocationResult]) -> Result<Turn> + Send + Sync>;

    /// Deterministic adapter that answers from a script keyed by round
    struct StubAdapter {
        script: Script,
        calls: AtomicUsize,
        submitted: Mutex<Vec<Vec<ToolInvocationResult>>>,
        seen_prompt: Mutex<Option<(String, Vec<String>)>>,
    }

    impl StubAdapter {
        fn new(script: impl Fn(usize, &[ToolInvocationResult]) -> Result<Turn> + Send + Sync + 'static) -> Self {
            Self {
                script: Box::new(script),
                calls: AtomicUsize::new(0),
                submitted: Mutex::new(Vec::new()),
                seen_prompt: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        type State = usize;

        fn kind(&self) -> ProviderKind {
            ProviderKind::Claude
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        async fn start_round(
            &self,
            _conversation: &[Message],
            tools: &[ToolDescriptor],
            system_prompt: &str,
        ) -> Result<Round<usize>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let names = tools.iter().map(|t| t.name.clone()).collect();
            *self.seen_prompt.lock().unwrap() = Some((system_prompt.to_string(), names));
            Ok(Round::new(1, (self.script)(1, &[])?))
        }

        async fn continue_round(&self, state: usize, results: &[ToolInvocationResult]) -> Result<Round<usize>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.submitted.lock().unwrap().push(results.to_vec());
            let round = state + 1;
            Ok(Round::new(round, (self.script)(round, results)?))
        }
    }

    fn balance_request(id: &str) -> ToolInvocationRequest {
        let mut args = ToolArgs::new();
        args.insert("address".into(), json!("ABC"));
        ToolInvocationRequest::new(id, "get_sol_balance", args)
    }

    /// Loop over a registry whose `get_sol_balance` counts its invocations
    fn counting_loop(executions: Arc<AtomicUsize>) -> ToolCallLoop {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(
                ToolDescriptor::new("get_sol_balance", "Get SOL balance")
                    .param("address", ParameterSpec::required("string", "Wallet address")),
                move |_| {
                    let executions = executions.clone();
                    async move {
                        executions.fetch_add(1, Ordering::SeqCst);
                        Ok(Value::String("{\"balance\":1.5}".into()))
                    }
                },
            )
            .unwrap();
        ToolCallLoop::with_defaults(ToolExecutor::new(Arc::new(registry)))
    }

    fn hello() -> ChatInput {
        ChatInput::new(vec![Message::user("Hello")])
    }

    #[tokio::test]
    async fn test_no_tools_needed() {
        let executions = Arc::new(AtomicUsize::new(0));
        let chat_loop = counting_loop(executions.clone());
        let adapter = StubAdapter::new(|_, _| Ok(Turn::FinalAnswer("Hi there!".into())));

        let reply = chat_loop.run(&adapter, &hello(), &CancellationToken::new()).await.unwrap();

        assert_eq!(reply.text(), "Hi there!");
        assert_eq!(reply.rounds, 1);
        assert_eq!(reply.message.provider, Some(ProviderKind::Claude));
        assert_eq!(adapter.calls(), 1);
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_tool_round_trip() {
        let executions = Arc::new(AtomicUsize::new(0));
        let chat_loop = counting_loop(executions.clone());
        let adapter = StubAdapter::new(|round, results| match round {
            1 => Ok(Turn::ToolRequests(vec![balance_request("t1")])),
            _ => {
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].id, "t1");
                assert_eq!(results[0].payload, "{\"balance\":1.5}");
                Ok(Turn::FinalAnswer("Your balance is 1.5 SOL.".into()))
            }
        });

        let input = ChatInput::new(vec![Message::user("What's my balance?")]);
        let reply = chat_loop.run(&adapter, &input, &CancellationToken::new()).await.unwrap();

        assert_eq!(reply.text(), "Your balance is 1.5 SOL.");
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert_eq!(reply.exchanges.len(), 1);
        assert_eq!(reply.exchanges[0].round, 1);
        assert_eq!(reply.exchanges[0].request.id, "t1");
        assert!(reply.exchanges[0].result.success);
    }

    #[tokio::test]
    async fn test_every_request_gets_exactly_one_result() {
        let executions = Arc::new(AtomicUsize::new(0));
        let chat_loop = counting_loop(executions.clone());
        let adapter = StubAdapter::new(|round, _| match round {
            1 => Ok(Turn::ToolRequests(vec![
                balance_request("a"),
                balance_request("b"),
                balance_request("c"),
            ])),
            _ => Ok(Turn::FinalAnswer("done".into())),
        });

        chat_loop.run(&adapter, &hello(), &CancellationToken::new()).await.unwrap();

        assert_eq!(executions.load(Ordering::SeqCst), 3);
        let submitted = adapter.submitted.lock().unwrap();
        let ids: HashSet<&str> = submitted[0].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, HashSet::from(["a", "b", "c"]));
    }

    #[tokio::test]
    async fn test_failing_tool_does_not_abort_loop() {
        let chat_loop = counting_loop(Arc::new(AtomicUsize::new(0)));
        let adapter = StubAdapter::new(|round, results| match round {
            1 => Ok(Turn::ToolRequests(vec![ToolInvocationRequest::new(
                "x1",
                "get_nft_floor",
                ToolArgs::new(),
            )])),
            _ => {
                let payload: Value = serde_json::from_str(&results[0].payload).unwrap();
                assert!(payload["error"].is_string());
                assert!(!results[0].success);
                Ok(Turn::FinalAnswer("That tool is not available.".into()))
            }
        });

        let reply = chat_loop.run(&adapter, &hello(), &CancellationToken::new()).await.unwrap();
        assert_eq!(reply.text(), "That tool is not available.");
        assert_eq!(reply.rounds, 2);
    }

    #[tokio::test]
    async fn test_provider_error_fails_immediately() {
        let executions = Arc::new(AtomicUsize::new(0));
        let chat_loop = counting_loop(executions.clone());
        let adapter = StubAdapter::new(|_, _| {
            Err(ChatError::ProviderApi {
                provider: ProviderKind::Claude,
                status: 401,
                message: "invalid api key".into(),
            })
        });

        let err = chat_loop.run(&adapter, &hello(), &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ChatError::ProviderApi { ref message, .. } if message == "invalid api key"));
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_loop_ceiling() {
        let executions = Arc::new(AtomicUsize::new(0));
        let chat_loop = counting_loop(executions.clone());
        let adapter = StubAdapter::new(|round, _| {
            Ok(Turn::ToolRequests(vec![balance_request(&format!("t{round}"))]))
        });

        let err = chat_loop.run(&adapter, &hello(), &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ChatError::ToolLoopExceeded(10)));
        assert_eq!(executions.load(Ordering::SeqCst), DEFAULT_MAX_ROUNDS);
        assert_eq!(adapter.calls(), DEFAULT_MAX_ROUNDS);
    }

    #[tokio::test]
    async fn test_replay_is_deterministic() {
        let script = |round: usize, _: &[ToolInvocationResult]| match round {
            1 => Ok(Turn::ToolRequests(vec![balance_request("t1")])),
            _ => Ok(Turn::FinalAnswer("Your balance is 1.5 SOL.".into())),
        };
        let chat_loop = counting_loop(Arc::new(AtomicUsize::new(0)));

        let first = chat_loop
            .run(&StubAdapter::new(script), &hello(), &CancellationToken::new())
            .await
            .unwrap();
        let second = chat_loop
            .run(&StubAdapter::new(script), &hello(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(first.text(), second.text());
        assert_eq!(first.exchanges, second.exchanges);
    }

    #[tokio::test]
    async fn test_duplicate_correlation_id_is_protocol_error() {
        let chat_loop = counting_loop(Arc::new(AtomicUsize::new(0)));
        let adapter = StubAdapter::new(|_, _| Ok(Turn::ToolRequests(vec![balance_request("same")])));

        let err = chat_loop.run(&adapter, &hello(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ChatError::ProviderProtocol { .. }));
        assert_eq!(adapter.calls(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let chat_loop = counting_loop(Arc::new(AtomicUsize::new(0)));
        let adapter = StubAdapter::new(|_, _| Ok(Turn::FinalAnswer("unused".into())));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = chat_loop.run(&adapter, &hello(), &cancel).await.unwrap_err();
        assert!(matches!(err, ChatError::Cancelled));
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_tools_lets_batch_settle() {
        let cancel = CancellationToken::new();
        let executions = Arc::new(AtomicUsize::new(0));

        let mut registry = ToolRegistry::new();
        let (token, count) = (cancel.clone(), executions.clone());
        registry
            .register_fn(ToolDescriptor::new("get_sol_balance", "Get SOL balance"), move |_| {
                let (token, count) = (token.clone(), count.clone());
                async move {
                    token.cancel();
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    count.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({"balance": 1.5}))
                }
            })
            .unwrap();
        let chat_loop = ToolCallLoop::with_defaults(ToolExecutor::new(Arc::new(registry)));
        let adapter = StubAdapter::new(|_, _| {
            Ok(Turn::ToolRequests(vec![balance_request("a"), balance_request("b")]))
        });

        let err = chat_loop.run(&adapter, &hello(), &cancel).await.unwrap_err();

        assert!(matches!(err, ChatError::Cancelled));
        assert_eq!(executions.load(Ordering::SeqCst), 2);
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test]
    async fn test_wallet_context_and_tool_flag() {
        let chat_loop = counting_loop(Arc::new(AtomicUsize::new(0)));

        let adapter = StubAdapter::new(|_, _| Ok(Turn::FinalAnswer("ok".into())));
        let input = hello().system_prompt("You are a wallet assistant.").wallet("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU");
        chat_loop.run(&adapter, &input, &CancellationToken::new()).await.unwrap();
        let (prompt, tools) = adapter.seen_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.starts_with("You are a wallet assistant."));
        assert!(prompt.contains("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"));
        assert_eq!(tools, vec!["get_sol_balance"]);

        let adapter = StubAdapter::new(|_, _| Ok(Turn::FinalAnswer("ok".into())));
        chat_loop
            .run(&adapter, &hello().tools_enabled(false), &CancellationToken::new())
            .await
            .unwrap();
        let (prompt, tools) = adapter.seen_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.is_empty());
        assert!(tools.is_empty());
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected() {
        let chat_loop = counting_loop(Arc::new(AtomicUsize::new(0)));
        let adapter = StubAdapter::new(|_, _| Ok(Turn::FinalAnswer("unused".into())));

        let err = chat_loop
            .run(&adapter, &ChatInput::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidRequest(_)));
        assert_eq!(adapter.calls(), 0);
    }
}
