//! Tool Executor
//!
//! Uniform execution of provider-requested tool calls. Failures never
//! propagate: they are downgraded to a `{"error": ...}` payload so the
//! provider can see them and decide what to do next.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{FutureExt, join_all};
use serde_json::{Value, json};

use crate::error::Result;
use crate::tool::{ToolArgs, ToolInvocationRequest, ToolInvocationResult, ToolRegistry};

/// Executes tool calls against a shared registry
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub const fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Get the tool registry
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one tool, returning its serialized payload or an error payload
    pub async fn execute(&self, name: &str, args: &ToolArgs) -> String {
        match self.try_execute(name, args).await {
            Ok(payload) => payload,
            Err(message) => error_payload(&message),
        }
    }

    /// Execute one request, keeping its correlation id
    pub async fn run(&self, request: &ToolInvocationRequest) -> ToolInvocationResult {
        tracing::debug!(tool = %request.name, id = %request.id, "Executing tool");

        match self.try_execute(&request.name, &request.args).await {
            Ok(payload) => ToolInvocationResult::success(request, payload),
            Err(message) => {
                tracing::warn!(tool = %request.name, id = %request.id, error = %message, "Tool failed");
                ToolInvocationResult::failure(request, error_payload(&message))
            }
        }
    }

    /// Execute all requests of one turn concurrently.
    ///
    /// Results come back in request order, one per request.
    pub async fn run_batch(&self, requests: &[ToolInvocationRequest]) -> Vec<ToolInvocationResult> {
        join_all(requests.iter().map(|request| self.run(request))).await
    }

    async fn try_execute(&self, name: &str, args: &ToolArgs) -> std::result::Result<String, String> {
        let tool = self.registry.lookup(name).map_err(|e| e.to_string())?;
        tool.validate(args).map_err(|e| e.to_string())?;

        let outcome: std::result::Result<Result<Value>, _> =
            AssertUnwindSafe(tool.call(args)).catch_unwind().await;

        match outcome {
            Ok(Ok(value)) => Ok(encode_payload(value)),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic) => Err(format!("Tool '{name}' panicked: {}", panic_message(&*panic))),
        }
    }
}

/// JSON strings pass through verbatim, anything else is serialized
fn encode_payload(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn error_payload(message: &str) -> String {
    json!({ "error": message }).to_string()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::ChatError;
    use crate::tool::{ParameterSpec, ToolDescriptor};

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(
                ToolDescriptor::new("get_sol_balance", "Get SOL balance")
                    .param("address", ParameterSpec::required("string", "Wallet address")),
                |_| async { Ok(Value::String("{\"balance\":1.5}".into())) },
            )
            .unwrap();
        registry
            .register_fn(ToolDescriptor::new("get_sol_price", "Get SOL price"), |_| async {
                Ok(json!({"usd": "150.25"}))
            })
            .unwrap();
        registry
            .register_fn(ToolDescriptor::new("broken", "Always fails"), |_| async {
                Err(ChatError::ToolExecution("rpc timeout".into()))
            })
            .unwrap();
        registry
            .register_fn(ToolDescriptor::new("panics", "Always panics"), |args| async move {
                assert!(args.contains_key("never"), "boom");
                Ok(Value::Null)
            })
            .unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    fn args(address: &str) -> ToolArgs {
        let mut args = ToolArgs::new();
        args.insert("address".into(), json!(address));
        args
    }

    #[tokio::test]
    async fn test_execute_passes_string_payload_through() {
        let payload = executor().execute("get_sol_balance", &args("ABC")).await;
        assert_eq!(payload, "{\"balance\":1.5}");
    }

    #[tokio::test]
    async fn test_execute_serializes_structured_payload() {
        let payload = executor().execute("get_sol_price", &ToolArgs::new()).await;
        let value: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["usd"], "150.25");
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_payload() {
        let payload = executor().execute("broken", &ToolArgs::new()).await;
        let value: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["error"], "Tool execution error: rpc timeout");
    }

    #[tokio::test]
    async fn test_unknown_tool_and_missing_args_become_error_payloads() {
        let exec = executor();

        let unknown: Value = serde_json::from_str(&exec.execute("nope", &ToolArgs::new()).await).unwrap();
        assert_eq!(unknown["error"], "Unknown tool: nope");

        let missing: Value =
            serde_json::from_str(&exec.execute("get_sol_balance", &ToolArgs::new()).await).unwrap();
        assert!(missing["error"].as_str().unwrap().contains("address"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let request = ToolInvocationRequest::new("p1", "panics", ToolArgs::new());
        let result = executor().run(&request).await;

        assert!(!result.success);
        assert_eq!(result.id, "p1");
        assert!(result.payload.contains("boom"));
    }

    #[tokio::test]
    async fn test_run_batch_keeps_request_order_and_ids() {
        let requests = vec![
            ToolInvocationRequest::new("a", "get_sol_price", ToolArgs::new()),
            ToolInvocationRequest::new("b", "broken", ToolArgs::new()),
            ToolInvocationRequest::new("c", "get_sol_balance", args("ABC")),
        ];

        let results = executor().run_batch(&requests).await;
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(
            results.iter().map(|r| r.success).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }

    #[tokio::test]
    async fn test_run_batch_is_concurrent() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut registry = ToolRegistry::new();
        let (gauge, high) = (in_flight.clone(), peak.clone());
        registry
            .register_fn(ToolDescriptor::new("slow", "Sleeps"), move |_| {
                let (gauge, high) = (gauge.clone(), high.clone());
                async move {
                    let now = gauge.fetch_add(1, Ordering::SeqCst) + 1;
                    high.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    gauge.fetch_sub(1, Ordering::SeqCst);
                    Ok(Value::Null)
                }
            })
            .unwrap();
        let exec = ToolExecutor::new(Arc::new(registry));

        let requests: Vec<_> = (0..3)
            .map(|i| ToolInvocationRequest::new(format!("s{i}"), "slow", ToolArgs::new()))
            .collect();
        let results = exec.run_batch(&requests).await;

        assert_eq!(results.len(), 3);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }
}
