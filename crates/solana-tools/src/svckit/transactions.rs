//! Transaction Tools

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{ParameterSpec, Result as CoreResult, Tool, ToolArgs, ToolDescriptor};
use serde_json::{Value, json};

use super::{limit_arg, str_arg};
use crate::chain::ChainClient;
use crate::model::{validate_address, validate_signature};

/// Details of one confirmed transaction
pub struct TransactionTool {
    chain: Arc<dyn ChainClient>,
}

impl TransactionTool {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl Tool for TransactionTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "get_transaction",
            "Look up a confirmed Solana transaction by signature: status, fee, signers and SOL balance changes.",
        )
        .param(
            "signature",
            ParameterSpec::required("string", "Transaction signature (base58)"),
        )
    }

    async fn call(&self, args: &ToolArgs) -> CoreResult<Value> {
        let signature = validate_signature(str_arg(args, "signature")?)?;
        let tx = self.chain.transaction(signature).await?;
        Ok(serde_json::to_value(tx)?)
    }
}

/// Signature history of an address
pub struct RecentTransactionsTool {
    chain: Arc<dyn ChainClient>,
}

impl RecentTransactionsTool {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl Tool for RecentTransactionsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "get_recent_transactions",
            "List the most recent transactions involving a Solana address, newest first.",
        )
        .param(
            "address",
            ParameterSpec::required("string", "Solana wallet address (base58)"),
        )
        .param(
            "limit",
            ParameterSpec::optional("integer", "Number of transactions to return (1-25, default 10)"),
        )
    }

    async fn call(&self, args: &ToolArgs) -> CoreResult<Value> {
        let address = validate_address(str_arg(args, "address")?)?;
        let limit = limit_arg(args, 10);
        let transactions = self.chain.recent_signatures(address, limit).await?;

        Ok(json!({
            "address": address,
            "count": transactions.len(),
            "transactions": transactions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chat_core::ChatError;

    use super::*;
    use crate::chain::{DEMO_SIGNATURE, DEMO_WALLET, MockChainClient};

    fn chain() -> Arc<dyn ChainClient> {
        Arc::new(MockChainClient::new())
    }

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_transaction_lookup() {
        let tool = TransactionTool::new(chain());
        let out = tool
            .call(&args(json!({ "signature": DEMO_SIGNATURE })))
            .await
            .unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["fee_sol"], "0.000005");
        assert_eq!(out["signers"][0], DEMO_WALLET);
    }

    #[tokio::test]
    async fn test_malformed_signature() {
        let tool = TransactionTool::new(chain());
        let err = tool.call(&args(json!({ "signature": "abc" }))).await.unwrap_err();
        assert!(matches!(err, ChatError::ToolValidation(_)));
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_execution_error() {
        let tool = TransactionTool::new(chain());
        let missing = "1".repeat(88);
        let err = tool.call(&args(json!({ "signature": missing }))).await.unwrap_err();
        assert!(matches!(err, ChatError::ToolExecution(msg) if msg.contains("Not found")));
    }

    #[tokio::test]
    async fn test_recent_transactions_respects_limit() {
        let tool = RecentTransactionsTool::new(chain());
        let out = tool
            .call(&args(json!({ "address": DEMO_WALLET, "limit": 1 })))
            .await
            .unwrap();

        assert_eq!(out["count"], 1);
        assert_eq!(out["transactions"][0]["signature"], DEMO_SIGNATURE);
    }
}
