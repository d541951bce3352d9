//! Token and Price Tools

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{ParameterSpec, Result as CoreResult, Tool, ToolArgs, ToolDescriptor};
use serde_json::Value;

use super::mint_arg;
use crate::chain::ChainClient;
use crate::market::PriceFeed;

fn token_param() -> ParameterSpec {
    ParameterSpec::required(
        "string",
        "Token mint address, or a well-known symbol (SOL, USDC, USDT, JUP, BONK)",
    )
}

/// Token metadata, enriched with a spot price when one is available
pub struct TokenInfoTool {
    chain: Arc<dyn ChainClient>,
    prices: Arc<dyn PriceFeed>,
}

impl TokenInfoTool {
    pub fn new(chain: Arc<dyn ChainClient>, prices: Arc<dyn PriceFeed>) -> Self {
        Self { chain, prices }
    }
}

#[async_trait]
impl Tool for TokenInfoTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "get_token_info",
            "Get metadata for an SPL token: name, symbol, decimals, supply and USD price when known.",
        )
        .param("mint", token_param())
    }

    async fn call(&self, args: &ToolArgs) -> CoreResult<Value> {
        let mint = mint_arg(args, "mint")?;
        let mut info = self.chain.token_info(&mint).await?;

        if info.price_usd.is_none() {
            match self.prices.token_price(&mint).await {
                Ok(price) => info.price_usd = Some(price.usd),
                Err(e) => tracing::debug!(%mint, error = %e, "no price for token"),
            }
        }

        Ok(serde_json::to_value(info)?)
    }
}

/// Current SOL/USD price
pub struct SolPriceTool {
    prices: Arc<dyn PriceFeed>,
}

impl SolPriceTool {
    pub fn new(prices: Arc<dyn PriceFeed>) -> Self {
        Self { prices }
    }
}

#[async_trait]
impl Tool for SolPriceTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "get_sol_price",
            "Get the current SOL price in USD with its 24-hour change in percent.",
        )
    }

    async fn call(&self, _args: &ToolArgs) -> CoreResult<Value> {
        let price = self.prices.sol_price().await?;
        Ok(serde_json::to_value(price)?)
    }
}

/// USD price of any SPL token
pub struct TokenPriceTool {
    prices: Arc<dyn PriceFeed>,
}

impl TokenPriceTool {
    pub fn new(prices: Arc<dyn PriceFeed>) -> Self {
        Self { prices }
    }
}

#[async_trait]
impl Tool for TokenPriceTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "get_token_price",
            "Get the current USD price of an SPL token.",
        )
        .param("token", token_param())
    }

    async fn call(&self, args: &ToolArgs) -> CoreResult<Value> {
        let mint = mint_arg(args, "token")?;
        let price = self.prices.token_price(&mint).await?;
        Ok(serde_json::to_value(price)?)
    }
}

#[cfg(test)]
mod tests {
    use chat_core::ChatError;
    use serde_json::json;

    use super::*;
    use crate::chain::MockChainClient;
    use crate::market::MockPriceFeed;
    use crate::model::known_mint;

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_token_info_adds_price() {
        let tool = TokenInfoTool::new(Arc::new(MockChainClient::new()), Arc::new(MockPriceFeed::new()));
        let out = tool.call(&args(json!({ "mint": "USDC" }))).await.unwrap();

        assert_eq!(out["symbol"], "USDC");
        assert_eq!(out["decimals"], 6);
        assert_eq!(out["price_usd"], "1.0");
    }

    #[tokio::test]
    async fn test_sol_price() {
        let tool = SolPriceTool::new(Arc::new(MockPriceFeed::new()));
        let out = tool.call(&ToolArgs::new()).await.unwrap();

        assert_eq!(out["usd"], "195");
        assert_eq!(out["change_24h"], "4.2");
    }

    #[tokio::test]
    async fn test_token_price_by_symbol_and_mint() {
        let tool = TokenPriceTool::new(Arc::new(MockPriceFeed::new()));

        let by_symbol = tool.call(&args(json!({ "token": "bonk" }))).await.unwrap();
        let by_mint = tool
            .call(&args(json!({ "token": known_mint("BONK").unwrap() })))
            .await
            .unwrap();
        assert_eq!(by_symbol, by_mint);
    }

    #[tokio::test]
    async fn test_unpriced_token_is_execution_error() {
        let tool = TokenPriceTool::new(Arc::new(MockPriceFeed::new()));
        let err = tool
            .call(&args(json!({ "token": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::ToolExecution(_)));
    }
}
