//! Service Kit - Chat Tools
//!
//! The ten Solana tools exposed to the model. Each implements
//! `chat_core::Tool` and returns a JSON value.

mod domains;
mod tokens;
mod transactions;
mod wallet;

pub use domains::ResolveDomainTool;
pub use tokens::{SolPriceTool, TokenInfoTool, TokenPriceTool};
pub use transactions::{RecentTransactionsTool, TransactionTool};
pub use wallet::{NftsTool, SolBalanceTool, StakeAccountsTool, TokenBalancesTool};

use std::sync::Arc;

use chat_core::{ToolArgs, ToolRegistry};

use crate::chain::ChainClient;
use crate::error::{Result, ToolkitError};
use crate::market::PriceFeed;
use crate::model::{known_mint, validate_address};

/// Upper bound for list-style tools
pub const MAX_LIMIT: usize = 25;

/// Register every Solana tool against the given backends
pub fn register_all(
    registry: &mut ToolRegistry,
    chain: Arc<dyn ChainClient>,
    prices: Arc<dyn PriceFeed>,
) -> chat_core::Result<()> {
    registry.register(SolBalanceTool::new(chain.clone()))?;
    registry.register(TokenBalancesTool::new(chain.clone()))?;
    registry.register(TransactionTool::new(chain.clone()))?;
    registry.register(RecentTransactionsTool::new(chain.clone()))?;
    registry.register(TokenInfoTool::new(chain.clone(), prices.clone()))?;
    registry.register(SolPriceTool::new(prices.clone()))?;
    registry.register(TokenPriceTool::new(prices))?;
    registry.register(ResolveDomainTool::new(chain.clone()))?;
    registry.register(StakeAccountsTool::new(chain.clone()))?;
    registry.register(NftsTool::new(chain))?;

    tracing::debug!(tools = registry.len(), "registered Solana tools");
    Ok(())
}

/// Required string argument
fn str_arg<'a>(args: &'a ToolArgs, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolkitError::InvalidArgument(format!("'{name}' must be a non-empty string")))
}

/// Mint address from either a mint or a well-known symbol such as `USDC`
fn mint_arg(args: &ToolArgs, name: &str) -> Result<String> {
    let raw = str_arg(args, name)?;
    match known_mint(raw) {
        Some(mint) => Ok(mint.to_string()),
        None => validate_address(raw).map(str::to_string),
    }
}

/// Optional `limit` argument, clamped to `1..=MAX_LIMIT`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn limit_arg(args: &ToolArgs, default: usize) -> usize {
    let requested = match args.get("limit") {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().map(|f| f.max(0.0) as u64))
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())),
        None => None,
    };
    requested
        .map_or(default, |n| usize::try_from(n).unwrap_or(MAX_LIMIT))
        .clamp(1, MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::chain::MockChainClient;
    use crate::market::MockPriceFeed;

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_register_all() {
        let mut registry = ToolRegistry::new();
        register_all(
            &mut registry,
            Arc::new(MockChainClient::new()),
            Arc::new(MockPriceFeed::new()),
        )
        .unwrap();

        assert_eq!(
            registry.names(),
            vec![
                "get_nfts",
                "get_recent_transactions",
                "get_sol_balance",
                "get_sol_price",
                "get_stake_accounts",
                "get_token_balances",
                "get_token_info",
                "get_token_price",
                "get_transaction",
                "resolve_domain",
            ]
        );
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(limit_arg(&args(json!({})), 10), 10);
        assert_eq!(limit_arg(&args(json!({ "limit": 0 })), 10), 1);
        assert_eq!(limit_arg(&args(json!({ "limit": 500 })), 10), MAX_LIMIT);
        assert_eq!(limit_arg(&args(json!({ "limit": "5" })), 10), 5);
        assert_eq!(limit_arg(&args(json!({ "limit": 3.0 })), 10), 3);
        assert_eq!(limit_arg(&args(json!({ "limit": -4 })), 10), 1);
    }

    #[test]
    fn test_mint_arg() {
        let a = args(json!({ "symbol": "usdc", "mint": "So11111111111111111111111111111111111111112", "bad": "doge!" }));
        assert_eq!(mint_arg(&a, "symbol").unwrap(), "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
        assert_eq!(mint_arg(&a, "mint").unwrap(), crate::model::SOL_MINT);
        assert!(matches!(mint_arg(&a, "bad"), Err(ToolkitError::InvalidAddress(_))));
    }

    #[test]
    fn test_str_arg() {
        let a = args(json!({ "address": "  abc ", "empty": "", "num": 3 }));
        assert_eq!(str_arg(&a, "address").unwrap(), "abc");
        assert!(str_arg(&a, "empty").is_err());
        assert!(str_arg(&a, "num").is_err());
        assert!(str_arg(&a, "missing").is_err());
    }
}
