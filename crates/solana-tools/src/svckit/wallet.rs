//! Wallet Tools
//!
//! Holdings of a single address: SOL, SPL tokens, stake accounts, NFTs.

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{ParameterSpec, Result as CoreResult, Tool, ToolArgs, ToolDescriptor};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use super::{limit_arg, str_arg};
use crate::chain::ChainClient;
use crate::model::validate_address;

fn address_param() -> ParameterSpec {
    ParameterSpec::required("string", "Solana wallet address (base58)")
}

/// Native SOL balance of an address
pub struct SolBalanceTool {
    chain: Arc<dyn ChainClient>,
}

impl SolBalanceTool {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl Tool for SolBalanceTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "get_sol_balance",
            "Get the native SOL balance of a Solana wallet address.",
        )
        .param("address", address_param())
    }

    async fn call(&self, args: &ToolArgs) -> CoreResult<Value> {
        let address = validate_address(str_arg(args, "address")?)?;
        let balance = self.chain.sol_balance(address).await?;
        Ok(serde_json::to_value(balance)?)
    }
}

/// SPL token holdings of an address
pub struct TokenBalancesTool {
    chain: Arc<dyn ChainClient>,
}

impl TokenBalancesTool {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl Tool for TokenBalancesTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "get_token_balances",
            "List the SPL tokens held by a Solana wallet, with mint address and amount. Zero balances are omitted.",
        )
        .param("address", address_param())
    }

    async fn call(&self, args: &ToolArgs) -> CoreResult<Value> {
        let owner = validate_address(str_arg(args, "address")?)?;
        let tokens = self.chain.token_balances(owner).await?;

        Ok(json!({
            "owner": owner,
            "count": tokens.len(),
            "tokens": tokens,
        }))
    }
}

/// Stake accounts controlled by an address
pub struct StakeAccountsTool {
    chain: Arc<dyn ChainClient>,
}

impl StakeAccountsTool {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl Tool for StakeAccountsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "get_stake_accounts",
            "List stake accounts whose staker authority is the given wallet, with delegated amount and validator vote account.",
        )
        .param("address", address_param())
    }

    async fn call(&self, args: &ToolArgs) -> CoreResult<Value> {
        let owner = validate_address(str_arg(args, "address")?)?;
        let accounts = self.chain.stake_accounts(owner).await?;
        let total_sol: Decimal = accounts.iter().map(|a| a.sol).sum();

        Ok(json!({
            "owner": owner,
            "count": accounts.len(),
            "total_sol": total_sol,
            "accounts": accounts,
        }))
    }
}

/// NFTs held by an address
pub struct NftsTool {
    chain: Arc<dyn ChainClient>,
}

impl NftsTool {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl Tool for NftsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "get_nfts",
            "List NFTs (including compressed NFTs) owned by a Solana wallet.",
        )
        .param("address", address_param())
        .param(
            "limit",
            ParameterSpec::optional("integer", "Maximum number of NFTs to return (1-25, default 10)"),
        )
    }

    async fn call(&self, args: &ToolArgs) -> CoreResult<Value> {
        let owner = validate_address(str_arg(args, "address")?)?;
        let nfts = self.chain.nfts(owner, limit_arg(args, 10)).await?;

        Ok(json!({
            "owner": owner,
            "count": nfts.len(),
            "nfts": nfts,
        }))
    }
}
