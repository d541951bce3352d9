//! Domain Models
//!
//! Typed views of Solana account, transaction and market data.
//! Uses `rust_decimal` for all amounts - never use f64 for money!

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolkitError};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Wrapped SOL mint, used for SOL price lookups by mint
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Convert lamports to SOL exactly
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(lamports), 9).normalize()
}

/// Convert a raw SPL token amount to UI units
pub fn token_amount(raw: &str, decimals: u8) -> Result<Decimal> {
    let raw_value: i128 = raw
        .parse()
        .map_err(|_| ToolkitError::UnexpectedResponse(format!("token amount '{raw}'")))?;
    Decimal::try_from_i128_with_scale(raw_value, u32::from(decimals))
        .map(|d| d.normalize())
        .map_err(|e| ToolkitError::UnexpectedResponse(format!("token amount '{raw}': {e}")))
}

/// Unix seconds to UTC
pub fn block_time(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

fn is_base58(s: &str) -> bool {
    s.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// Check that `s` looks like a base58 public key
pub fn validate_address(s: &str) -> Result<&str> {
    let s = s.trim();
    if (32..=44).contains(&s.len()) && is_base58(s) {
        Ok(s)
    } else {
        Err(ToolkitError::InvalidAddress(s.to_string()))
    }
}

/// Check that `s` looks like a base58 transaction signature
pub fn validate_signature(s: &str) -> Result<&str> {
    let s = s.trim();
    if (64..=88).contains(&s.len()) && is_base58(s) {
        Ok(s)
    } else {
        Err(ToolkitError::InvalidArgument(format!("not a transaction signature: {s}")))
    }
}

/// Mint address for a handful of well-known token symbols
pub fn known_mint(symbol: &str) -> Option<&'static str> {
    match symbol.trim().to_uppercase().as_str() {
        "SOL" | "WSOL" => Some(SOL_MINT),
        "USDC" => Some("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
        "USDT" => Some("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"),
        "JUP" => Some("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN"),
        "BONK" => Some("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263"),
        _ => None,
    }
}

/// Native SOL balance of an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolBalance {
    pub address: String,
    pub lamports: u64,
    pub sol: Decimal,
}

impl SolBalance {
    pub fn new(address: impl Into<String>, lamports: u64) -> Self {
        Self {
            address: address.into(),
            lamports,
            sol: lamports_to_sol(lamports),
        }
    }
}

/// SPL token holding
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub mint: String,
    pub token_account: String,
    pub amount: Decimal,
    pub decimals: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
}

/// SOL movement of one account within a transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub account: String,
    pub change_sol: Decimal,
}

/// Summary of a confirmed transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<DateTime<Utc>>,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub fee_sol: Decimal,
    pub signers: Vec<String>,
    pub balance_changes: Vec<BalanceChange>,
}

/// Entry from an address's signature history
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<DateTime<Utc>>,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// Token metadata
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub mint: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub supply: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<Decimal>,
}

/// Stake account owned (as staker) by a wallet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeAccount {
    pub address: String,
    pub sol: Decimal,
    pub state: String,
    pub voter: Option<String>,
    pub delegated_sol: Option<Decimal>,
    pub activation_epoch: Option<u64>,
    pub deactivation_epoch: Option<u64>,
}

/// NFT held by a wallet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftSummary {
    pub mint: String,
    pub name: String,
    pub symbol: Option<String>,
    pub collection: Option<String>,
    pub image: Option<String>,
    pub compressed: bool,
}

/// SOL spot price
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolPrice {
    pub usd: Decimal,
    pub change_24h: Option<Decimal>,
}

/// Token spot price by mint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPrice {
    pub mint: String,
    pub usd: Decimal,
}
