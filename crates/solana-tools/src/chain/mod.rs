//! Chain Data Integration
//!
//! Read-only access to Solana account, transaction and asset data.

mod mock;
mod rpc;

pub use mock::{DEMO_SIGNATURE, DEMO_WALLET, MockChainClient};
pub use rpc::RpcChainClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    NftSummary, SignatureInfo, SolBalance, StakeAccount, TokenBalance, TokenInfo,
    TransactionSummary,
};

/// Chain client trait (Strategy pattern)
///
/// Implement this for each backend: a plain JSON-RPC node, a DAS-capable
/// indexer, or a fixture for tests.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native SOL balance
    async fn sol_balance(&self, address: &str) -> Result<SolBalance>;

    /// Non-zero SPL token holdings (classic and Token-2022 programs)
    async fn token_balances(&self, owner: &str) -> Result<Vec<TokenBalance>>;

    /// Confirmed transaction by signature
    async fn transaction(&self, signature: &str) -> Result<TransactionSummary>;

    /// Most recent signatures involving an address, newest first
    async fn recent_signatures(&self, address: &str, limit: usize) -> Result<Vec<SignatureInfo>>;

    /// Token metadata for a mint
    async fn token_info(&self, mint: &str) -> Result<TokenInfo>;

    /// Resolve a `.sol` domain to its owner address
    async fn resolve_domain(&self, domain: &str) -> Result<String>;

    /// Stake accounts whose staker authority is `owner`
    async fn stake_accounts(&self, owner: &str) -> Result<Vec<StakeAccount>>;

    /// NFTs held by `owner`
    ///
    /// `limit` caps the assets fetched before non-NFT assets are dropped,
    /// so fewer than `limit` NFTs may come back even when more exist.
    async fn nfts(&self, owner: &str, limit: usize) -> Result<Vec<NftSummary>>;

    /// Backend name
    fn name(&self) -> &str;
}

/// Endpoints for the RPC-backed client
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Solana JSON-RPC endpoint
    pub rpc_url: String,

    /// DAS (Digital Asset Standard) endpoint; defaults to `rpc_url`
    pub das_url: Option<String>,

    /// SNS resolver proxy base URL
    pub sns_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".into(),
            das_url: None,
            sns_url: "https://sns-sdk-proxy.bonfida.workers.dev".into(),
            timeout_secs: 20,
        }
    }
}

impl ChainConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            rpc_url: std::env::var("SOLANA_RPC_URL").unwrap_or(defaults.rpc_url),
            das_url: std::env::var("SOLANA_DAS_URL").ok().or(defaults.das_url),
            sns_url: std::env::var("SNS_PROXY_URL").unwrap_or(defaults.sns_url),
            timeout_secs: defaults.timeout_secs,
        }
    }

    /// Endpoint used for DAS methods
    pub fn das_endpoint(&self) -> &str {
        self.das_url.as_deref().unwrap_or(&self.rpc_url)
    }
}
