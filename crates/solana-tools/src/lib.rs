//! # solana-tools
//!
//! Read-only Solana wallet and market data tools for the chat assistant.
//!
//! Tools never sign or send transactions. They validate their arguments
//! before touching the network and report amounts as exact decimals.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  svckit (chat_core::Tool impls)                              │
//! │  get_sol_balance  get_token_balances  get_stake_accounts     │
//! │  get_nfts  get_transaction  get_recent_transactions          │
//! │  get_token_info  get_sol_price  get_token_price              │
//! │  resolve_domain                                              │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │  ChainClient                 │  PriceFeed                    │
//! │  RpcChainClient (RPC/DAS/SNS)│  HttpPriceFeed (CoinGecko,    │
//! │  MockChainClient             │    Jupiter)                   │
//! │                              │  MockPriceFeed                │
//! └──────────────────────────────┴───────────────────────────────┘
//! ```

pub mod chain;
pub mod error;
pub mod market;
pub mod model;
pub mod svckit;

pub use chain::{ChainClient, ChainConfig, MockChainClient, RpcChainClient};
pub use error::{Result, ToolkitError};
pub use market::{HttpPriceFeed, MockPriceFeed, PriceFeed, PriceFeedConfig};
pub use svckit::register_all;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        NftsTool, RecentTransactionsTool, ResolveDomainTool, SolBalanceTool, SolPriceTool,
        StakeAccountsTool, TokenBalancesTool, TokenInfoTool, TokenPriceTool, TransactionTool,
    };
}

/// Default system prompt for the Solana wallet assistant
pub const SOLANA_ASSISTANT_PROMPT: &str = r#"You are a helpful assistant for a Solana mobile wallet. You answer questions about the user's wallet, tokens, transactions and the Solana ecosystem.

## Using Tools

You have read-only access to live Solana data:

- `get_sol_balance` - native SOL balance of an address
- `get_token_balances` - SPL tokens held by an address
- `get_transaction` - details of a transaction by signature
- `get_recent_transactions` - recent activity of an address
- `get_token_info` - name, symbol, decimals and supply of a token
- `get_sol_price` - current SOL/USD price and 24h change
- `get_token_price` - USD price of a token by mint or symbol
- `resolve_domain` - owner address of a .sol domain
- `get_stake_accounts` - stake accounts and delegations
- `get_nfts` - NFTs held by an address

Always call a tool instead of guessing balances or prices. If the user has connected a wallet and asks about "my" holdings, use the connected wallet address.

## Answering

- Quote amounts exactly as the tools return them, with their units (SOL, USDC, ...).
- If a tool returns an error, explain what went wrong in plain language and suggest a fix (for example, a mistyped address).
- You cannot send, sign or approve transactions. Direct the user to the wallet's Send screen for transfers.
- Never ask for seed phrases or private keys."#;
