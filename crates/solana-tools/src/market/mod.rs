//! Market Data Integration
//!
//! Spot prices for SOL and SPL tokens.

mod http;
mod mock;

pub use http::HttpPriceFeed;
pub use mock::MockPriceFeed;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{SolPrice, TokenPrice};

/// Price feed trait (Strategy pattern)
///
/// Implement this for each price source: CoinGecko, Jupiter, Pyth, etc.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// SOL/USD with 24h change
    async fn sol_price(&self) -> Result<SolPrice>;

    /// USD price of a token by mint address
    async fn token_price(&self, mint: &str) -> Result<TokenPrice>;

    /// Feed name
    fn name(&self) -> &str;
}

#[derive(Clone, Debug)]
pub struct PriceFeedConfig {
    /// CoinGecko API base URL
    pub coingecko_url: String,

    /// Jupiter price endpoint
    pub jupiter_url: String,

    pub timeout_secs: u64,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            coingecko_url: "https://api.coingecko.com/api/v3".into(),
            jupiter_url: "https://api.jup.ag/price/v2".into(),
            timeout_secs: 10,
        }
    }
}

impl PriceFeedConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            coingecko_url: std::env::var("COINGECKO_API_URL").unwrap_or(defaults.coingecko_url),
            jupiter_url: std::env::var("JUPITER_PRICE_URL").unwrap_or(defaults.jupiter_url),
            timeout_secs: defaults.timeout_secs,
        }
    }
}
