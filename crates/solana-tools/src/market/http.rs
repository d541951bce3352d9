//! HTTP Price Feed
//!
//! SOL/USD from CoinGecko `simple/price`, token prices by mint from the
//! Jupiter price API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{PriceFeed, PriceFeedConfig};
use crate::error::{Result, ToolkitError};
use crate::model::{SolPrice, TokenPrice};

#[derive(Deserialize)]
struct CoinGeckoQuote {
    usd: Decimal,
    #[serde(default)]
    usd_24h_change: Option<Decimal>,
}

#[derive(Deserialize)]
struct JupiterResponse {
    #[serde(default)]
    data: HashMap<String, Option<JupiterPrice>>,
}

#[derive(Deserialize)]
struct JupiterPrice {
    price: Decimal,
}

pub struct HttpPriceFeed {
    client: reqwest::Client,
    config: PriceFeedConfig,
}

impl HttpPriceFeed {
    pub fn new(config: PriceFeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(PriceFeedConfig::from_env())
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn sol_price(&self) -> Result<SolPrice> {
        let url = format!("{}/simple/price", self.config.coingecko_url.trim_end_matches('/'));
        tracing::debug!(%url, "fetching SOL price");

        let mut quotes: HashMap<String, CoinGeckoQuote> = self
            .client
            .get(url)
            .query(&[("ids", "solana"), ("vs_currencies", "usd"), ("include_24hr_change", "true")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let quote = quotes
            .remove("solana")
            .ok_or_else(|| ToolkitError::PriceUnavailable("SOL".into()))?;

        Ok(SolPrice {
            usd: quote.usd.round_dp(4),
            change_24h: quote.usd_24h_change.map(|c| c.round_dp(2)),
        })
    }

    async fn token_price(&self, mint: &str) -> Result<TokenPrice> {
        tracing::debug!(mint, "fetching token price");

        let mut response: JupiterResponse = self
            .client
            .get(&self.config.jupiter_url)
            .query(&[("ids", mint)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let price = response
            .data
            .remove(mint)
            .flatten()
            .ok_or_else(|| ToolkitError::PriceUnavailable(mint.to_string()))?;

        Ok(TokenPrice {
            mint: mint.to_string(),
            usd: price.price,
        })
    }

    fn name(&self) -> &str {
        "CoinGecko+Jupiter"
    }
}
