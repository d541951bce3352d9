//! Mock Price Feed
//!
//! For testing and demo purposes. Returns realistic static prices.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::PriceFeed;
use crate::error::{Result, ToolkitError};
use crate::model::{SOL_MINT, SolPrice, TokenPrice, known_mint};

/// Mock price feed with static prices
pub struct MockPriceFeed {
    sol_usd: Decimal,
}

impl Default for MockPriceFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self { sol_usd: dec!(195) }
    }

    /// Create with a fixed SOL price
    pub const fn with_sol_price(sol_usd: Decimal) -> Self {
        Self { sol_usd }
    }

    fn base_price(&self, mint: &str) -> Option<Decimal> {
        if mint == SOL_MINT {
            return Some(self.sol_usd);
        }
        [
            ("USDC", dec!(1.0)),
            ("USDT", dec!(1.0)),
            ("JUP", dec!(0.92)),
            ("BONK", dec!(0.000022)),
        ]
        .into_iter()
        .find(|(symbol, _)| known_mint(symbol) == Some(mint))
        .map(|(_, price)| price)
    }
}

#[async_trait]
impl PriceFeed for MockPriceFeed {
    async fn sol_price(&self) -> Result<SolPrice> {
        Ok(SolPrice {
            usd: self.sol_usd,
            change_24h: Some(dec!(4.2)),
        })
    }

    async fn token_price(&self, mint: &str) -> Result<TokenPrice> {
        let usd = self
            .base_price(mint)
            .ok_or_else(|| ToolkitError::PriceUnavailable(mint.to_string()))?;
        Ok(TokenPrice { mint: mint.into(), usd })
    }

    fn name(&self) -> &str {
        "MockPrices"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_prices() {
        let feed = MockPriceFeed::new();
        assert_eq!(feed.name(), "MockPrices");

        assert_eq!(feed.sol_price().await.unwrap().usd, dec!(195));
        assert_eq!(feed.token_price(SOL_MINT).await.unwrap().usd, dec!(195));

        let usdc = known_mint("USDC").unwrap();
        assert_eq!(feed.token_price(usdc).await.unwrap().usd, dec!(1.0));
    }

    #[tokio::test]
    async fn test_unknown_mint() {
        let feed = MockPriceFeed::new();
        let result = feed.token_price("NotARealMint").await;
        assert!(matches!(result, Err(ToolkitError::PriceUnavailable(_))));
    }
}
