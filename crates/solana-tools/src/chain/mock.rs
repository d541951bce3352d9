//! Mock Chain Client
//!
//! For testing and demo purposes. Serves a small fixed wallet.

use async_trait::async_trait;
use rust_decimal_macros::dec;

use super::ChainClient;
use crate::error::{Result, ToolkitError};
use crate::model::{
    BalanceChange, NftSummary, SignatureInfo, SolBalance, StakeAccount, TokenBalance, TokenInfo,
    TransactionSummary, TxStatus, block_time, known_mint,
};

/// Address owning every fixture asset
pub const DEMO_WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

/// Signature of the single fixture transaction
pub const DEMO_SIGNATURE: &str =
    "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";

/// Mock chain client with static fixture data
pub struct MockChainClient {
    lamports: u64,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainClient {
    pub const fn new() -> Self {
        Self { lamports: 1_500_000_000 }
    }

    /// Fixture wallet holding a different SOL balance
    pub const fn with_lamports(lamports: u64) -> Self {
        Self { lamports }
    }

    fn ensure_demo(address: &str) -> Result<()> {
        if address == DEMO_WALLET {
            Ok(())
        } else {
            Err(ToolkitError::NotFound(format!("account {address}")))
        }
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn sol_balance(&self, address: &str) -> Result<SolBalance> {
        // Unknown accounts hold nothing, like on chain
        let lamports = if address == DEMO_WALLET { self.lamports } else { 0 };
        Ok(SolBalance::new(address, lamports))
    }

    async fn token_balances(&self, owner: &str) -> Result<Vec<TokenBalance>> {
        if owner != DEMO_WALLET {
            return Ok(Vec::new());
        }
        Ok(vec![
            TokenBalance {
                mint: known_mint("USDC").unwrap_or_default().into(),
                token_account: "3emsAVdmGKERbHjmGfQ6oZ1e35dkf5iYcS6U4CPKFVaa".into(),
                amount: dec!(250.5),
                decimals: 6,
            },
            TokenBalance {
                mint: known_mint("BONK").unwrap_or_default().into(),
                token_account: "9Ut8NnCP5cD6Hgm2r8bN9qA9qZ4R6xPB4wYfM3uKtWHk".into(),
                amount: dec!(1000000),
                decimals: 5,
            },
        ])
    }

    async fn transaction(&self, signature: &str) -> Result<TransactionSummary> {
        if signature != DEMO_SIGNATURE {
            return Err(ToolkitError::NotFound(format!("transaction {signature}")));
        }
        Ok(TransactionSummary {
            signature: signature.into(),
            slot: 250_000_000,
            block_time: block_time(Some(1_700_000_000)),
            status: TxStatus::Success,
            error: None,
            fee_sol: dec!(0.000005),
            signers: vec![DEMO_WALLET.into()],
            balance_changes: vec![
                BalanceChange {
                    account: DEMO_WALLET.into(),
                    change_sol: dec!(-0.100005),
                },
                BalanceChange {
                    account: "Dest1111111111111111111111111111111111111111".into(),
                    change_sol: dec!(0.1),
                },
            ],
        })
    }

    async fn recent_signatures(&self, address: &str, limit: usize) -> Result<Vec<SignatureInfo>> {
        Self::ensure_demo(address)?;
        let history = vec![
            SignatureInfo {
                signature: DEMO_SIGNATURE.into(),
                slot: 250_000_000,
                block_time: block_time(Some(1_700_000_000)),
                status: TxStatus::Success,
                memo: None,
            },
            SignatureInfo {
                signature: "4kqHnXyqk5zAcE7mJw9fP3uE8Kc1bZrPpLxNRTqUaYhW2dE6iDxV3cS8mGfJtQ1nBzL7oHyR5vKwC9aXjM2sUeF".into(),
                slot: 249_999_000,
                block_time: block_time(Some(1_699_999_600)),
                status: TxStatus::Failed,
                memo: Some("swap".into()),
            },
        ];
        Ok(history.into_iter().take(limit).collect())
    }

    async fn token_info(&self, mint: &str) -> Result<TokenInfo> {
        let (name, symbol, decimals, supply) = match mint {
            m if Some(m) == known_mint("USDC") => ("USD Coin", "USDC", 6, dec!(9000000000)),
            m if Some(m) == known_mint("BONK") => ("Bonk", "Bonk", 5, dec!(88000000000000)),
            m if Some(m) == known_mint("SOL") => ("Wrapped SOL", "SOL", 9, dec!(0)),
            _ => return Err(ToolkitError::NotFound(format!("mint {mint}"))),
        };
        Ok(TokenInfo {
            mint: mint.into(),
            name: Some(name.into()),
            symbol: Some(symbol.into()),
            decimals: Some(decimals),
            supply: Some(supply),
            price_usd: None,
        })
    }

    async fn resolve_domain(&self, domain: &str) -> Result<String> {
        match domain.trim().to_lowercase().trim_end_matches(".sol") {
            "demo" | "toly" => Ok(DEMO_WALLET.into()),
            other => Err(ToolkitError::NotFound(format!("{other}.sol"))),
        }
    }

    async fn stake_accounts(&self, owner: &str) -> Result<Vec<StakeAccount>> {
        if owner != DEMO_WALLET {
            return Ok(Vec::new());
        }
        Ok(vec![StakeAccount {
            address: "StakeDemo1111111111111111111111111111111111".into(),
            sol: dec!(10.00228288),
            state: "delegated".into(),
            voter: Some("VoteDemo11111111111111111111111111111111111".into()),
            delegated_sol: Some(dec!(10)),
            activation_epoch: Some(500),
            deactivation_epoch: None,
        }])
    }

    async fn nfts(&self, owner: &str, limit: usize) -> Result<Vec<NftSummary>> {
        if owner != DEMO_WALLET {
            return Ok(Vec::new());
        }
        let nfts = vec![NftSummary {
            mint: "NftDemo11111111111111111111111111111111111".into(),
            name: "Mad Lad #8420".into(),
            symbol: Some("MAD".into()),
            collection: Some("J1S9H3QjnRtBbbuD4HjPV6RpRhwuk4zKbxsnCHuTgh9w".into()),
            image: None,
            compressed: false,
        }];
        Ok(nfts.into_iter().take(limit).collect())
    }

    fn name(&self) -> &str {
        "MockChain"
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[tokio::test]
    async fn test_mock_chain() {
        let chain = MockChainClient::new();
        assert_eq!(chain.name(), "MockChain");

        let balance = chain.sol_balance(DEMO_WALLET).await.unwrap();
        assert_eq!(balance.sol, dec!(1.5));

        let tokens = chain.token_balances(DEMO_WALLET).await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.amount > Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_unknown_fixtures() {
        let chain = MockChainClient::new();

        assert!(chain.transaction("nope").await.is_err());
        assert!(chain.resolve_domain("nobody.sol").await.is_err());
        assert_eq!(chain.resolve_domain("Demo.sol").await.unwrap(), DEMO_WALLET);
        assert_eq!(chain.recent_signatures(DEMO_WALLET, 1).await.unwrap().len(), 1);
    }
}
