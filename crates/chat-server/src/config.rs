//! Server Configuration

use std::time::Duration;

use chat_core::{ChatError, LoopConfig, ProviderKind, Result};
use solana_tools::{ChainConfig, PriceFeedConfig};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 90;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// Provider used when a request names none
    pub default_provider: ProviderKind,

    /// Deadline after which a chat request is cancelled
    pub request_timeout: Duration,

    pub loop_config: LoopConfig,

    pub chain: ChainConfig,

    pub prices: PriceFeedConfig,

    /// Serve fixture wallet data instead of calling Solana and price APIs
    pub mock_chain: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            default_provider: ProviderKind::Claude,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            loop_config: LoopConfig::default(),
            chain: ChainConfig::default(),
            prices: PriceFeedConfig::default(),
            mock_chain: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let default_provider = match std::env::var("DEFAULT_PROVIDER") {
            Ok(name) => name.parse()?,
            Err(_) => defaults.default_provider,
        };

        let request_timeout = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ChatError::Config(format!(
                        "REQUEST_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                    )));
                }
            },
            Err(_) => defaults.request_timeout,
        };

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            default_provider,
            request_timeout,
            loop_config: LoopConfig::from_env(),
            chain: ChainConfig::from_env(),
            prices: PriceFeedConfig::from_env(),
            mock_chain: std::env::var("SOLANA_MOCK_DATA")
                .is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.default_provider, ProviderKind::Claude);
        assert_eq!(config.loop_config.max_rounds, 10);
        assert!(!config.mock_chain);
    }
}
