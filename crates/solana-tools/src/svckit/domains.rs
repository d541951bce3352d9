//! Domain Resolution Tool
//!
//! Solana Name Service: `name.sol` to owner address.

use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{ParameterSpec, Result as CoreResult, Tool, ToolArgs, ToolDescriptor};
use serde_json::{Value, json};

use super::str_arg;
use crate::chain::ChainClient;
use crate::error::{Result, ToolkitError};

/// `Bonfida.sol` and `bonfida` both become `bonfida.sol`
fn normalize(domain: &str) -> Result<String> {
    let name = domain.trim().to_lowercase();
    let label = name.strip_suffix(".sol").unwrap_or(&name);

    let valid = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if valid {
        Ok(format!("{label}.sol"))
    } else {
        Err(ToolkitError::InvalidArgument(format!("not a .sol domain: {domain}")))
    }
}

pub struct ResolveDomainTool {
    chain: Arc<dyn ChainClient>,
}

impl ResolveDomainTool {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl Tool for ResolveDomainTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "resolve_domain",
            "Resolve a Solana Name Service domain (e.g. 'bonfida.sol') to the owner's wallet address.",
        )
        .param(
            "domain",
            ParameterSpec::required("string", "The .sol domain to resolve"),
        )
    }

    async fn call(&self, args: &ToolArgs) -> CoreResult<Value> {
        let domain = normalize(str_arg(args, "domain")?)?;
        let owner = self.chain.resolve_domain(&domain).await?;

        Ok(json!({ "domain": domain, "owner": owner }))
    }
}
