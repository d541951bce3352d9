//! JSON-RPC Chain Client
//!
//! Standard Solana RPC for balances, transactions and stake accounts; DAS
//! (`getAsset`, `getAssetsByOwner`) for token metadata and NFTs; the SNS
//! proxy for `.sol` domains.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{ChainClient, ChainConfig};
use crate::error::{Result, ToolkitError};
use crate::model::{
    BalanceChange, NftSummary, SignatureInfo, SolBalance, StakeAccount, TokenBalance, TokenInfo,
    TransactionSummary, TxStatus, block_time, lamports_to_sol, token_amount,
};

const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
const TOKEN_2022_PROGRAM: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
const STAKE_PROGRAM: &str = "Stake11111111111111111111111111111111111111";

/// Byte offset of the staker authority inside a stake account
const STAKER_OFFSET: u64 = 12;

const NFT_INTERFACES: [&str; 5] = ["V1_NFT", "V2_NFT", "ProgrammableNFT", "LEGACY_NFT", "MplCoreAsset"];

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
struct KeyedAccount<A> {
    pubkey: String,
    account: A,
}

#[derive(Deserialize)]
struct ParsedAccount<I> {
    #[serde(default)]
    lamports: u64,
    data: ParsedData<I>,
}

#[derive(Deserialize)]
struct ParsedData<I> {
    parsed: Parsed<I>,
}

#[derive(Deserialize)]
struct Parsed<I> {
    info: I,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    mint: String,
    token_amount: UiTokenAmount,
}

#[derive(Deserialize)]
struct UiTokenAmount {
    amount: String,
    decimals: u8,
}

#[derive(Deserialize)]
struct MintInfo {
    decimals: u8,
    supply: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    slot: u64,
    block_time: Option<i64>,
    meta: Option<TxMeta>,
    transaction: TxEnvelope,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxMeta {
    fee: u64,
    err: Option<Value>,
    #[serde(default)]
    pre_balances: Vec<u64>,
    #[serde(default)]
    post_balances: Vec<u64>,
}

#[derive(Deserialize)]
struct TxEnvelope {
    signatures: Vec<String>,
    message: TxMessage,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxMessage {
    account_keys: Vec<AccountKey>,
}

#[derive(Deserialize)]
struct AccountKey {
    pubkey: String,
    #[serde(default)]
    signer: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcSignature {
    signature: String,
    slot: u64,
    block_time: Option<i64>,
    err: Option<Value>,
    memo: Option<String>,
}

#[derive(Deserialize)]
struct StakeInfo {
    #[serde(default)]
    stake: Option<StakeDetails>,
}

#[derive(Deserialize)]
struct StakeDetails {
    delegation: Delegation,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Delegation {
    voter: String,
    stake: String,
    activation_epoch: String,
    deactivation_epoch: String,
}

#[derive(Deserialize)]
struct DasAsset {
    id: String,
    #[serde(default)]
    interface: String,
    #[serde(default)]
    content: Option<DasContent>,
    #[serde(default)]
    token_info: Option<DasTokenInfo>,
    #[serde(default)]
    grouping: Vec<DasGroup>,
    #[serde(default)]
    compression: Option<DasCompression>,
}

#[derive(Deserialize)]
struct DasContent {
    #[serde(default)]
    metadata: Option<DasMetadata>,
    #[serde(default)]
    links: Option<DasLinks>,
}

#[derive(Deserialize)]
struct DasMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
}

#[derive(Deserialize)]
struct DasLinks {
    #[serde(default)]
    image: Option<String>,
}

#[derive(Deserialize)]
struct DasTokenInfo {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    decimals: Option<u8>,
    #[serde(default)]
    supply: Option<u64>,
    #[serde(default)]
    price_info: Option<DasPriceInfo>,
}

#[derive(Deserialize)]
struct DasPriceInfo {
    price_per_token: Decimal,
}

#[derive(Deserialize)]
struct DasGroup {
    group_key: String,
    group_value: String,
}

#[derive(Deserialize)]
struct DasCompression {
    #[serde(default)]
    compressed: bool,
}

#[derive(Deserialize)]
struct DasPage {
    #[serde(default)]
    items: Vec<DasAsset>,
}

#[derive(Deserialize)]
struct SnsResponse {
    s: String,
    result: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chain client backed by Solana JSON-RPC, DAS and the SNS proxy
pub struct RpcChainClient {
    client: reqwest::Client,
    config: ChainConfig,
}

impl RpcChainClient {
    pub fn new(config: ChainConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ChainConfig::from_env())
    }

    /// JSON-RPC call whose `result` may legitimately be `null`
    async fn call_optional<T: DeserializeOwned>(&self, url: &str, method: &str, params: Value) -> Result<Option<T>> {
        tracing::debug!(method, "Solana RPC call");

        let response: RpcResponse<T> = self
            .client
            .post(url)
            .json(&json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ToolkitError::Rpc {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result)
    }

    async fn call<T: DeserializeOwned>(&self, url: &str, method: &str, params: Value) -> Result<T> {
        self.call_optional(url, method, params)
            .await?
            .ok_or_else(|| ToolkitError::UnexpectedResponse(format!("{method}: missing result")))
    }

    async fn token_accounts(&self, owner: &str, program: &str) -> Result<Vec<TokenBalance>> {
        let accounts: WithContext<Vec<KeyedAccount<ParsedAccount<TokenAccountInfo>>>> = self
            .call(
                &self.config.rpc_url,
                "getTokenAccountsByOwner",
                json!([owner, { "programId": program }, { "encoding": "jsonParsed" }]),
            )
            .await?;

        accounts
            .value
            .into_iter()
            .map(|keyed| -> Result<TokenBalance> {
                let info = keyed.account.data.parsed.info;
                Ok(TokenBalance {
                    amount: token_amount(&info.token_amount.amount, info.token_amount.decimals)?,
                    decimals: info.token_amount.decimals,
                    mint: info.mint,
                    token_account: keyed.pubkey,
                })
            })
            .filter(|balance| balance.as_ref().map_or(true, |b| !b.amount.is_zero()))
            .collect()
    }

    /// Fallback for RPC nodes without DAS: decimals and supply from the mint account
    async fn mint_account(&self, mint: &str) -> Result<TokenInfo> {
        let account: WithContext<Option<ParsedAccount<MintInfo>>> = self
            .call(&self.config.rpc_url, "getAccountInfo", json!([mint, { "encoding": "jsonParsed" }]))
            .await?;

        let account = account
            .value
            .ok_or_else(|| ToolkitError::NotFound(format!("mint {mint}")))?;
        if account.data.parsed.kind != "mint" {
            return Err(ToolkitError::InvalidArgument(format!("{mint} is not a token mint")));
        }

        let info = account.data.parsed.info;
        Ok(TokenInfo {
            mint: mint.to_string(),
            decimals: Some(info.decimals),
            supply: Some(token_amount(&info.supply, info.decimals)?),
            ..TokenInfo::default()
        })
    }
}

fn tx_status(err: Option<&Value>) -> (TxStatus, Option<String>) {
    match err {
        Some(err) => (TxStatus::Failed, Some(err.to_string())),
        None => (TxStatus::Success, None),
    }
}

/// u64::MAX marks "not deactivating"
fn epoch(raw: &str) -> Option<u64> {
    raw.parse().ok().filter(|e| *e != u64::MAX)
}

fn lamport_delta(pre: u64, post: u64) -> Decimal {
    if post >= pre {
        lamports_to_sol(post - pre)
    } else {
        -lamports_to_sol(pre - post)
    }
}

fn summarize_transaction(signature: &str, tx: RpcTransaction) -> TransactionSummary {
    let keys = tx.transaction.message.account_keys;
    let signers = keys.iter().filter(|k| k.signer).map(|k| k.pubkey.clone()).collect();

    let (fee, err, balance_changes) = match tx.meta {
        Some(meta) => {
            let changes = keys
                .iter()
                .zip(meta.pre_balances.iter().zip(&meta.post_balances))
                .filter(|(_, (pre, post))| pre != post)
                .map(|(key, (pre, post))| BalanceChange {
                    account: key.pubkey.clone(),
                    change_sol: lamport_delta(*pre, *post),
                })
                .collect();
            (meta.fee, meta.err, changes)
        }
        None => (0, None, Vec::new()),
    };
    let (status, error) = tx_status(err.as_ref());

    TransactionSummary {
        signature: tx
            .transaction
            .signatures
            .into_iter()
            .next()
            .unwrap_or_else(|| signature.to_string()),
        slot: tx.slot,
        block_time: block_time(tx.block_time),
        status,
        error,
        fee_sol: lamports_to_sol(fee),
        signers,
        balance_changes,
    }
}

fn nft_from_asset(asset: DasAsset) -> NftSummary {
    let (name, symbol, image) = match asset.content {
        Some(content) => {
            let (name, symbol) = content
                .metadata
                .map(|m| (m.name, m.symbol))
                .unwrap_or_default();
            (name, symbol, content.links.and_then(|l| l.image))
        }
        None => (None, None, None),
    };

    NftSummary {
        name: name.filter(|n| !n.is_empty()).unwrap_or_else(|| "Unnamed".into()),
        symbol: symbol.filter(|s| !s.is_empty()),
        collection: asset
            .grouping
            .into_iter()
            .find(|g| g.group_key == "collection")
            .map(|g| g.group_value),
        image,
        compressed: asset.compression.is_some_and(|c| c.compressed),
        mint: asset.id,
    }
}

fn token_info_from_asset(asset: DasAsset) -> Result<TokenInfo> {
    let metadata = asset.content.and_then(|c| c.metadata);
    let (name, meta_symbol) = metadata.map(|m| (m.name, m.symbol)).unwrap_or_default();
    let token = asset.token_info;

    let decimals = token.as_ref().and_then(|t| t.decimals);
    let supply = match (token.as_ref().and_then(|t| t.supply), decimals) {
        (Some(raw), Some(decimals)) => Some(token_amount(&raw.to_string(), decimals)?),
        _ => None,
    };

    Ok(TokenInfo {
        mint: asset.id,
        name: name.filter(|n| !n.is_empty()),
        symbol: meta_symbol
            .filter(|s| !s.is_empty())
            .or_else(|| token.as_ref().and_then(|t| t.symbol.clone())),
        decimals,
        supply,
        price_usd: token.and_then(|t| t.price_info).map(|p| p.price_per_token),
    })
}

fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().to_lowercase();
    domain.strip_suffix(".sol").unwrap_or(&domain).to_string()
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn sol_balance(&self, address: &str) -> Result<SolBalance> {
        let balance: WithContext<u64> = self
            .call(&self.config.rpc_url, "getBalance", json!([address]))
            .await?;
        Ok(SolBalance::new(address, balance.value))
    }

    async fn token_balances(&self, owner: &str) -> Result<Vec<TokenBalance>> {
        let mut balances = self.token_accounts(owner, TOKEN_PROGRAM).await?;
        balances.extend(self.token_accounts(owner, TOKEN_2022_PROGRAM).await?);
        balances.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(balances)
    }

    async fn transaction(&self, signature: &str) -> Result<TransactionSummary> {
        let tx: Option<RpcTransaction> = self
            .call_optional(
                &self.config.rpc_url,
                "getTransaction",
                json!([signature, { "encoding": "jsonParsed", "maxSupportedTransactionVersion": 0 }]),
            )
            .await?;

        tx.map(|tx| summarize_transaction(signature, tx))
            .ok_or_else(|| ToolkitError::NotFound(format!("transaction {signature}")))
    }

    async fn recent_signatures(&self, address: &str, limit: usize) -> Result<Vec<SignatureInfo>> {
        let signatures: Vec<RpcSignature> = self
            .call(
                &self.config.rpc_url,
                "getSignaturesForAddress",
                json!([address, { "limit": limit }]),
            )
            .await?;

        Ok(signatures
            .into_iter()
            .map(|s| SignatureInfo {
                status: tx_status(s.err.as_ref()).0,
                signature: s.signature,
                slot: s.slot,
                block_time: block_time(s.block_time),
                memo: s.memo,
            })
            .collect())
    }

    async fn token_info(&self, mint: &str) -> Result<TokenInfo> {
        let asset: Result<DasAsset> = self
            .call(self.config.das_endpoint(), "getAsset", json!({ "id": mint }))
            .await;

        match asset {
            Ok(asset) => token_info_from_asset(asset),
            Err(ToolkitError::Rpc { code, message, .. }) => {
                tracing::debug!(code, %message, "DAS unavailable, reading mint account");
                self.mint_account(mint).await
            }
            Err(e) => Err(e),
        }
    }

    async fn resolve_domain(&self, domain: &str) -> Result<String> {
        let name = normalize_domain(domain);
        let url = format!("{}/resolve/{name}", self.config.sns_url.trim_end_matches('/'));

        let response: SnsResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.s == "ok" {
            Ok(response.result)
        } else {
            Err(ToolkitError::NotFound(format!("{name}.sol ({})", response.result)))
        }
    }

    async fn stake_accounts(&self, owner: &str) -> Result<Vec<StakeAccount>> {
        let accounts: Vec<KeyedAccount<ParsedAccount<StakeInfo>>> = self
            .call(
                &self.config.rpc_url,
                "getProgramAccounts",
                json!([
                    STAKE_PROGRAM,
                    {
                        "encoding": "jsonParsed",
                        "filters": [{ "memcmp": { "offset": STAKER_OFFSET, "bytes": owner } }]
                    }
                ]),
            )
            .await?;

        accounts
            .into_iter()
            .map(|keyed| -> Result<StakeAccount> {
                let parsed = keyed.account.data.parsed;
                let delegation = parsed.info.stake.map(|s| s.delegation);

                let delegated_sol = match &delegation {
                    Some(d) => Some(lamports_to_sol(d.stake.parse().map_err(|_| {
                        ToolkitError::UnexpectedResponse(format!("stake amount '{}'", d.stake))
                    })?)),
                    None => None,
                };

                Ok(StakeAccount {
                    address: keyed.pubkey,
                    sol: lamports_to_sol(keyed.account.lamports),
                    state: parsed.kind,
                    delegated_sol,
                    activation_epoch: delegation.as_ref().and_then(|d| epoch(&d.activation_epoch)),
                    deactivation_epoch: delegation.as_ref().and_then(|d| epoch(&d.deactivation_epoch)),
                    voter: delegation.map(|d| d.voter),
                })
            })
            .collect()
    }

    async fn nfts(&self, owner: &str, limit: usize) -> Result<Vec<NftSummary>> {
        let page: DasPage = self
            .call(
                self.config.das_endpoint(),
                "getAssetsByOwner",
                json!({
                    "ownerAddress": owner,
                    "page": 1,
                    "limit": limit,
                    "displayOptions": { "showFungible": false },
                }),
            )
            .await?;

        Ok(page
            .items
            .into_iter()
            .filter(|asset| NFT_INTERFACES.contains(&asset.interface.as_str()))
            .map(nft_from_asset)
            .collect())
    }

    fn name(&self) -> &str {
        "SolanaRpc"
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const OWNER: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    fn client(server: &MockServer) -> RpcChainClient {
        RpcChainClient::new(ChainConfig {
            rpc_url: server.uri(),
            das_url: None,
            sns_url: server.uri(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    async fn mock_rpc(server: &MockServer, rpc_method: &str, result: Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "result": result
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_network_error_hides_rpc_api_key() {
        let chain = RpcChainClient::new(ChainConfig {
            rpc_url: "http://127.0.0.1:1/?api-key=rpc-secret".into(),
            das_url: None,
            sns_url: "http://127.0.0.1:1".into(),
            timeout_secs: 5,
        })
        .unwrap();

        let err = chain.sol_balance(OWNER).await.unwrap_err();
        assert!(matches!(err, ToolkitError::Network(_)));
        assert!(!err.to_string().contains("rpc-secret"));

        let as_tool_error: chat_core::ChatError = err.into();
        assert!(!as_tool_error.to_string().contains("rpc-secret"));
    }

    #[tokio::test]
    async fn test_sol_balance() {
        let server = MockServer::start().await;
        mock_rpc(&server, "getBalance", json!({ "context": { "slot": 1 }, "value": 1_500_000_000u64 })).await;

        let balance = client(&server).sol_balance(OWNER).await.unwrap();
        assert_eq!(balance.lamports, 1_500_000_000);
        assert_eq!(balance.sol, dec!(1.5));
    }

    #[tokio::test]
    async fn test_rpc_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "error": { "code": -32602, "message": "Invalid param: WrongSize" }
            })))
            .mount(&server)
            .await;

        let err = client(&server).sol_balance(OWNER).await.unwrap_err();
        assert!(matches!(err, ToolkitError::Rpc { code: -32602, .. }));
    }

    #[tokio::test]
    async fn test_token_balances_skip_empty_accounts() {
        let server = MockServer::start().await;
        let account = |mint: &str, amount: &str| {
            json!({
                "pubkey": format!("{mint}Acct"),
                "account": { "lamports": 2_039_280, "data": { "parsed": {
                    "type": "account",
                    "info": { "mint": mint, "tokenAmount": { "amount": amount, "decimals": 6, "uiAmountString": "" } }
                } } }
            })
        };
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "params": [OWNER, { "programId": TOKEN_PROGRAM }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1,
                "result": { "context": { "slot": 1 }, "value": [account("USDC", "2500000"), account("DUST", "0")] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "params": [OWNER, { "programId": TOKEN_2022_PROGRAM }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "result": { "context": { "slot": 1 }, "value": [] }
            })))
            .mount(&server)
            .await;

        let balances = client(&server).token_balances(OWNER).await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].mint, "USDC");
        assert_eq!(balances[0].amount, dec!(2.5));
    }

    #[tokio::test]
    async fn test_missing_transaction_is_not_found() {
        let server = MockServer::start().await;
        mock_rpc(&server, "getTransaction", Value::Null).await;

        let err = client(&server).transaction("sig").await.unwrap_err();
        assert!(matches!(err, ToolkitError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_transaction_summary() {
        let server = MockServer::start().await;
        mock_rpc(
            &server,
            "getTransaction",
            json!({
                "slot": 250_000_000u64,
                "blockTime": 1_700_000_000i64,
                "meta": { "fee": 5000, "err": null, "preBalances": [2_000_000_000u64, 0], "postBalances": [999_995_000u64, 1_000_000_000u64] },
                "transaction": {
                    "signatures": ["5sig"],
                    "message": { "accountKeys": [
                        { "pubkey": OWNER, "signer": true, "writable": true },
                        { "pubkey": "Dest", "signer": false, "writable": true }
                    ] }
                }
            }),
        )
        .await;

        let tx = client(&server).transaction("5sig").await.unwrap();
        assert_eq!(tx.status, TxStatus::Success);
        assert_eq!(tx.fee_sol, dec!(0.000005));
        assert_eq!(tx.signers, vec![OWNER.to_string()]);
        assert_eq!(tx.balance_changes[0].change_sol, dec!(-1.000005));
        assert_eq!(tx.balance_changes[1].change_sol, dec!(1));
    }

    #[tokio::test]
    async fn test_token_info_falls_back_without_das() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "getAsset" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "error": { "code": -32601, "message": "Method not found" }
            })))
            .mount(&server)
            .await;
        mock_rpc(
            &server,
            "getAccountInfo",
            json!({ "context": { "slot": 1 }, "value": { "lamports": 1, "data": { "parsed": {
                "type": "mint", "info": { "decimals": 6, "supply": "1000000000000" }
            } } } }),
        )
        .await;

        let info = client(&server).token_info("MintAddr").await.unwrap();
        assert_eq!(info.decimals, Some(6));
        assert_eq!(info.supply, Some(dec!(1000000)));
        assert!(info.name.is_none());
    }

    #[tokio::test]
    async fn test_nfts_filter_fungibles() {
        let server = MockServer::start().await;
        let page = json!({ "total": 2, "items": [
                {
                    "id": "NftMint", "interface": "ProgrammableNFT",
                    "content": { "metadata": { "name": "Mad Lad #1", "symbol": "MAD" }, "links": { "image": "https://img/1.png" } },
                    "grouping": [{ "group_key": "collection", "group_value": "MadLadsCollection" }],
                    "compression": { "compressed": false }
                },
                { "id": "UsdcMint", "interface": "FungibleToken" }
            ] });
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "getAssetsByOwner",
                "params": { "limit": 10, "displayOptions": { "showFungible": false } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "result": page
            })))
            .expect(1)
            .mount(&server)
            .await;

        let nfts = client(&server).nfts(OWNER, 10).await.unwrap();
        assert_eq!(nfts.len(), 1);
        assert_eq!(nfts[0].name, "Mad Lad #1");
        assert_eq!(nfts[0].collection.as_deref(), Some("MadLadsCollection"));
    }

    #[tokio::test]
    async fn test_stake_accounts() {
        let server = MockServer::start().await;
        mock_rpc(
            &server,
            "getProgramAccounts",
            json!([{
                "pubkey": "StakeAcct1",
                "account": { "lamports": 10_002_282_880u64, "data": { "parsed": {
                    "type": "delegated",
                    "info": { "meta": {}, "stake": { "delegation": {
                        "voter": "VoteAcct", "stake": "10000000000",
                        "activationEpoch": "500", "deactivationEpoch": "18446744073709551615"
                    } } }
                } } }
            }]),
        )
        .await;

        let stakes = client(&server).stake_accounts(OWNER).await.unwrap();
        assert_eq!(stakes[0].state, "delegated");
        assert_eq!(stakes[0].delegated_sol, Some(dec!(10)));
        assert_eq!(stakes[0].activation_epoch, Some(500));
        assert_eq!(stakes[0].deactivation_epoch, None);
        assert_eq!(stakes[0].voter.as_deref(), Some("VoteAcct"));
    }

    #[tokio::test]
    async fn test_resolve_domain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resolve/bonfida"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "s": "ok", "result": OWNER })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/resolve/nobody-owns-this"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "s": "error", "result": "Domain not found" })))
            .mount(&server)
            .await;

        let chain = client(&server);
        assert_eq!(chain.resolve_domain("Bonfida.sol").await.unwrap(), OWNER);
        assert!(matches!(
            chain.resolve_domain("nobody-owns-this.sol").await,
            Err(ToolkitError::NotFound(_))
        ));
    }
}
