//! Ethereum JSON-RPC implementations of the chain ports.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use asty_types::{Address, ChainId, ReferralLevels, TxHash, UserSnapshot};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{METHOD_NOT_FOUND_CODE, UNRECOGNIZED_CHAIN_CODE};
use crate::wallet::{TransactionReceipt, TransactionRequest};
use crate::{abi, ChainError, ReferralContract, WalletProvider};

// ── JsonRpcClient ──────────────────────────────────────────────────────

/// HTTP client for an Ethereum JSON-RPC endpoint.
///
/// Wraps `reqwest::Client` with the endpoint URL and a request-id counter.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

/// `error` member of a JSON-RPC response.
#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

impl JsonRpcClient {
    /// Create a client for `url` (e.g. `http://127.0.0.1:8545`).
    pub fn new(url: impl Into<String>) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChainError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a request and deserialize its `result` member.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = request_body(id, method, params);
        tracing::trace!(method, id, "json-rpc request");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("{method} request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ChainError::Transport(format!(
                "{method}: endpoint returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChainError::Transport(format!("{method}: invalid JSON response: {e}")))?;

        parse_response(method, json)
    }
}

fn request_body(id: u64, method: &str, params: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

fn parse_response<T: DeserializeOwned>(method: &str, mut json: serde_json::Value) -> Result<T, ChainError> {
    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        let error: RpcErrorObject = serde_json::from_value(error.clone())
            .map_err(|e| ChainError::Decode(format!("{method} error object: {e}")))?;
        return Err(ChainError::from_rpc(error.code, error.message));
    }
    let result = json
        .get_mut("result")
        .map(serde_json::Value::take)
        .unwrap_or(serde_json::Value::Null);
    serde_json::from_value(result).map_err(|e| ChainError::Decode(format!("{method} result: {e}")))
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_quantity(s: &str) -> Result<u64, ChainError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| ChainError::Decode(format!("quantity without 0x prefix: {s}")))?;
    u64::from_str_radix(digits, 16).map_err(|e| ChainError::Decode(format!("quantity {s}: {e}")))
}

/// Encode a `u64` as a `0x`-prefixed hex quantity.
pub fn to_quantity(value: u64) -> String {
    format!("{value:#x}")
}

fn to_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn from_data(s: &str) -> Result<Vec<u8>, ChainError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| ChainError::Decode(format!("hex data: {e}")))
}

// ── RpcReferralContract ────────────────────────────────────────────────

/// [`ReferralContract`] over `eth_call`.
pub struct RpcReferralContract {
    client: Arc<JsonRpcClient>,
    address: Address,
}

impl RpcReferralContract {
    pub fn new(client: Arc<JsonRpcClient>, address: Address) -> Self {
        Self { client, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn call(&self, data: &[u8]) -> Result<Vec<u8>, ChainError> {
        let params = serde_json::json!([
            { "to": self.address.to_string(), "data": to_data(data) },
            "latest"
        ]);
        let result: String = self.client.request("eth_call", params).await?;
        from_data(&result)
    }
}

#[async_trait]
impl ReferralContract for RpcReferralContract {
    async fn get_user(&self, user: Address) -> Result<UserSnapshot, ChainError> {
        let data = self.call(&abi::encode_get_user(user)).await?;
        abi::decode_get_user(&data)
    }

    async fn total_registered_users(&self) -> Result<u64, ChainError> {
        let data = self.call(&abi::encode_total_registered_users()).await?;
        abi::decode_total_registered_users(&data)
    }

    async fn referral_counts_by_level(&self, user: Address) -> Result<ReferralLevels, ChainError> {
        let data = self.call(&abi::encode_referral_counts_by_level(user)).await?;
        abi::decode_referral_counts_by_level(&data)
    }
}

// ── RpcWallet ──────────────────────────────────────────────────────────

/// [`WalletProvider`] over an EIP-1193 style JSON-RPC endpoint that holds
/// unlocked accounts (a local dev node or a signing proxy).
pub struct RpcWallet {
    client: Arc<JsonRpcClient>,
    poll_interval: Duration,
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: TxHash,
    block_number: String,
    #[serde(default)]
    status: Option<String>,
}

impl RawReceipt {
    fn into_receipt(self) -> Result<TransactionReceipt, ChainError> {
        let success = match self.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            None => true,
        };
        Ok(TransactionReceipt {
            transaction_hash: self.transaction_hash,
            block_number: parse_quantity(&self.block_number)?,
            success,
        })
    }
}

impl RpcWallet {
    pub fn new(client: Arc<JsonRpcClient>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn account(&self) -> Result<Option<Address>, ChainError> {
        let accounts: Vec<Address> = self
            .client
            .request("eth_accounts", serde_json::json!([]))
            .await?;
        Ok(accounts.into_iter().next())
    }

    async fn chain_id(&self) -> Result<ChainId, ChainError> {
        let id: String = self.client.request("eth_chainId", serde_json::json!([])).await?;
        parse_quantity(&id)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ChainError> {
        let params = serde_json::json!([{ "chainId": to_quantity(chain_id) }]);
        match self
            .client
            .request::<serde_json::Value>("wallet_switchEthereumChain", params)
            .await
        {
            Ok(_) => Ok(()),
            Err(ChainError::Rpc { code, message })
                if code == UNRECOGNIZED_CHAIN_CODE || code == METHOD_NOT_FOUND_CODE =>
            {
                Err(ChainError::SwitchUnsupported {
                    chain_id,
                    reason: message,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ChainError> {
        let params = serde_json::json!([{
            "from": request.from.to_string(),
            "to": request.to.to_string(),
            "data": to_data(&request.data),
        }]);
        let hash: TxHash = self.client.request("eth_sendTransaction", params).await?;
        tracing::info!(%hash, to = %request.to, "transaction broadcast");
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, ChainError> {
        loop {
            let raw: Option<RawReceipt> = self
                .client
                .request("eth_getTransactionReceipt", serde_json::json!([hash.to_string()]))
                .await?;
            if let Some(raw) = raw {
                return raw.into_receipt();
            }
            tracing::trace!(%hash, "receipt not available yet");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
