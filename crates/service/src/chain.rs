//! Thin JSON-RPC plumbing over the chain node and bundler.
//!
//! The protocol layer treats the chain as an opaque, possibly-failing remote
//! collaborator: no retry policy lives here, callers decide what a failure
//! means for them.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use common::crypto::Address;
use common::userop::UserOperation;

/// Errors that can occur talking to the chain node
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed rpc response: {0}")]
    MalformedResponse(String),
}

/// A contract event log entry, in JSON-RPC wire shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<String>,
    pub data: String,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
}

/// Contract for the chain node this station drives
///
/// Quantities cross this boundary as "0x"-prefixed hex strings, matching the
/// JSON-RPC wire shape; only nonces, balances and gas estimates are parsed
/// into integers for local bookkeeping.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Next transaction nonce for an address (pending state)
    async fn next_nonce(&self, address: Address) -> Result<u64, ChainClientError>;
    /// Current balance of an address, in wei
    async fn balance(&self, address: Address) -> Result<u128, ChainClientError>;
    /// Estimate gas for a call object
    async fn estimate_gas(&self, call: serde_json::Value) -> Result<u64, ChainClientError>;
    /// Fetch event logs matching a filter object
    async fn logs(&self, filter: serde_json::Value) -> Result<Vec<LogEntry>, ChainClientError>;
    /// Submit a client-signed raw transaction, returning its hash
    async fn send_raw_transaction(&self, raw: &str) -> Result<String, ChainClientError>;
    /// Execute a read-only contract call, returning the ABI-encoded result
    async fn call(&self, to: Address, data: &str) -> Result<String, ChainClientError>;
    /// Ask the paymaster to sponsor a user operation; returns the operation
    /// with paymaster and gas fields populated
    async fn sponsor_user_operation(
        &self,
        op: UserOperation,
        entry_point: Address,
    ) -> Result<UserOperation, ChainClientError>;
    /// Submit a user operation to the bundler, returning its hash
    async fn send_user_operation(
        &self,
        op: UserOperation,
        entry_point: Address,
    ) -> Result<String, ChainClientError>;
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC chain client over HTTP
#[derive(Debug)]
pub struct HttpChainClient {
    url: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpChainClient {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, ChainClientError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response: RpcResponse<T> = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ChainClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response.result.ok_or_else(|| {
            ChainClientError::MalformedResponse("missing result field".to_string())
        })
    }
}

/// Parse a "0x"-prefixed hex quantity into a u64
fn parse_quantity(raw: &str) -> Result<u64, ChainClientError> {
    let trimmed = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(trimmed, 16)
        .map_err(|_| ChainClientError::MalformedResponse(format!("bad quantity: {raw}")))
}

/// Parse a "0x"-prefixed hex quantity into a u128; balances overflow u64
fn parse_amount(raw: &str) -> Result<u128, ChainClientError> {
    let trimmed = raw.strip_prefix("0x").unwrap_or(raw);
    u128::from_str_radix(trimmed, 16)
        .map_err(|_| ChainClientError::MalformedResponse(format!("bad amount: {raw}")))
}

#[async_trait::async_trait]
impl ChainClient for HttpChainClient {
    async fn next_nonce(&self, address: Address) -> Result<u64, ChainClientError> {
        let raw: String = self
            .request(
                "eth_getTransactionCount",
                serde_json::json!([address.to_hex(), "pending"]),
            )
            .await?;
        parse_quantity(&raw)
    }

    async fn balance(&self, address: Address) -> Result<u128, ChainClientError> {
        let raw: String = self
            .request(
                "eth_getBalance",
                serde_json::json!([address.to_hex(), "latest"]),
            )
            .await?;
        parse_amount(&raw)
    }

    async fn estimate_gas(&self, call: serde_json::Value) -> Result<u64, ChainClientError> {
        let raw: String = self.request("eth_estimateGas", serde_json::json!([call])).await?;
        parse_quantity(&raw)
    }

    async fn logs(&self, filter: serde_json::Value) -> Result<Vec<LogEntry>, ChainClientError> {
        self.request("eth_getLogs", serde_json::json!([filter]))
            .await
    }

    async fn send_raw_transaction(&self, raw: &str) -> Result<String, ChainClientError> {
        self.request("eth_sendRawTransaction", serde_json::json!([raw]))
            .await
    }

    async fn call(&self, to: Address, data: &str) -> Result<String, ChainClientError> {
        self.request(
            "eth_call",
            serde_json::json!([{"to": to.to_hex(), "data": data}, "latest"]),
        )
        .await
    }

    async fn sponsor_user_operation(
        &self,
        op: UserOperation,
        entry_point: Address,
    ) -> Result<UserOperation, ChainClientError> {
        self.request(
            "pm_sponsorUserOperation",
            serde_json::json!([op, entry_point.to_hex()]),
        )
        .await
    }

    async fn send_user_operation(
        &self,
        op: UserOperation,
        entry_point: Address,
    ) -> Result<String, ChainClientError> {
        self.request(
            "eth_sendUserOperation",
            serde_json::json!([op, entry_point.to_hex()]),
        )
        .await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x1a").unwrap(), 26);
        assert!(parse_quantity("0xzz").is_err());
        assert!(parse_quantity("").is_err());
    }

    #[test]
    fn test_parse_amount_handles_wide_balances() {
        // 100 eth in wei does not fit in a u64
        assert_eq!(
            parse_amount("0x56bc75e2d63100000").unwrap(),
            100_000_000_000_000_000_000
        );
        assert!(parse_amount("0xnope").is_err());
    }
}
