//! JSON-RPC transport for read-only contract calls

use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

// Node-side "limit exceeded" / rate limiting
const RPC_LIMIT_EXCEEDED: i64 = -32005;

/// Issues `eth_call` against the latest block.
///
/// Implementations report transient failures (connection problems, 429 or
/// 5xx responses) as `WalletError::Network` and everything final (reverts,
/// malformed payloads) as `WalletError::ContractCallFailed`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn eth_call(&self, rpc_url: &str, to: &str, data: &str) -> Result<String, WalletError>;
}

/// reqwest-backed JSON-RPC 2.0 transport
pub struct HttpTransport {
    client: Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn eth_call(&self, rpc_url: &str, to: &str, data: &str) -> Result<String, WalletError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [{ "to": to, "data": data }, "latest"],
            "id": self.next_id.fetch_add(1, Ordering::Relaxed)
        });

        let resp = self.client.post(rpc_url).json(&body).send().await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(WalletError::network(format!("RPC endpoint returned HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(WalletError::contract_call(format!(
                "RPC endpoint returned HTTP {}",
                status
            )));
        }

        let resp_json: Value = resp.json().await?;
        parse_rpc_response(resp_json)
    }
}

/// Extract the `result` string from a JSON-RPC response body
pub fn parse_rpc_response(resp_json: Value) -> WalletResult<String> {
    if let Some(error) = resp_json.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");

        if code == RPC_LIMIT_EXCEEDED {
            return Err(WalletError::network(format!("RPC rate limited: {}", message)));
        }
        return Err(WalletError::contract_call(format!("RPC error {}: {}", code, message)));
    }

    resp_json
        .get("result")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| WalletError::contract_call("Missing result in RPC response"))
}
