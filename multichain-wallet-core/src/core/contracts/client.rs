use super::abi;
use super::{HttpTransport, RetryPolicy, RpcTransport};
use crate::core::chains::ChainRegistry;
use crate::domain::repositories::ContractReader;
use crate::shared::error::WalletError;
use crate::shared::utils::validate_address;
use crate::shared::WalletResult;
use async_trait::async_trait;
use ethers::types::U256;
use std::sync::Arc;

/// Read-only ERC-20 client over a chain's JSON-RPC endpoint
pub struct ContractClient<T: RpcTransport = HttpTransport> {
    registry: Arc<ChainRegistry>,
    transport: T,
    policy: RetryPolicy,
}

impl ContractClient<HttpTransport> {
    pub fn over_http(registry: Arc<ChainRegistry>, policy: RetryPolicy) -> Self {
        Self::new(registry, HttpTransport::new(), policy)
    }
}

impl<T: RpcTransport> ContractClient<T> {
    pub fn new(registry: Arc<ChainRegistry>, transport: T, policy: RetryPolicy) -> Self {
        Self {
            registry,
            transport,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn get_name(&self, contract: &str, chain_id: u64) -> WalletResult<String> {
        let result = self.call(contract, chain_id, abi::name_call()).await?;
        abi::decode_string(&result)
    }

    pub async fn get_symbol(&self, contract: &str, chain_id: u64) -> WalletResult<String> {
        let result = self.call(contract, chain_id, abi::symbol_call()).await?;
        abi::decode_string(&result)
    }

    pub async fn get_decimals(&self, contract: &str, chain_id: u64) -> WalletResult<u8> {
        let result = self.call(contract, chain_id, abi::decimals_call()).await?;
        abi::decode_decimals(&result)
    }

    pub async fn get_balance(
        &self,
        contract: &str,
        owner: &str,
        chain_id: u64,
    ) -> WalletResult<U256> {
        validate_address(contract)?;
        let data = abi::balance_of_call(owner)?;
        let result = self.call(contract, chain_id, data).await?;
        abi::decode_uint(&result)
    }

    /// Validate, resolve the endpoint, then call with timeout and retries.
    ///
    /// Only `Network` errors (including timeouts) are retried.
    async fn call(&self, contract: &str, chain_id: u64, data: String) -> WalletResult<String> {
        validate_address(contract)?;
        let rpc_url = self.registry.rpc_url(chain_id)?;
        let chain_label = chain_id.to_string();

        let mut attempt = 0u32;
        loop {
            metrics::counter!("wallet_core_rpc_calls_total", "chain" => chain_label.clone())
                .increment(1);
            log::debug!("eth_call {} on chain {} (attempt {})", contract, chain_id, attempt + 1);

            let result = match tokio::time::timeout(
                self.policy.call_timeout,
                self.transport.eth_call(rpc_url, contract, &data),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(WalletError::network(format!(
                    "RPC call timed out after {:?}",
                    self.policy.call_timeout
                ))),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff_for(attempt);
                    log::warn!(
                        "Transient RPC failure on chain {} ({}), retrying in {:?}",
                        chain_id, e, delay
                    );
                    metrics::counter!("wallet_core_rpc_retries_total", "chain" => chain_label.clone())
                        .increment(1);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    metrics::counter!("wallet_core_rpc_failures_total", "chain" => chain_label.clone())
                        .increment(1);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl<T: RpcTransport> ContractReader for ContractClient<T> {
    async fn get_name(&self, contract: &str, chain_id: u64) -> Result<String, WalletError> {
        ContractClient::get_name(self, contract, chain_id).await
    }

    async fn get_symbol(&self, contract: &str, chain_id: u64) -> Result<String, WalletError> {
        ContractClient::get_symbol(self, contract, chain_id).await
    }

    async fn get_decimals(&self, contract: &str, chain_id: u64) -> Result<u8, WalletError> {
        ContractClient::get_decimals(self, contract, chain_id).await
    }

    async fn get_balance(
        &self,
        contract: &str,
        owner: &str,
        chain_id: u64,
    ) -> Result<U256, WalletError> {
        ContractClient::get_balance(self, contract, owner, chain_id).await
    }
}
