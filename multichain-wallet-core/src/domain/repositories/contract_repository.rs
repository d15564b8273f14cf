//! Read-only ERC-20 access used by the balance engine

use crate::shared::error::WalletError;
use async_trait::async_trait;
use ethers::types::U256;

/// ERC-20 reads against a chain's node.
///
/// Implementations validate `contract` before any network round trip and
/// map an unknown `chain_id` to `WalletError::UnsupportedChain`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn get_name(&self, contract: &str, chain_id: u64) -> Result<String, WalletError>;

    async fn get_symbol(&self, contract: &str, chain_id: u64) -> Result<String, WalletError>;

    async fn get_decimals(&self, contract: &str, chain_id: u64) -> Result<u8, WalletError>;

    async fn get_balance(
        &self,
        contract: &str,
        owner: &str,
        chain_id: u64,
    ) -> Result<U256, WalletError>;
}
