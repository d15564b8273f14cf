//! Chain catalogue for the wallet core
//!
//! Every chain id accepted from a caller is resolved here before any
//! storage or network work happens.

use crate::domain::entities::{ChainConfig, SupportedChain};
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use std::collections::HashMap;

/// Immutable catalogue of supported chains, in stable order
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainConfig>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::with_rpc_overrides(HashMap::new())
    }

    /// Build the catalogue, replacing default RPC endpoints by chain id.
    ///
    /// Overrides for chain ids outside the catalogue are ignored.
    pub fn with_rpc_overrides(overrides: HashMap<u64, String>) -> Self {
        let chains = SupportedChain::ALL
            .iter()
            .map(|chain| {
                let mut config = chain.config();
                if let Some(url) = overrides.get(&config.chain_id) {
                    log::debug!("Using configured RPC endpoint for {}", config.name);
                    config.rpc_url = url.trim().to_string();
                }
                config
            })
            .collect();

        Self { chains }
    }

    /// All supported chains, in catalogue order
    pub fn list_chains(&self) -> &[ChainConfig] {
        &self.chains
    }

    pub fn by_id(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// Like `by_id`, but an unknown id is an `UnsupportedChain` error
    pub fn require(&self, chain_id: u64) -> WalletResult<&ChainConfig> {
        self.by_id(chain_id).ok_or(WalletError::UnsupportedChain(chain_id))
    }

    /// RPC endpoint for a chain; an empty endpoint is a configuration error
    pub fn rpc_url(&self, chain_id: u64) -> WalletResult<&str> {
        let chain = self.require(chain_id)?;
        if chain.rpc_url.is_empty() {
            return Err(WalletError::config(format!(
                "RPC URL not set for {}",
                chain.name
            )));
        }
        Ok(&chain.rpc_url)
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_chains_is_stable() {
        let registry = ChainRegistry::new();
        let ids: Vec<u64> = registry.list_chains().iter().map(|c| c.chain_id).collect();
        assert_eq!(ids, vec![1, 137, 8453, 1114, 84532, 17000]);
    }

    #[test]
    fn test_require_unknown_chain() {
        let registry = ChainRegistry::new();
        assert_eq!(registry.require(137).unwrap().name, "Polygon");
        assert!(matches!(registry.require(56), Err(WalletError::UnsupportedChain(56))));
    }

    #[test]
    fn test_rpc_overrides_apply() {
        let mut overrides = HashMap::new();
        overrides.insert(1u64, " http://localhost:8545 ".to_string());
        overrides.insert(999u64, "http://ignored".to_string());

        let registry = ChainRegistry::with_rpc_overrides(overrides);
        assert_eq!(registry.rpc_url(1).unwrap(), "http://localhost:8545");
        assert!(registry.by_id(999).is_none());
        assert_eq!(registry.list_chains().len(), SupportedChain::ALL.len());
    }

    #[test]
    fn test_empty_rpc_url_is_config_error() {
        let registry = ChainRegistry::new();
        // Holesky ships without a default endpoint
        assert!(registry.require(17000).is_ok());
        assert!(matches!(registry.rpc_url(17000), Err(WalletError::Config(_))));
    }
}
