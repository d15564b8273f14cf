//! Runtime configuration
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! `wallet-core.{toml,json}` file in the working directory, and
//! `WALLET_CORE_*` environment variables (a `.env` file is loaded first).

use crate::core::chains::ChainRegistry;
use crate::core::contracts::RetryPolicy;
use crate::core::crypto::password::KdfConfig;
use crate::domain::entities::SupportedChain;
use crate::infrastructure::platform::FileStorage;
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::types::{EncryptionAlgorithm, KdfAlgorithm};
use crate::shared::WalletResult;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "wallet-core";
pub const ENV_PREFIX: &str = "WALLET_CORE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WalletCoreConfig {
    pub default_chain_id: u64,
    pub storage_path: PathBuf,
    pub rpc_timeout_ms: u64,
    pub rpc_max_retries: u32,
    pub rpc_backoff_ms: u64,
    pub balance_ttl_secs: u64,
    pub kdf_algorithm: KdfAlgorithm,
    /// PBKDF2 rounds or Argon2 time cost; the algorithm's default when unset
    pub kdf_iterations: Option<u32>,
    pub cipher: EncryptionAlgorithm,

    // RPC endpoint overrides, `rpc_<chain slug>`
    pub rpc_ethereum_mainnet: Option<String>,
    pub rpc_polygon: Option<String>,
    pub rpc_base_mainnet: Option<String>,
    pub rpc_core_testnet: Option<String>,
    pub rpc_base_sepolia: Option<String>,
    pub rpc_holesky: Option<String>,
}

impl Default for WalletCoreConfig {
    fn default() -> Self {
        Self {
            default_chain_id: SupportedChain::EthereumMainnet.chain_id(),
            storage_path: FileStorage::default_path(),
            rpc_timeout_ms: RPC_TIMEOUT_MS,
            rpc_max_retries: RPC_MAX_RETRIES,
            rpc_backoff_ms: RPC_BACKOFF_MS,
            balance_ttl_secs: BALANCE_TTL_SECS,
            kdf_algorithm: KdfAlgorithm::Pbkdf2Sha256,
            kdf_iterations: None,
            cipher: EncryptionAlgorithm::AES256GCM,
            rpc_ethereum_mainnet: None,
            rpc_polygon: None,
            rpc_base_mainnet: None,
            rpc_core_testnet: None,
            rpc_base_sepolia: None,
            rpc_holesky: None,
        }
    }
}

impl WalletCoreConfig {
    /// Load from `.env`, the optional config file and the process environment
    pub fn load() -> WalletResult<Self> {
        dotenv::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE_NAME).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    /// Load from an explicit set of `WALLET_CORE_*` variables only
    pub fn from_vars(vars: HashMap<String, String>) -> WalletResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> WalletResult<Self> {
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> WalletResult<()> {
        if SupportedChain::from_chain_id(self.default_chain_id).is_none() {
            return Err(WalletError::config(format!(
                "Unsupported default chain id {}",
                self.default_chain_id
            )));
        }
        if self.rpc_timeout_ms == 0 {
            return Err(WalletError::config("rpc_timeout_ms must be positive"));
        }
        if self.rpc_max_retries > RPC_MAX_RETRIES_CEILING {
            return Err(WalletError::config(format!(
                "rpc_max_retries must be at most {}, got {}",
                RPC_MAX_RETRIES_CEILING, self.rpc_max_retries
            )));
        }
        for (chain, url) in self.rpc_overrides() {
            if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(WalletError::config(format!(
                    "RPC URL for {} must be http(s), got '{}'",
                    chain.name(),
                    url
                )));
            }
        }
        self.kdf_config().validate()
    }

    pub fn kdf_config(&self) -> KdfConfig {
        match self.kdf_algorithm {
            KdfAlgorithm::Pbkdf2Sha256 => {
                KdfConfig::pbkdf2(self.kdf_iterations.unwrap_or(PBKDF2_ITERATIONS))
            }
            KdfAlgorithm::Argon2id => KdfConfig {
                iterations: self.kdf_iterations.unwrap_or(ARGON2_TIME_COST),
                ..KdfConfig::argon2id()
            },
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.rpc_timeout_ms),
            self.rpc_max_retries,
            Duration::from_millis(self.rpc_backoff_ms),
        )
    }

    pub fn balance_ttl(&self) -> Duration {
        Duration::from_secs(self.balance_ttl_secs)
    }

    /// Chain catalogue with the configured endpoint overrides applied
    pub fn chain_registry(&self) -> ChainRegistry {
        let overrides = self
            .rpc_overrides()
            .map(|(chain, url)| (chain.chain_id(), url.to_string()))
            .collect::<HashMap<_, _>>();
        ChainRegistry::with_rpc_overrides(overrides)
    }

    fn rpc_overrides(&self) -> impl Iterator<Item = (SupportedChain, &str)> + '_ {
        SupportedChain::ALL.iter().filter_map(move |chain| {
            let url = match chain {
                SupportedChain::EthereumMainnet => &self.rpc_ethereum_mainnet,
                SupportedChain::Polygon => &self.rpc_polygon,
                SupportedChain::BaseMainnet => &self.rpc_base_mainnet,
                SupportedChain::CoreTestnet => &self.rpc_core_testnet,
                SupportedChain::BaseSepolia => &self.rpc_base_sepolia,
                SupportedChain::EthereumHolesky => &self.rpc_holesky,
            };
            url.as_deref().map(|u| (*chain, u.trim()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = WalletCoreConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(config, WalletCoreConfig::default());
        assert_eq!(config.default_chain_id, 1);
        assert_eq!(config.kdf_config().iterations, 600_000);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.balance_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_environment_overrides() {
        let config = WalletCoreConfig::from_vars(vars(&[
            ("WALLET_CORE_DEFAULT_CHAIN_ID", "137"),
            ("WALLET_CORE_RPC_TIMEOUT_MS", "2500"),
            ("WALLET_CORE_KDF_ALGORITHM", "argon2id"),
            ("WALLET_CORE_CIPHER", "chacha20-poly1305"),
            ("WALLET_CORE_RPC_HOLESKY", "https://holesky.example.org"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();

        assert_eq!(config.default_chain_id, 137);
        assert_eq!(config.retry_policy().call_timeout, Duration::from_millis(2500));
        assert_eq!(config.kdf_config(), KdfConfig::argon2id());
        assert_eq!(config.cipher, EncryptionAlgorithm::ChaCha20Poly1305);

        let registry = config.chain_registry();
        assert_eq!(registry.rpc_url(17000).unwrap(), "https://holesky.example.org");
        assert_eq!(registry.rpc_url(1).unwrap(), "https://ethereum-rpc.publicnode.com");
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            ("WALLET_CORE_DEFAULT_CHAIN_ID", "56"),
            ("WALLET_CORE_RPC_TIMEOUT_MS", "0"),
            ("WALLET_CORE_RPC_MAX_RETRIES", "9"),
            ("WALLET_CORE_KDF_ITERATIONS", "1000"),
            ("WALLET_CORE_RPC_POLYGON", "ftp://polygon"),
        ];
        for (key, value) in cases {
            let result = WalletCoreConfig::from_vars(vars(&[(key, value)]));
            assert!(matches!(result, Err(WalletError::Config(_))), "{}={} accepted", key, value);
        }
    }

    #[test]
    fn test_unknown_algorithm_is_config_error() {
        let result = WalletCoreConfig::from_vars(vars(&[("WALLET_CORE_KDF_ALGORITHM", "md5")]));
        assert!(matches!(result, Err(WalletError::Config(_))));
    }
}
