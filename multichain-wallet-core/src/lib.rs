//! Multichain Wallet Core
//!
//! Wallet identity and multi-chain ERC-20 balance engine.
//! Handles key import, encrypted wallet storage and token balance tracking.
//!
//! ## Architecture
//!
//! - **Core**: Chain catalogue, crypto, wallet store, contract client, token balances, pairing
//! - **Domain**: Entities and repository traits
//! - **Infrastructure**: Configuration, storage backends, logging
//! - **Shared**: Common types, constants, errors and utilities
//!
//! ## Security Features
//!
//! - Key material is only ever persisted encrypted (PBKDF2 or Argon2id, AES-256-GCM or ChaCha20-Poly1305)
//! - Plaintext secrets live in zeroizing buffers, scoped to a single operation
//! - Decryption failures are reported generically
//!
//! ## Usage
//!
//! ```no_run
//! use multichain_wallet_core::{init_wallet_core, KeySource};
//!
//! # async fn run() -> Result<(), multichain_wallet_core::WalletError> {
//! let core = init_wallet_core().await?;
//!
//! let source = KeySource::mnemonic("abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about");
//! let wallet = core.import_wallet(&source, "Main", "correct horse battery", None).await?;
//!
//! core.add_token("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", wallet.chain_id).await?;
//! let outcome = core.refresh_default_wallet().await?;
//! println!("{} balance(s) refreshed", outcome.success_count());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod shared;

use crate::core::chains::ChainRegistry;
use crate::core::contracts::ContractClient;
use crate::core::pairing::PairingIntake;
use crate::core::tokens::{RefreshOutcome, TokenBalanceEngine};
use crate::core::wallet::WalletStore;
use crate::domain::repositories::{BalanceCacheEviction, StorageRepository};
use std::sync::Arc;

// Re-export specific components
pub use crate::core::crypto::keys::{KeyImportService, KeySource, SecureSeedPhrase};
pub use crate::domain::entities::{
    ChainConfig, PairingRequest, SupportedChain, Token, TokenWithBalance, Wallet, WalletInfo,
};
pub use crate::infrastructure::{init_logging, FileStorage, MemoryStorage, WalletCoreConfig};
pub use crate::shared::error::{ValidationError, WalletError};
pub use crate::shared::types::WalletResult;

// Version information
pub use crate::shared::constants::{DESCRIPTION, NAME, VERSION};

/// Initialize logging
pub fn init() {
    init_logging();
    log::debug!("{} {} initialized", NAME, VERSION);
}

/// Build a wallet core from `.env`, `wallet-core.*` and `WALLET_CORE_*` settings
pub async fn init_wallet_core() -> WalletResult<WalletCore> {
    init();
    let config = WalletCoreConfig::load()?;
    WalletCore::new(config).await
}

/// Explicitly constructed wallet core holding every service
pub struct WalletCore {
    config: WalletCoreConfig,
    registry: Arc<ChainRegistry>,
    store: Arc<WalletStore>,
    tokens: Arc<TokenBalanceEngine>,
    pairing: PairingIntake,
}

impl WalletCore {
    /// Wallets persisted at the configured storage path
    pub async fn new(config: WalletCoreConfig) -> WalletResult<Self> {
        let storage = Arc::new(FileStorage::new(&config.storage_path));
        Self::with_storage(config, storage).await
    }

    pub async fn with_storage(
        config: WalletCoreConfig,
        storage: Arc<dyn StorageRepository>,
    ) -> WalletResult<Self> {
        config.validate()?;

        let registry = Arc::new(config.chain_registry());
        let keys = Arc::new(KeyImportService::new(config.kdf_config(), config.cipher));
        let client = ContractClient::over_http(Arc::clone(&registry), config.retry_policy());
        let tokens = Arc::new(TokenBalanceEngine::with_ttl(
            Arc::new(client),
            Arc::clone(&registry),
            config.balance_ttl(),
        ));

        let eviction: Arc<dyn BalanceCacheEviction> = tokens.clone();
        let store = Arc::new(
            WalletStore::open(storage, Arc::clone(&registry), keys, Some(eviction)).await?,
        );

        log::info!(
            "Wallet core ready: {} chain(s), {} wallet(s)",
            registry.list_chains().len(),
            store.len().await
        );

        Ok(Self {
            config,
            registry,
            store,
            tokens,
            pairing: PairingIntake::new(),
        })
    }

    pub fn config(&self) -> &WalletCoreConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ChainRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<WalletStore> {
        &self.store
    }

    pub fn tokens(&self) -> &Arc<TokenBalanceEngine> {
        &self.tokens
    }

    pub fn list_chains(&self) -> &[ChainConfig] {
        self.registry.list_chains()
    }

    /// Import into `chain_id`, or the configured default chain
    pub async fn import_wallet(
        &self,
        source: &KeySource,
        name: &str,
        password: &str,
        chain_id: Option<u64>,
    ) -> WalletResult<Wallet> {
        let chain_id = chain_id.unwrap_or(self.config.default_chain_id);
        self.store.import_wallet(source, name, password, chain_id).await
    }

    pub async fn create_wallet(
        &self,
        word_count: usize,
        name: &str,
        password: &str,
        chain_id: Option<u64>,
    ) -> WalletResult<(Wallet, SecureSeedPhrase)> {
        let chain_id = chain_id.unwrap_or(self.config.default_chain_id);
        self.store.create_wallet(word_count, name, password, chain_id).await
    }

    pub async fn add_token(&self, contract: &str, chain_id: u64) -> WalletResult<Token> {
        self.tokens.add_token(contract, chain_id).await
    }

    /// Cached balances of the default wallet; empty when there is no wallet
    pub async fn default_wallet_balances(&self) -> Vec<TokenWithBalance> {
        match self.store.default_wallet().await {
            Some(wallet) => self.tokens.get_wallet_balances(&wallet).await,
            None => Vec::new(),
        }
    }

    /// Refresh every tracked token of the default wallet
    pub async fn refresh_default_wallet(&self) -> WalletResult<RefreshOutcome> {
        let wallet = self
            .store
            .default_wallet()
            .await
            .ok_or_else(|| WalletError::not_found("No default wallet"))?;
        self.tokens.refresh_wallet(&wallet).await
    }

    /// Refresh a stored wallet's tracked tokens.
    ///
    /// The wallet is resolved from the store, so a deleted wallet cannot
    /// repopulate the balance cache.
    pub async fn refresh_wallet(&self, wallet_id: &str) -> WalletResult<RefreshOutcome> {
        let wallet = self.store.get(wallet_id).await?;
        self.tokens.refresh_wallet(&wallet).await
    }

    /// Validate a pairing string produced by an external scanner
    pub fn pair(&self, uri: &str) -> WalletResult<PairingRequest> {
        Ok(self.pairing.parse(uri)?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::crypto::encryption::{EncryptedData, EncryptionAlgorithm, KdfParams};
    use crate::core::crypto::keys::KeyImportService;
    use crate::core::crypto::password::KdfConfig;
    use crate::domain::entities::Wallet;
    use crate::shared::types::KeySourceKind;

    pub const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    pub const TEST_PASSWORD: &str = "correct horse battery";

    /// Import service with a cheap KDF
    pub fn fast_service() -> KeyImportService {
        KeyImportService::new(KdfConfig::pbkdf2(1_000), EncryptionAlgorithm::AES256GCM)
    }

    /// Private key hex for the scalar `n`
    pub fn key_hex(n: u64) -> String {
        format!("0x{:064x}", n)
    }

    /// Well-formed blob that decrypts under no password
    pub fn dummy_blob() -> EncryptedData {
        EncryptedData {
            algorithm: EncryptionAlgorithm::AES256GCM,
            kdf: KdfParams::pbkdf2(vec![7; 32], 1_000),
            ciphertext: vec![1, 2, 3],
            nonce: vec![0; 12],
            tag: vec![0; 16],
        }
    }

    pub fn wallet_at(address: &str, chain_id: u64) -> Wallet {
        Wallet::new(
            "Test Wallet".to_string(),
            address.to_string(),
            chain_id,
            KeySourceKind::PrivateKey,
            dummy_blob(),
        )
        .unwrap()
    }
}
