//! Wallet management functionality for the wallet core
//!
//! This module owns the durable wallet collection: uniqueness of
//! `(address, chain)`, the single-default rule, chain switching and
//! cache-eviction signalling on removal.

use crate::core::chains::ChainRegistry;
use crate::core::crypto::keys::{KeyImportService, KeySource, SecureSeedPhrase};
use crate::domain::entities::Wallet;
use crate::domain::repositories::{BalanceCacheEviction, StorageRepository};
use crate::shared::error::WalletError;
use crate::shared::utils::{addresses_equal, validate_password, validate_wallet_name};
use crate::shared::WalletResult;
use std::sync::Arc;
use tokio::sync::RwLock;
use zeroize::Zeroizing;

/// Wallet store for handling multiple wallets
///
/// Wallets are kept in creation order. Every mutation is persisted before it
/// becomes visible; a failed write leaves the in-memory state untouched.
pub struct WalletStore {
    wallets: RwLock<Vec<Wallet>>,
    storage: Arc<dyn StorageRepository>,
    registry: Arc<ChainRegistry>,
    keys: Arc<KeyImportService>,
    eviction: Option<Arc<dyn BalanceCacheEviction>>,
}

impl WalletStore {
    /// Load persisted wallets and repair the default flag if needed
    pub async fn open(
        storage: Arc<dyn StorageRepository>,
        registry: Arc<ChainRegistry>,
        keys: Arc<KeyImportService>,
        eviction: Option<Arc<dyn BalanceCacheEviction>>,
    ) -> WalletResult<Self> {
        let mut wallets = storage.load_wallets().await?;

        for wallet in &wallets {
            if registry.by_id(wallet.chain_id).is_none() {
                log::warn!("Wallet {} is on unsupported chain {}", wallet.id, wallet.chain_id);
            }
        }

        if repair_default(&mut wallets) {
            log::warn!("Repaired default wallet flag across {} stored wallet(s)", wallets.len());
            storage.save_wallets(&wallets).await?;
        }

        log::info!("Wallet store opened with {} wallet(s)", wallets.len());
        Ok(Self {
            wallets: RwLock::new(wallets),
            storage,
            registry,
            keys,
            eviction,
        })
    }

    /// Insert a wallet record.
    ///
    /// The first wallet in an empty store becomes the default; any other
    /// wallet is inserted without the flag.
    pub async fn add(&self, mut wallet: Wallet) -> WalletResult<Wallet> {
        self.registry.require(wallet.chain_id)?;
        wallet.validate()?;

        let mut wallets = self.wallets.write().await;
        if wallets.iter().any(|w| w.matches(&wallet.address, wallet.chain_id)) {
            return Err(WalletError::duplicate_address(format!(
                "{} on chain {}",
                wallet.address, wallet.chain_id
            )));
        }
        if wallets.iter().any(|w| w.id == wallet.id) {
            return Err(WalletError::internal(format!("Wallet id collision: {}", wallet.id)));
        }

        wallet.is_default = wallets.is_empty();

        let mut next = wallets.clone();
        next.push(wallet.clone());
        self.storage.save_wallets(&next).await?;
        *wallets = next;

        log::info!(
            "Added wallet {} on chain {}{}",
            wallet.id,
            wallet.chain_id,
            if wallet.is_default { " (default)" } else { "" }
        );
        Ok(wallet)
    }

    /// Import from a mnemonic or private key and insert the result
    pub async fn import_wallet(
        &self,
        source: &KeySource,
        name: &str,
        password: &str,
        chain_id: u64,
    ) -> WalletResult<Wallet> {
        let chain = self.registry.require(chain_id)?.clone();
        let material = self.keys.validate_source(source)?;
        validate_password(password)?;
        validate_wallet_name(name)?;

        // Reject duplicates before paying for the KDF
        let address = self.keys.derive(&material, &chain)?;
        if self.contains(&address, chain_id).await {
            return Err(WalletError::duplicate_address(format!(
                "{} on chain {}",
                address, chain_id
            )));
        }

        let keys = Arc::clone(&self.keys);
        let name = name.to_string();
        let password = Zeroizing::new(password.to_string());
        let wallet = tokio::task::spawn_blocking(move || {
            keys.wallet_from_material(&material, &name, &password, &chain)
        })
        .await??;

        self.add(wallet).await
    }

    /// Generate a new mnemonic wallet; the phrase is returned for backup
    pub async fn create_wallet(
        &self,
        word_count: usize,
        name: &str,
        password: &str,
        chain_id: u64,
    ) -> WalletResult<(Wallet, SecureSeedPhrase)> {
        let chain = self.registry.require(chain_id)?.clone();
        validate_password(password)?;
        validate_wallet_name(name)?;

        let keys = Arc::clone(&self.keys);
        let name = name.to_string();
        let password = Zeroizing::new(password.to_string());
        let (wallet, phrase) = tokio::task::spawn_blocking(move || {
            keys.create_wallet(word_count, &name, &password, &chain)
        })
        .await??;

        let wallet = self.add(wallet).await?;
        Ok((wallet, phrase))
    }

    /// Remove a wallet and signal eviction of its cached balances.
    ///
    /// When the default goes, the most recently added wallet on the same
    /// chain inherits the flag, else the most recently added overall.
    pub async fn delete(&self, wallet_id: &str) -> WalletResult<Wallet> {
        let removed = {
            let mut wallets = self.wallets.write().await;
            let index = position(&wallets, wallet_id)?;

            let mut next = wallets.clone();
            let removed = next.remove(index);

            if removed.is_default {
                let heir = next
                    .iter()
                    .rposition(|w| w.chain_id == removed.chain_id)
                    .or_else(|| next.len().checked_sub(1));
                if let Some(heir) = heir {
                    next[heir].is_default = true;
                    next[heir].touch();
                    log::info!("Wallet {} is now the default", next[heir].id);
                }
            }

            self.storage.save_wallets(&next).await?;
            *wallets = next;
            removed
        };

        if let Some(eviction) = &self.eviction {
            eviction.evict_wallet(&removed.id).await;
        }

        log::info!("Deleted wallet {}", removed.id);
        Ok(removed)
    }

    /// Make `wallet_id` the single default wallet
    pub async fn set_default(&self, wallet_id: &str) -> WalletResult<Wallet> {
        let mut wallets = self.wallets.write().await;
        let index = position(&wallets, wallet_id)?;
        if wallets[index].is_default {
            return Ok(wallets[index].clone());
        }

        let mut next = wallets.clone();
        for wallet in next.iter_mut() {
            if wallet.is_default {
                wallet.is_default = false;
                wallet.touch();
            }
        }
        next[index].is_default = true;
        next[index].touch();

        self.storage.save_wallets(&next).await?;
        *wallets = next;

        log::info!("Default wallet set to {}", wallet_id);
        Ok(wallets[index].clone())
    }

    /// Move a wallet to another chain, re-deriving its address.
    ///
    /// Needs the owning password to decrypt the key material for the
    /// duration of the derivation; `None` fails `ReauthenticationRequired`.
    /// The encrypted blob itself is kept as-is.
    pub async fn switch_chain(
        &self,
        wallet_id: &str,
        chain_id: u64,
        password: Option<&str>,
    ) -> WalletResult<Wallet> {
        let chain = self.registry.require(chain_id)?.clone();
        let current = self.get(wallet_id).await?;
        if current.chain_id == chain_id {
            return Ok(current);
        }

        let password = password.ok_or_else(|| {
            WalletError::ReauthenticationRequired(format!(
                "Password needed to move wallet {} to chain {}",
                wallet_id, chain_id
            ))
        })?;

        let keys = Arc::clone(&self.keys);
        let password = Zeroizing::new(password.to_string());
        let blob = current.encrypted_key.clone();
        let address = tokio::task::spawn_blocking(move || {
            keys.with_decrypted(&blob, &password, |material| keys.derive(material, &chain))
        })
        .await??;

        let updated = {
            let mut wallets = self.wallets.write().await;
            let index = position(&wallets, wallet_id)?;
            if wallets
                .iter()
                .any(|w| w.id != wallet_id && w.matches(&address, chain_id))
            {
                return Err(WalletError::duplicate_address(format!(
                    "{} on chain {}",
                    address, chain_id
                )));
            }

            let mut next = wallets.clone();
            next[index].chain_id = chain_id;
            next[index].address = address;
            next[index].touch();

            self.storage.save_wallets(&next).await?;
            *wallets = next;
            wallets[index].clone()
        };

        if let Some(eviction) = &self.eviction {
            eviction.evict_wallet(wallet_id).await;
        }

        log::info!("Wallet {} switched to chain {}", wallet_id, chain_id);
        Ok(updated)
    }

    pub async fn rename(&self, wallet_id: &str, name: &str) -> WalletResult<Wallet> {
        validate_wallet_name(name)?;

        let mut wallets = self.wallets.write().await;
        let index = position(&wallets, wallet_id)?;

        let mut next = wallets.clone();
        next[index].name = name.trim().to_string();
        next[index].touch();

        self.storage.save_wallets(&next).await?;
        *wallets = next;
        Ok(wallets[index].clone())
    }

    /// All wallets, in creation order
    pub async fn list_wallets(&self) -> Vec<Wallet> {
        self.wallets.read().await.clone()
    }

    pub async fn get(&self, wallet_id: &str) -> WalletResult<Wallet> {
        let wallets = self.wallets.read().await;
        let index = position(&wallets, wallet_id)?;
        Ok(wallets[index].clone())
    }

    pub async fn default_wallet(&self) -> Option<Wallet> {
        self.wallets.read().await.iter().find(|w| w.is_default).cloned()
    }

    pub async fn find_by_address(&self, address: &str, chain_id: u64) -> Option<Wallet> {
        self.wallets
            .read()
            .await
            .iter()
            .find(|w| w.chain_id == chain_id && addresses_equal(&w.address, address))
            .cloned()
    }

    pub async fn contains(&self, address: &str, chain_id: u64) -> bool {
        self.find_by_address(address, chain_id).await.is_some()
    }

    pub async fn len(&self) -> usize {
        self.wallets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.wallets.read().await.is_empty()
    }
}

fn position(wallets: &[Wallet], wallet_id: &str) -> WalletResult<usize> {
    wallets
        .iter()
        .position(|w| w.id == wallet_id)
        .ok_or_else(|| WalletError::not_found(format!("Wallet not found: {}", wallet_id)))
}

/// Enforce "at most one default, and one if any wallets exist".
///
/// Keeps the first flagged wallet, or flags the most recent when none is.
/// Returns whether anything changed.
fn repair_default(wallets: &mut [Wallet]) -> bool {
    let mut changed = false;
    let mut seen_default = false;
    for wallet in wallets.iter_mut() {
        if wallet.is_default {
            if seen_default {
                wallet.is_default = false;
                changed = true;
            }
            seen_default = true;
        }
    }

    if !seen_default {
        if let Some(last) = wallets.last_mut() {
            last.is_default = true;
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockBalanceCacheEviction, MockStorageRepository};
    use crate::infrastructure::platform::MemoryStorage;
    use crate::shared::error::ValidationError;
    use crate::test_support::{fast_service, key_hex, wallet_at, TEST_MNEMONIC, TEST_PASSWORD};

    async fn store_with(eviction: Option<Arc<dyn BalanceCacheEviction>>) -> WalletStore {
        WalletStore::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(ChainRegistry::new()),
            Arc::new(fast_service()),
            eviction,
        )
        .await
        .unwrap()
    }

    async fn store() -> WalletStore {
        store_with(None).await
    }

    async fn import_key(store: &WalletStore, n: u64, chain_id: u64) -> Wallet {
        store
            .import_wallet(
                &KeySource::private_key(key_hex(n)),
                &format!("Wallet {}", n),
                TEST_PASSWORD,
                chain_id,
            )
            .await
            .unwrap()
    }

    fn default_count(wallets: &[Wallet]) -> usize {
        wallets.iter().filter(|w| w.is_default).count()
    }

    #[tokio::test]
    async fn test_first_wallet_becomes_default() {
        let store = store().await;
        let first = import_key(&store, 1, 1).await;
        let second = import_key(&store, 2, 1).await;

        assert!(first.is_default);
        assert!(!second.is_default);
        assert_eq!(store.default_wallet().await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_duplicate_address_on_same_chain() {
        let store = store().await;
        import_key(&store, 1, 1).await;

        let err = store
            .import_wallet(&KeySource::private_key(key_hex(1)), "Again", TEST_PASSWORD, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::DuplicateAddress(_)));

        // Lowercase variant of the same record is still a duplicate
        let mut copy = store.list_wallets().await[0].clone();
        copy.id = "wallet_copy".to_string();
        copy.address = copy.address.to_lowercase();
        assert!(matches!(store.add(copy).await, Err(WalletError::DuplicateAddress(_))));

        // Same key on another chain is fine
        assert!(store
            .import_wallet(&KeySource::private_key(key_hex(1)), "Polygon", TEST_PASSWORD, 137)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_invalid_input_creates_nothing() {
        let store = store().await;
        let eleven = TEST_MNEMONIC.splitn(2, ' ').nth(1).unwrap();

        let err = store
            .import_wallet(&KeySource::mnemonic(eleven), "Main", TEST_PASSWORD, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::Validation(ValidationError::InvalidWordCount(11))
        ));

        let err = store
            .import_wallet(&KeySource::mnemonic(TEST_MNEMONIC), "Main", TEST_PASSWORD, 56)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedChain(56)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_default_keeps_exactly_one() {
        let store = store().await;
        let a = import_key(&store, 1, 1).await;
        let b = import_key(&store, 2, 137).await;
        let c = import_key(&store, 3, 1).await;

        for target in [&b, &c, &a, &a] {
            store.set_default(&target.id).await.unwrap();
            let wallets = store.list_wallets().await;
            assert_eq!(default_count(&wallets), 1);
            assert_eq!(store.default_wallet().await.unwrap().id, target.id);
        }

        assert!(matches!(store.set_default("missing").await, Err(WalletError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_default_promotes_latest_on_same_chain() {
        let store = store().await;
        let a = import_key(&store, 1, 1).await;
        let b = import_key(&store, 2, 1).await;
        let _other_chain = import_key(&store, 3, 137).await;

        store.delete(&a.id).await.unwrap();
        assert_eq!(store.default_wallet().await.unwrap().id, b.id);
        assert_eq!(default_count(&store.list_wallets().await), 1);
    }

    #[tokio::test]
    async fn test_delete_default_falls_back_to_other_chain() {
        let store = store().await;
        let a = import_key(&store, 1, 1).await;
        let b = import_key(&store, 2, 137).await;

        store.delete(&a.id).await.unwrap();
        assert_eq!(store.default_wallet().await.unwrap().id, b.id);
    }

    #[tokio::test]
    async fn test_delete_only_wallet_then_add_is_default() {
        let store = store().await;
        let only = import_key(&store, 1, 1).await;
        store.delete(&only.id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(store.default_wallet().await.is_none());

        let next = import_key(&store, 2, 1).await;
        assert!(next.is_default);
    }

    #[tokio::test]
    async fn test_delete_signals_eviction() {
        let mut eviction = MockBalanceCacheEviction::new();
        let store_ids = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
        let seen = Arc::clone(&store_ids);
        eviction.expect_evict_wallet().times(1).returning(move |id| {
            seen.lock().unwrap().push(id.to_string());
        });

        let store = store_with(Some(Arc::new(eviction))).await;
        let wallet = import_key(&store, 1, 1).await;
        store.delete(&wallet.id).await.unwrap();

        assert_eq!(*store_ids.lock().unwrap(), vec![wallet.id]);
        assert!(matches!(store.delete("missing").await, Err(WalletError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_clears_only_that_wallets_balances() {
        use crate::core::tokens::TokenBalanceEngine;
        use crate::domain::entities::Token;
        use crate::domain::repositories::MockContractReader;
        use ethers::types::U256;

        let mut reader = MockContractReader::new();
        reader
            .expect_get_balance()
            .returning(|_, _, _| Ok(U256::from(1_000_000u64)));
        let engine = Arc::new(TokenBalanceEngine::new(
            Arc::new(reader),
            Arc::new(ChainRegistry::new()),
        ));
        let usdc = engine
            .track_token(Token {
                chain_id: 1,
                address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
                name: "USD Coin".to_string(),
                symbol: "USDC".to_string(),
                decimals: 6,
                logo_uri: None,
                verified: true,
            })
            .await
            .unwrap();

        let eviction: Arc<dyn BalanceCacheEviction> = engine.clone();
        let store = store_with(Some(eviction)).await;
        let kept = import_key(&store, 1, 1).await;
        let removed = import_key(&store, 2, 1).await;
        let batch = [usdc];
        engine.refresh_balances(&kept, &batch).await.unwrap();
        engine.refresh_balances(&removed, &batch).await.unwrap();

        store.delete(&removed.id).await.unwrap();

        assert!(!engine.get_wallet_balances(&removed).await[0].is_known());
        let balances = engine.get_wallet_balances(&kept).await;
        assert_eq!(balances[0].balance, U256::from(1_000_000u64));
        assert!(!balances[0].is_stale);
    }

    #[tokio::test]
    async fn test_switch_chain_requires_password() {
        let store = store().await;
        let wallet = store
            .import_wallet(&KeySource::mnemonic(TEST_MNEMONIC), "Main", TEST_PASSWORD, 1)
            .await
            .unwrap();

        let err = store.switch_chain(&wallet.id, 84532, None).await.unwrap_err();
        assert!(matches!(err, WalletError::ReauthenticationRequired(_)));
        assert_eq!(store.get(&wallet.id).await.unwrap().chain_id, 1);
    }

    #[tokio::test]
    async fn test_switch_chain_rederives_mnemonic_address() {
        let mut eviction = MockBalanceCacheEviction::new();
        eviction.expect_evict_wallet().times(1).returning(|_| ());

        let store = store_with(Some(Arc::new(eviction))).await;
        let wallet = store
            .import_wallet(&KeySource::mnemonic(TEST_MNEMONIC), "Main", TEST_PASSWORD, 1)
            .await
            .unwrap();

        let moved = store.switch_chain(&wallet.id, 84532, Some(TEST_PASSWORD)).await.unwrap();
        assert_eq!(moved.chain_id, 84532);
        assert_ne!(moved.address, wallet.address);
        assert_eq!(moved.encrypted_key, wallet.encrypted_key);
        assert_eq!(store.get(&wallet.id).await.unwrap().address, moved.address);
    }

    #[tokio::test]
    async fn test_switch_chain_wrong_password_is_generic_crypto_error() {
        let store = store().await;
        let wallet = import_key(&store, 1, 1).await;

        let err = store
            .switch_chain(&wallet.id, 137, Some("definitely wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Cryptographic error: Decryption failed");
        assert_eq!(store.get(&wallet.id).await.unwrap().chain_id, 1);
    }

    #[tokio::test]
    async fn test_switch_chain_detects_duplicates() {
        let store = store().await;
        let on_mainnet = import_key(&store, 1, 1).await;
        import_key(&store, 1, 137).await;

        let err = store
            .switch_chain(&on_mainnet.id, 137, Some(TEST_PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::DuplicateAddress(_)));
    }

    #[tokio::test]
    async fn test_switch_to_same_chain_is_noop() {
        let store = store().await;
        let wallet = import_key(&store, 1, 1).await;
        let same = store.switch_chain(&wallet.id, 1, None).await.unwrap();
        assert_eq!(same.address, wallet.address);
    }

    #[tokio::test]
    async fn test_rename_validates() {
        let store = store().await;
        let wallet = import_key(&store, 1, 1).await;
        assert_eq!(store.rename(&wallet.id, "  Savings ").await.unwrap().name, "Savings");
        assert!(matches!(
            store.rename(&wallet.id, "").await,
            Err(WalletError::Validation(ValidationError::InvalidName(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_wallet_returns_phrase() {
        let store = store().await;
        let (wallet, phrase) = store.create_wallet(24, "Fresh", TEST_PASSWORD, 1).await.unwrap();
        assert_eq!(phrase.word_count(), 24);
        assert!(wallet.is_default);
    }

    #[tokio::test]
    async fn test_list_preserves_creation_order() {
        let store = store().await;
        let ids: Vec<String> = vec![
            import_key(&store, 3, 1).await.id,
            import_key(&store, 1, 1).await.id,
            import_key(&store, 2, 1).await.id,
        ];
        let listed: Vec<String> = store.list_wallets().await.into_iter().map(|w| w.id).collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let mut storage = MockStorageRepository::new();
        storage.expect_load_wallets().returning(|| Ok(Vec::new()));
        storage
            .expect_save_wallets()
            .returning(|_| Err(WalletError::storage("disk full")));

        let store = WalletStore::open(
            Arc::new(storage),
            Arc::new(ChainRegistry::new()),
            Arc::new(fast_service()),
            None,
        )
        .await
        .unwrap();

        let wallet = wallet_at("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6", 1);
        assert!(matches!(store.add(wallet).await, Err(WalletError::Storage(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_open_repairs_multiple_defaults() {
        let mut a = wallet_at("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6", 1);
        let mut b = wallet_at("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf", 1);
        a.is_default = true;
        b.is_default = true;
        let storage = Arc::new(MemoryStorage::with_wallets(vec![a.clone(), b]));

        let store = WalletStore::open(
            storage.clone(),
            Arc::new(ChainRegistry::new()),
            Arc::new(fast_service()),
            None,
        )
        .await
        .unwrap();

        assert_eq!(default_count(&store.list_wallets().await), 1);
        assert_eq!(store.default_wallet().await.unwrap().id, a.id);
        // Repair is persisted
        assert_eq!(default_count(&storage.load_wallets().await.unwrap()), 1);
    }

    #[test]
    fn test_repair_default_marks_latest_when_none() {
        let mut wallets = vec![
            wallet_at("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6", 1),
            wallet_at("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf", 1),
        ];
        assert!(repair_default(&mut wallets));
        assert!(!wallets[0].is_default);
        assert!(wallets[1].is_default);
        assert!(!repair_default(&mut wallets));
        assert!(!repair_default(&mut []));
    }
}
