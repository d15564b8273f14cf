//! Storage repository for data access
//!
//! This module defines the persistence seam for wallet records and the
//! cache-eviction signal a wallet store sends when a wallet goes away.

use crate::domain::entities::Wallet;
use crate::shared::error::WalletError;
use async_trait::async_trait;

/// Storage repository trait
///
/// Persists the full wallet collection as one unit. `save_wallets` must
/// either replace the stored collection entirely or leave it untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Load every persisted wallet, in stored order
    async fn load_wallets(&self) -> Result<Vec<Wallet>, WalletError>;

    /// Replace the persisted collection
    async fn save_wallets(&self, wallets: &[Wallet]) -> Result<(), WalletError>;
}

/// Receives "drop everything cached for this wallet" signals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceCacheEviction: Send + Sync {
    async fn evict_wallet(&self, wallet_id: &str);
}
