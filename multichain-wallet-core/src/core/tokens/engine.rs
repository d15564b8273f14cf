//! Balance engine
//!
//! Tokens are registered per chain, independent of wallets. Balances are
//! cached per `(wallet id, token)` and only ever replaced as a whole entry,
//! so readers never see a balance paired with another fetch's timestamp.
//!
//! At most one balance fetch runs per `(wallet, token)` pair. Concurrent
//! refreshes join the running fetch. Each wallet carries an eviction epoch:
//! a fetch started before an eviction completes normally but its result is
//! not written back. A fetch whose awaiters are all dropped is retired, so
//! the next refresh starts over instead of joining it.

use super::{RefreshOutcome, TokenFailure};
use crate::core::chains::ChainRegistry;
use crate::core::contracts::ContractClient;
use crate::domain::entities::{Token, TokenKey, TokenWithBalance, Wallet};
use crate::domain::repositories::{BalanceCacheEviction, ContractReader};
use crate::shared::constants::BALANCE_TTL_SECS;
use crate::shared::error::WalletError;
use crate::shared::types::WalletId;
use crate::shared::utils::{normalize_address, to_checksum, validate_address};
use crate::shared::WalletResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::types::U256;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

type BalanceFuture = Shared<BoxFuture<'static, Result<U256, WalletError>>>;
type CacheKey = (WalletId, TokenKey);

#[derive(Debug, Clone, Copy)]
struct CachedBalance {
    balance: U256,
    fetched_at: DateTime<Utc>,
}

struct InFlight {
    future: BalanceFuture,
    epoch: u64,
    /// Refreshes currently awaiting `future`
    awaiters: usize,
}

type InFlightMap = HashMap<CacheKey, InFlight>;

// Never held across an await
fn lock_in_flight(in_flight: &StdMutex<InFlightMap>) -> MutexGuard<'_, InFlightMap> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases one awaiter of `future` when it goes away, settled or cancelled.
/// The entry is retired once its last awaiter is gone. Entries for other
/// fetches under the same key are left alone.
struct RetireOnDrop<'a> {
    in_flight: &'a StdMutex<InFlightMap>,
    key: &'a CacheKey,
    future: &'a BalanceFuture,
}

impl Drop for RetireOnDrop<'_> {
    fn drop(&mut self) {
        let mut in_flight = lock_in_flight(self.in_flight);
        let abandoned = match in_flight.get_mut(self.key) {
            Some(running) if running.future.ptr_eq(self.future) => {
                running.awaiters = running.awaiters.saturating_sub(1);
                running.awaiters == 0
            }
            _ => false,
        };
        if abandoned {
            in_flight.remove(self.key);
            log::debug!("Retired abandoned balance fetch for wallet {}", self.key.0);
        }
    }
}

/// Token registry and balance cache
pub struct TokenBalanceEngine<C: ContractReader + 'static = ContractClient> {
    reader: Arc<C>,
    registry: Arc<ChainRegistry>,
    balance_ttl: Duration,
    tokens: RwLock<HashMap<u64, Vec<Token>>>,
    balances: RwLock<HashMap<CacheKey, CachedBalance>>,
    prices: RwLock<HashMap<TokenKey, f64>>,
    in_flight: StdMutex<InFlightMap>,
    epochs: Mutex<HashMap<WalletId, u64>>,
}

impl<C: ContractReader + 'static> TokenBalanceEngine<C> {
    pub fn new(reader: Arc<C>, registry: Arc<ChainRegistry>) -> Self {
        Self::with_ttl(reader, registry, Duration::from_secs(BALANCE_TTL_SECS))
    }

    pub fn with_ttl(reader: Arc<C>, registry: Arc<ChainRegistry>, balance_ttl: Duration) -> Self {
        Self {
            reader,
            registry,
            balance_ttl,
            tokens: RwLock::new(HashMap::new()),
            balances: RwLock::new(HashMap::new()),
            prices: RwLock::new(HashMap::new()),
            in_flight: StdMutex::new(HashMap::new()),
            epochs: Mutex::new(HashMap::new()),
        }
    }

    pub fn balance_ttl(&self) -> Duration {
        self.balance_ttl
    }

    /// Resolve a contract's metadata and start tracking it on `chain_id`.
    ///
    /// Re-adding a tracked token returns the stored record without any
    /// network call.
    pub async fn add_token(&self, contract: &str, chain_id: u64) -> WalletResult<Token> {
        validate_address(contract)?;
        self.registry.require(chain_id)?;

        let key = TokenKey::new(chain_id, contract);
        if let Some(existing) = self.find_token(&key).await {
            log::debug!("Token {} already tracked on chain {}", existing.symbol, chain_id);
            return Ok(existing);
        }

        let (name, symbol, decimals) = tokio::try_join!(
            self.reader.get_name(contract, chain_id),
            self.reader.get_symbol(contract, chain_id),
            self.reader.get_decimals(contract, chain_id),
        )?;

        let token = Token {
            chain_id,
            address: to_checksum(contract)?,
            name,
            symbol,
            decimals,
            logo_uri: None,
            verified: false,
        };

        let token = self.insert_token(token).await;
        log::info!("Tracking token {} ({}) on chain {}", token.symbol, token.address, chain_id);
        Ok(token)
    }

    /// Track a token whose metadata is already known, e.g. a curated list entry
    pub async fn track_token(&self, mut token: Token) -> WalletResult<Token> {
        token.address = to_checksum(&token.address)?;
        self.registry.require(token.chain_id)?;
        Ok(self.insert_token(token).await)
    }

    /// Stop tracking a token and drop its cached balances for every wallet
    pub async fn remove_token(&self, contract: &str, chain_id: u64) -> WalletResult<bool> {
        validate_address(contract)?;
        let key = TokenKey::new(chain_id, contract);

        let removed = {
            let mut tokens = self.tokens.write().await;
            match tokens.get_mut(&chain_id) {
                Some(list) => {
                    let before = list.len();
                    list.retain(|t| t.key() != key);
                    list.len() != before
                }
                None => false,
            }
        };

        if removed {
            self.balances.write().await.retain(|(_, token), _| *token != key);
            self.prices.write().await.remove(&key);
            log::info!("Stopped tracking token {} on chain {}", contract, chain_id);
        }
        Ok(removed)
    }

    /// Tokens registered on a chain, in registration order
    pub async fn get_tokens(&self, chain_id: u64) -> Vec<Token> {
        self.tokens
            .read()
            .await
            .get(&chain_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Cached balances for every token on the wallet's chain.
    ///
    /// Never touches the network. Tokens without a cache entry report a
    /// zero balance, no timestamp and `is_stale`.
    pub async fn get_wallet_balances(&self, wallet: &Wallet) -> Vec<TokenWithBalance> {
        let tokens = self.get_tokens(wallet.chain_id).await;
        let balances = self.balances.read().await;
        let prices = self.prices.read().await;

        tokens
            .into_iter()
            .map(|token| {
                let key = (wallet.id.clone(), token.key());
                let cached = balances.get(&key).copied();
                let price = prices.get(&key.1).copied();
                self.entry(token, cached, price)
            })
            .collect()
    }

    /// Fetch balances for `tokens` concurrently.
    ///
    /// Per-token failures are collected in the outcome and leave that
    /// token's cached value untouched. Tokens not tracked on the wallet's
    /// chain fail with `NotFound`.
    pub async fn refresh_balances(
        &self,
        wallet: &Wallet,
        tokens: &[Token],
    ) -> WalletResult<RefreshOutcome> {
        self.registry.require(wallet.chain_id)?;

        let results = join_all(tokens.iter().map(|token| async move {
            (token.clone(), self.refresh_token(wallet, token).await)
        }))
        .await;

        let mut outcome = RefreshOutcome::default();
        for (token, result) in results {
            match result {
                Ok(entry) => outcome.succeeded.push(entry),
                Err(error) => {
                    log::warn!(
                        "Balance refresh failed for {} on wallet {}: {}",
                        token.symbol, wallet.id, error
                    );
                    outcome.failed.push(TokenFailure { token, error });
                }
            }
        }

        metrics::counter!("wallet_core_balance_refresh_total", "outcome" => "success")
            .increment(outcome.success_count() as u64);
        metrics::counter!("wallet_core_balance_refresh_total", "outcome" => "failure")
            .increment(outcome.failure_count() as u64);

        log::debug!(
            "Refreshed {}/{} balance(s) for wallet {}",
            outcome.success_count(),
            outcome.total(),
            wallet.id
        );
        Ok(outcome)
    }

    /// Refresh every token tracked on the wallet's chain
    pub async fn refresh_wallet(&self, wallet: &Wallet) -> WalletResult<RefreshOutcome> {
        let tokens = self.get_tokens(wallet.chain_id).await;
        self.refresh_balances(wallet, &tokens).await
    }

    /// Refresh only tokens whose cached balance is missing or older than the TTL
    pub async fn refresh_stale_balances(&self, wallet: &Wallet) -> WalletResult<RefreshOutcome> {
        let stale: Vec<Token> = self
            .get_wallet_balances(wallet)
            .await
            .into_iter()
            .filter(|entry| entry.is_stale)
            .map(|entry| entry.token)
            .collect();

        if stale.is_empty() {
            self.registry.require(wallet.chain_id)?;
            return Ok(RefreshOutcome::default());
        }
        self.refresh_balances(wallet, &stale).await
    }

    /// Merge externally sourced USD prices, keyed by contract address.
    ///
    /// Invalid addresses and non-finite or negative prices are skipped.
    /// Returns how many prices were stored.
    pub async fn merge_prices(&self, chain_id: u64, prices: &HashMap<String, f64>) -> usize {
        let mut stored = self.prices.write().await;
        let mut merged = 0;
        for (address, price) in prices {
            match normalize_address(address) {
                Ok(address) if price.is_finite() && *price >= 0.0 => {
                    stored.insert(TokenKey::new(chain_id, &address), *price);
                    merged += 1;
                }
                _ => log::warn!("Ignoring price {} for {} on chain {}", price, address, chain_id),
            }
        }
        merged
    }

    /// Drop a wallet's cached balances and discard its in-flight results
    pub async fn evict_wallet(&self, wallet_id: &str) {
        let removed = {
            let mut balances = self.balances.write().await;
            let before = balances.len();
            balances.retain(|(owner, _), _| owner != wallet_id);

            let mut epochs = self.epochs.lock().await;
            *epochs.entry(wallet_id.to_string()).or_insert(0) += 1;
            before - balances.len()
        };

        lock_in_flight(&self.in_flight).retain(|(owner, _), _| owner != wallet_id);

        log::debug!("Evicted {} cached balance(s) for wallet {}", removed, wallet_id);
    }

    async fn find_token(&self, key: &TokenKey) -> Option<Token> {
        self.tokens
            .read()
            .await
            .get(&key.chain_id)
            .and_then(|list| list.iter().find(|t| t.key() == *key).cloned())
    }

    async fn insert_token(&self, token: Token) -> Token {
        let mut tokens = self.tokens.write().await;
        let list = tokens.entry(token.chain_id).or_default();
        let key = token.key();
        if let Some(existing) = list.iter().find(|t| t.key() == key) {
            return existing.clone();
        }
        list.push(token.clone());
        token
    }

    async fn epoch(&self, wallet_id: &str) -> u64 {
        self.epochs.lock().await.get(wallet_id).copied().unwrap_or(0)
    }

    async fn refresh_token(
        &self,
        wallet: &Wallet,
        token: &Token,
    ) -> WalletResult<TokenWithBalance> {
        let key = (wallet.id.clone(), token.key());
        let tracked = if token.chain_id == wallet.chain_id {
            self.find_token(&key.1).await
        } else {
            None
        };
        let token = tracked.ok_or_else(|| {
            WalletError::not_found(format!(
                "Token {} is not tracked on chain {}",
                token.address, wallet.chain_id
            ))
        })?;

        let (future, epoch) = self.join_or_start(&key, wallet, &token).await;
        let _retire = RetireOnDrop {
            in_flight: &self.in_flight,
            key: &key,
            future: &future,
        };
        let result = future.clone().await;
        self.settle(&key, &future, epoch, &result).await;

        let balance = result?;
        let price = self.prices.read().await.get(&key.1).copied();
        Ok(self.entry(
            token,
            Some(CachedBalance {
                balance,
                fetched_at: Utc::now(),
            }),
            price,
        ))
    }

    async fn join_or_start(
        &self,
        key: &CacheKey,
        wallet: &Wallet,
        token: &Token,
    ) -> (BalanceFuture, u64) {
        let epoch = self.epoch(&wallet.id).await;
        let mut in_flight = lock_in_flight(&self.in_flight);

        if let Some(running) = in_flight.get_mut(key) {
            if running.epoch == epoch {
                log::debug!(
                    "Joining in-flight balance fetch for {} on wallet {}",
                    token.symbol,
                    wallet.id
                );
                running.awaiters += 1;
                return (running.future.clone(), running.epoch);
            }
        }

        let reader = Arc::clone(&self.reader);
        let contract = token.address.clone();
        let owner = wallet.address.clone();
        let chain_id = wallet.chain_id;
        let future = async move { reader.get_balance(&contract, &owner, chain_id).await }
            .boxed()
            .shared();

        in_flight.insert(
            key.clone(),
            InFlight {
                future: future.clone(),
                epoch,
                awaiters: 1,
            },
        );
        (future, epoch)
    }

    /// Retire the in-flight entry and write the result back.
    ///
    /// Only the first awaiter to get here writes, whether or not it started
    /// the fetch. Results from before an eviction, or for a token removed
    /// meanwhile, are dropped.
    async fn settle(
        &self,
        key: &CacheKey,
        future: &BalanceFuture,
        epoch: u64,
        result: &WalletResult<U256>,
    ) {
        let owns_entry = {
            let mut in_flight = lock_in_flight(&self.in_flight);
            match in_flight.get(key) {
                Some(running) if running.future.ptr_eq(future) => {
                    in_flight.remove(key);
                    true
                }
                _ => false,
            }
        };

        let balance = match result {
            Ok(balance) if owns_entry => *balance,
            _ => return,
        };

        let mut balances = self.balances.write().await;
        if self.epoch(&key.0).await != epoch {
            log::debug!("Discarding balance for evicted wallet {}", key.0);
            return;
        }
        if self.find_token(&key.1).await.is_none() {
            return;
        }

        balances.insert(
            key.clone(),
            CachedBalance {
                balance,
                fetched_at: Utc::now(),
            },
        );
    }

    fn entry(
        &self,
        token: Token,
        cached: Option<CachedBalance>,
        price: Option<f64>,
    ) -> TokenWithBalance {
        let is_stale = match cached {
            Some(cached) => self.is_expired(cached.fetched_at),
            None => true,
        };

        let mut entry = TokenWithBalance {
            token,
            balance: cached.map(|c| c.balance).unwrap_or_default(),
            fetched_at: cached.map(|c| c.fetched_at),
            usd_value: None,
            is_stale,
        };
        if entry.is_known() {
            entry.usd_value = price.map(|p| p * entry.scaled_balance());
        }
        entry
    }

    fn is_expired(&self, fetched_at: DateTime<Utc>) -> bool {
        // Clock going backwards reads as fresh
        let age = (Utc::now() - fetched_at).to_std().unwrap_or(Duration::ZERO);
        age >= self.balance_ttl
    }
}

#[async_trait]
impl<C: ContractReader + 'static> BalanceCacheEviction for TokenBalanceEngine<C> {
    async fn evict_wallet(&self, wallet_id: &str) {
        TokenBalanceEngine::evict_wallet(self, wallet_id).await
    }
}
