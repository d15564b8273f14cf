//! Token entity for the wallet core

use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use crate::shared::utils::format_units;

/// ERC-20 descriptor. Identity is `(chain_id, lowercase address)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub chain_id: u64,
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub logo_uri: Option<String>,
    pub verified: bool,
}

impl Token {
    /// Lookup key for this token.
    pub fn key(&self) -> TokenKey {
        TokenKey::new(self.chain_id, &self.address)
    }
}

/// Case-insensitive `(chain_id, contract address)` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKey {
    pub chain_id: u64,
    pub address: String,
}

impl TokenKey {
    pub fn new(chain_id: u64, address: &str) -> Self {
        Self {
            chain_id,
            address: address.to_ascii_lowercase(),
        }
    }
}

/// A token together with a wallet's cached balance for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenWithBalance {
    pub token: Token,
    /// Raw integer balance, scaled by `token.decimals`. Zero until first fetched.
    pub balance: U256,
    /// `None` until the balance has been fetched at least once.
    pub fetched_at: Option<DateTime<Utc>>,
    pub usd_value: Option<f64>,
    pub is_stale: bool,
}

impl TokenWithBalance {
    pub fn formatted_balance(&self) -> String {
        format_units(self.balance, self.token.decimals)
    }

    /// Balance scaled to whole token units. Lossy above f64 precision.
    pub fn scaled_balance(&self) -> f64 {
        self.formatted_balance().parse::<f64>().unwrap_or(0.0)
    }

    pub fn is_known(&self) -> bool {
        self.fetched_at.is_some()
    }
}
