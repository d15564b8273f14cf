//! Wallet entity and related value objects
//!
//! This module contains the Wallet entity and related value objects
//! that represent the core business concept of a cryptocurrency wallet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::crypto::encryption::EncryptedData;
use crate::shared::error::WalletError;
use crate::shared::types::{Address, KeySourceKind};
use crate::shared::utils::{addresses_equal, generate_id, validate_address, validate_wallet_name};

/// Persisted wallet record.
///
/// Holds only the encrypted key blob and its KDF parameters; plaintext key
/// material never lives on this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub name: String,
    pub address: Address,
    pub chain_id: u64,
    pub is_default: bool,
    pub key_source: KeySourceKind,
    pub encrypted_key: EncryptedData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(
        name: String,
        address: Address,
        chain_id: u64,
        key_source: KeySourceKind,
        encrypted_key: EncryptedData,
    ) -> Result<Self, WalletError> {
        validate_wallet_name(&name)?;
        validate_address(&address)?;

        let now = Utc::now();
        Ok(Self {
            id: format!("wallet_{}", generate_id()),
            name: name.trim().to_string(),
            address,
            chain_id,
            is_default: false,
            key_source,
            encrypted_key,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        validate_address(&self.address)?;
        validate_wallet_name(&self.name)?;
        Ok(())
    }

    /// Case-insensitive address match on the same chain.
    pub fn matches(&self, address: &str, chain_id: u64) -> bool {
        self.chain_id == chain_id && addresses_equal(&self.address, address)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Convert to WalletInfo for safe serialization (no key material)
    pub fn to_wallet_info(&self) -> WalletInfo {
        WalletInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            chain_id: self.chain_id,
            is_default: self.is_default,
            key_source: self.key_source,
            created_at: self.created_at.timestamp(),
        }
    }
}

/// Display-safe wallet information (no encrypted blob)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletInfo {
    pub id: String,
    pub name: String,
    pub address: Address,
    pub chain_id: u64,
    pub is_default: bool,
    pub key_source: KeySourceKind,
    pub created_at: i64,
}

impl From<&Wallet> for WalletInfo {
    fn from(wallet: &Wallet) -> Self {
        wallet.to_wallet_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dummy_blob, wallet_at};

    #[test]
    fn test_wallet_creation() {
        let wallet = wallet_at("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6", 1);

        assert!(wallet.id.starts_with("wallet_"));
        assert_eq!(wallet.name, "Test Wallet");
        assert_eq!(wallet.chain_id, 1);
        assert!(!wallet.is_default);
    }

    #[test]
    fn test_wallet_rejects_malformed_address() {
        let result = Wallet::new(
            "Test Wallet".to_string(),
            "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8".to_string(),
            1,
            KeySourceKind::PrivateKey,
            dummy_blob(),
        );
        assert!(matches!(result, Err(WalletError::Validation(_))));
    }

    #[test]
    fn test_wallet_matches_case_insensitively() {
        let wallet = wallet_at("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6", 1);
        assert!(wallet.matches("0x742d35cc6634c0532925a3b8d4c9db96c4b4d8b6", 1));
        assert!(!wallet.matches("0x742d35cc6634c0532925a3b8d4c9db96c4b4d8b6", 137));
    }

    #[test]
    fn test_wallet_to_wallet_info() {
        let wallet = wallet_at("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6", 1);
        let info = wallet.to_wallet_info();
        assert_eq!(info.id, wallet.id);
        assert_eq!(info.address, wallet.address);

        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("ciphertext"));
    }

    #[test]
    fn test_wallet_record_serializes_without_plaintext() {
        let wallet = wallet_at("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6", 1);
        let json = serde_json::to_string(&wallet).unwrap();
        let restored: Wallet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, wallet.id);
        assert_eq!(restored.encrypted_key, wallet.encrypted_key);
        assert!(json.contains("\"iterations\":1000"));
    }
}
