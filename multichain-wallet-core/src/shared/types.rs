use serde::{Deserialize, Serialize};

// Basic types for wallet operations
pub type Address = String;
pub type WalletId = String;

/// Where a wallet's key material came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KeySourceKind {
    Mnemonic,
    PrivateKey,
}

/// Key derivation function used to turn a password into a cipher key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum KdfAlgorithm {
    #[serde(rename = "pbkdf2-sha256", alias = "pbkdf2")]
    Pbkdf2Sha256,
    #[serde(rename = "argon2id", alias = "argon2")]
    Argon2id,
}

/// Authenticated cipher used for the key blob.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EncryptionAlgorithm {
    #[serde(rename = "aes-256-gcm", alias = "aes256gcm")]
    AES256GCM,
    #[serde(rename = "chacha20-poly1305", alias = "chacha20poly1305")]
    ChaCha20Poly1305,
}

// Result types for better error handling
pub type WalletResult<T> = Result<T, crate::shared::error::WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kdf_algorithm_aliases() {
        let short: KdfAlgorithm = serde_json::from_str("\"pbkdf2\"").unwrap();
        assert_eq!(short, KdfAlgorithm::Pbkdf2Sha256);
        let full: KdfAlgorithm = serde_json::from_str("\"argon2id\"").unwrap();
        assert_eq!(full, KdfAlgorithm::Argon2id);
        assert!(serde_json::from_str::<KdfAlgorithm>("\"scrypt\"").is_err());
    }

    #[test]
    fn test_encryption_algorithm_serde_names() {
        let json = serde_json::to_string(&EncryptionAlgorithm::ChaCha20Poly1305).unwrap();
        assert_eq!(json, "\"chacha20-poly1305\"");
        let alias: EncryptionAlgorithm = serde_json::from_str("\"aes256gcm\"").unwrap();
        assert_eq!(alias, EncryptionAlgorithm::AES256GCM);
    }

    #[test]
    fn test_key_source_kind_serde() {
        let json = serde_json::to_string(&KeySourceKind::PrivateKey).unwrap();
        assert_eq!(json, "\"private_key\"");
    }
}
