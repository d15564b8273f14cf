use serde::{Deserialize, Serialize};
use crate::shared::types::{EncryptionAlgorithm, KdfAlgorithm};

/// Parameters needed to re-derive the cipher key from the owning password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KdfParams {
    pub algorithm: KdfAlgorithm,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    /// PBKDF2 rounds, or the Argon2 time cost.
    pub iterations: u32,
    /// Argon2 memory cost in KiB; absent for PBKDF2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_cost: Option<u32>,
}

impl KdfParams {
    pub fn pbkdf2(salt: Vec<u8>, iterations: u32) -> Self {
        Self {
            algorithm: KdfAlgorithm::Pbkdf2Sha256,
            salt,
            iterations,
            memory_cost: None,
        }
    }

    pub fn argon2id(salt: Vec<u8>, time_cost: u32, memory_cost: u32) -> Self {
        Self {
            algorithm: KdfAlgorithm::Argon2id,
            salt,
            iterations: time_cost,
            memory_cost: Some(memory_cost),
        }
    }
}

/// Encrypted data structure
///
/// The persisted key blob: cipher output split into ciphertext and tag,
/// alongside the nonce and KDF parameters. Byte fields serialize as base64.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedData {
    pub algorithm: EncryptionAlgorithm,
    pub kdf: KdfParams,
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub tag: Vec<u8>,
}

// Ciphertext is not secret, but it has no business in logs either.
impl std::fmt::Debug for EncryptedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedData")
            .field("algorithm", &self.algorithm)
            .field("kdf", &self.kdf.algorithm)
            .field("iterations", &self.kdf.iterations)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedData {
        EncryptedData {
            algorithm: EncryptionAlgorithm::AES256GCM,
            kdf: KdfParams::pbkdf2(vec![9u8; 32], 600_000),
            ciphertext: vec![1, 2, 3, 4],
            nonce: vec![5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
            tag: vec![0xAA; 16],
        }
    }

    #[test]
    fn test_encrypted_data_serializes_bytes_as_base64() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["ciphertext"], "AQIDBA==");
        assert_eq!(json["algorithm"], "aes-256-gcm");
        assert_eq!(json["kdf"]["algorithm"], "pbkdf2-sha256");
        assert_eq!(json["kdf"]["iterations"], 600_000);
        assert!(json["kdf"].get("memory_cost").is_none());
    }

    #[test]
    fn test_encrypted_data_restores_from_json() {
        let data = sample();
        let json = serde_json::to_string(&data).unwrap();
        let restored: EncryptedData = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_debug_hides_ciphertext() {
        let rendered = format!("{:?}", sample());
        assert!(rendered.contains("ciphertext_len: 4"));
        assert!(!rendered.contains("[1, 2, 3, 4]"));
    }
}
