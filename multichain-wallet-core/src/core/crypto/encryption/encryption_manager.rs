use super::{EncryptedData, EncryptionAlgorithm, KdfParams};
use crate::shared::constants::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use chacha20poly1305::{ChaCha20Poly1305, Key as ChaChaKey, Nonce as ChaChaNonce};
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

/// Authenticated encryption of the wallet key blob
pub struct EncryptionManager {
    algorithm: EncryptionAlgorithm,
}

impl EncryptionManager {
    pub fn new(algorithm: EncryptionAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn new_default() -> Self {
        Self::new(EncryptionAlgorithm::AES256GCM)
    }

    pub fn algorithm(&self) -> EncryptionAlgorithm {
        self.algorithm
    }

    /// Encrypt data with a derived key, recording the KDF parameters that produced it
    pub fn encrypt(
        &self,
        data: &[u8],
        key: &[u8; KEY_SIZE],
        kdf: KdfParams,
    ) -> WalletResult<EncryptedData> {
        let nonce_bytes = self.generate_nonce();

        let sealed = match self.algorithm {
            EncryptionAlgorithm::AES256GCM => {
                let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
                cipher
                    .encrypt(Nonce::from_slice(&nonce_bytes), data)
                    .map_err(|e| WalletError::crypto(format!("AES-GCM encryption failed: {}", e)))?
            }
            EncryptionAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new(ChaChaKey::from_slice(key));
                cipher
                    .encrypt(ChaChaNonce::from_slice(&nonce_bytes), data)
                    .map_err(|e| {
                        WalletError::crypto(format!("ChaCha20-Poly1305 encryption failed: {}", e))
                    })?
            }
        };

        // Split ciphertext and tag
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_SIZE);

        Ok(EncryptedData {
            algorithm: self.algorithm,
            kdf,
            ciphertext: ciphertext.to_vec(),
            nonce: nonce_bytes.to_vec(),
            tag: tag.to_vec(),
        })
    }

    /// Decrypt a blob with a derived key.
    ///
    /// The cipher recorded on the blob wins over the manager's configured one.
    /// Every failure past the shape checks reads "Decryption failed".
    pub fn decrypt(
        &self,
        encrypted_data: &EncryptedData,
        key: &[u8; KEY_SIZE],
    ) -> WalletResult<Zeroizing<Vec<u8>>> {
        if encrypted_data.nonce.len() != NONCE_SIZE || encrypted_data.tag.len() != TAG_SIZE {
            return Err(WalletError::crypto("Malformed encrypted key blob"));
        }

        // Combine ciphertext and tag
        let mut ciphertext_with_tag = encrypted_data.ciphertext.clone();
        ciphertext_with_tag.extend_from_slice(&encrypted_data.tag);

        let plaintext = match encrypted_data.algorithm {
            EncryptionAlgorithm::AES256GCM => {
                let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
                cipher.decrypt(
                    Nonce::from_slice(&encrypted_data.nonce),
                    ciphertext_with_tag.as_slice(),
                )?
            }
            EncryptionAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new(ChaChaKey::from_slice(key));
                cipher.decrypt(
                    ChaChaNonce::from_slice(&encrypted_data.nonce),
                    ciphertext_with_tag.as_slice(),
                )?
            }
        };

        Ok(Zeroizing::new(plaintext))
    }

    /// Generate a secure random nonce
    fn generate_nonce(&self) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }
}
