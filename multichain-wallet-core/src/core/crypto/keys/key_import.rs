//! Wallet key import
//!
//! Validation, derivation and at-rest encryption of wallet key material.
//! Validation is synchronous, side-effect free and always runs before any
//! cryptographic work.

use super::{KeyManager, KeyMaterial, KeySource, SecurePrivateKey, SecureSeedPhrase};
use crate::core::crypto::encryption::{EncryptedData, EncryptionAlgorithm, EncryptionManager};
use crate::core::crypto::password::{KdfConfig, PasswordKeyDeriver};
use crate::domain::entities::{ChainConfig, Wallet};
use crate::shared::constants::MNEMONIC_WORD_COUNTS;
use crate::shared::error::{ValidationError, WalletError};
use crate::shared::types::Address;
use crate::shared::utils::{split_mnemonic, validate_password, validate_wallet_name};
use crate::shared::WalletResult;
use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::Zeroizing;

/// Imports and creates wallets from mnemonics or raw private keys
pub struct KeyImportService {
    keys: KeyManager,
    kdf: PasswordKeyDeriver,
    encryption: EncryptionManager,
}

impl KeyImportService {
    pub fn new(kdf: KdfConfig, cipher: EncryptionAlgorithm) -> Self {
        Self {
            keys: KeyManager::new(),
            kdf: PasswordKeyDeriver::new(kdf),
            encryption: EncryptionManager::new(cipher),
        }
    }

    /// Check a mnemonic: exactly 12 or 24 words, then wordlist and checksum.
    ///
    /// Returns the normalized phrase, words in order.
    pub fn validate_mnemonic(&self, text: &str) -> Result<SecureSeedPhrase, ValidationError> {
        let words = Zeroizing::new(split_mnemonic(text)?);
        let phrase = SecureSeedPhrase::from_words(&words);

        Mnemonic::parse_in_normalized(Language::English, phrase.as_str())
            .map_err(|e| ValidationError::InvalidMnemonic(e.to_string()))?;

        Ok(phrase)
    }

    /// Check a private key: optional `0x`, 64 hex characters, valid scalar
    pub fn validate_private_key(&self, text: &str) -> Result<SecurePrivateKey, ValidationError> {
        SecurePrivateKey::from_hex(text)
    }

    pub fn validate_source(&self, source: &KeySource) -> Result<KeyMaterial, ValidationError> {
        match source {
            KeySource::Mnemonic(phrase) => {
                self.validate_mnemonic(phrase).map(KeyMaterial::Mnemonic)
            }
            KeySource::PrivateKey(hex) => {
                self.validate_private_key(hex).map(KeyMaterial::PrivateKey)
            }
        }
    }

    /// Deterministic address for `material` under `chain`'s derivation parameters
    pub fn derive(&self, material: &KeyMaterial, chain: &ChainConfig) -> WalletResult<Address> {
        self.keys.derive_address(material, chain)
    }

    /// Encrypt key material under a password-derived key with a fresh salt
    pub fn encrypt(&self, material: &KeyMaterial, password: &str) -> WalletResult<EncryptedData> {
        validate_password(password)?;

        let params = self.kdf.fresh_params();
        let key = self.kdf.derive_key(password, &params)?;
        let plaintext = material.to_bytes()?;

        self.encryption.encrypt(&plaintext, &key, params)
    }

    /// Decrypt a blob back into key material.
    ///
    /// A wrong password and a tampered blob both fail with the same
    /// generic `Crypto` error.
    pub fn decrypt(&self, blob: &EncryptedData, password: &str) -> WalletResult<KeyMaterial> {
        let key = self.kdf.derive_key(password, &blob.kdf)?;
        let plaintext = self.encryption.decrypt(blob, &key)?;
        KeyMaterial::from_bytes(&plaintext)
    }

    /// Run `f` with the decrypted key material; it is wiped on every exit path
    pub fn with_decrypted<F, T>(
        &self,
        blob: &EncryptedData,
        password: &str,
        f: F,
    ) -> WalletResult<T>
    where
        F: FnOnce(&KeyMaterial) -> WalletResult<T>,
    {
        let material = self.decrypt(blob, password)?;
        f(&material)
    }

    /// Validate, derive and encrypt, producing an unpersisted wallet record.
    ///
    /// Duplicate detection is the store's job at insert time.
    pub fn import_wallet(
        &self,
        source: &KeySource,
        name: &str,
        password: &str,
        chain: &ChainConfig,
    ) -> WalletResult<Wallet> {
        let material = self.validate_source(source)?;
        validate_password(password)?;
        validate_wallet_name(name)?;

        self.wallet_from_material(&material, name, password, chain)
    }

    /// Generate a fresh BIP-39 phrase of 12 or 24 words
    pub fn generate_mnemonic(&self, word_count: usize) -> WalletResult<SecureSeedPhrase> {
        if !MNEMONIC_WORD_COUNTS.contains(&word_count) {
            return Err(ValidationError::InvalidWordCount(word_count).into());
        }

        // 12 words carry 128 bits of entropy, 24 words 256
        let mut entropy = Zeroizing::new(vec![0u8; word_count / 3 * 4]);
        rand::rngs::OsRng.fill_bytes(&mut entropy);

        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| WalletError::crypto(format!("Failed to generate mnemonic: {}", e)))?;
        let phrase = Zeroizing::new(mnemonic.to_string());

        Ok(SecureSeedPhrase::new(&phrase))
    }

    /// Generate a phrase and build a wallet from it.
    ///
    /// The phrase is returned so the caller can show it for backup.
    pub fn create_wallet(
        &self,
        word_count: usize,
        name: &str,
        password: &str,
        chain: &ChainConfig,
    ) -> WalletResult<(Wallet, SecureSeedPhrase)> {
        validate_password(password)?;
        validate_wallet_name(name)?;

        let phrase = self.generate_mnemonic(word_count)?;
        let material = KeyMaterial::Mnemonic(SecureSeedPhrase::new(phrase.as_str()));
        let wallet = self.wallet_from_material(&material, name, password, chain)?;

        Ok((wallet, phrase))
    }

    /// Derive and encrypt already validated material into a wallet record
    pub fn wallet_from_material(
        &self,
        material: &KeyMaterial,
        name: &str,
        password: &str,
        chain: &ChainConfig,
    ) -> WalletResult<Wallet> {
        let address = self.derive(material, chain)?;
        let encrypted_key = self.encrypt(material, password)?;

        Wallet::new(
            name.to_string(),
            address,
            chain.chain_id,
            material.kind(),
            encrypted_key,
        )
    }
}

impl Default for KeyImportService {
    fn default() -> Self {
        Self::new(KdfConfig::default(), EncryptionAlgorithm::AES256GCM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::SupportedChain;
    use crate::shared::types::KeySourceKind;
    use crate::test_support::{fast_service, TEST_MNEMONIC, TEST_PASSWORD};
    use proptest::prelude::*;

    fn mainnet() -> ChainConfig {
        SupportedChain::EthereumMainnet.config()
    }

    #[test]
    fn test_eleven_words_fail_word_count() {
        let service = fast_service();
        let eleven = TEST_MNEMONIC.splitn(2, ' ').nth(1).unwrap();
        let result = service.import_wallet(&KeySource::mnemonic(eleven), "Main", TEST_PASSWORD, &mainnet());
        assert!(matches!(
            result,
            Err(WalletError::Validation(ValidationError::InvalidWordCount(11)))
        ));
    }

    #[test]
    fn test_bad_checksum_fails_mnemonic_check() {
        let service = fast_service();
        let bad = TEST_MNEMONIC.replace("about", "abandon");
        assert!(matches!(
            service.validate_mnemonic(&bad),
            Err(ValidationError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_validate_mnemonic_normalizes() {
        let service = fast_service();
        let shouty = TEST_MNEMONIC.to_uppercase().replace(' ', "  ");
        let phrase = service.validate_mnemonic(&shouty).unwrap();
        assert_eq!(phrase.as_str(), TEST_MNEMONIC);
        assert_eq!(phrase.word_count(), 12);
    }

    #[test]
    fn test_import_mnemonic_wallet() {
        let service = fast_service();
        let wallet = service
            .import_wallet(&KeySource::mnemonic(TEST_MNEMONIC), "Main", TEST_PASSWORD, &mainnet())
            .unwrap();

        assert_eq!(wallet.address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert_eq!(wallet.chain_id, 1);
        assert_eq!(wallet.key_source, KeySourceKind::Mnemonic);
        assert_eq!(wallet.encrypted_key.kdf.salt.len(), 32);
        assert_eq!(wallet.encrypted_key.kdf.iterations, 1_000);
    }

    #[test]
    fn test_import_private_key_wallet() {
        let service = fast_service();
        let key = format!("0x{}1", "0".repeat(63));
        let wallet = service
            .import_wallet(&KeySource::private_key(key), "Hot", TEST_PASSWORD, &mainnet())
            .unwrap();
        assert_eq!(wallet.address, "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
        assert_eq!(wallet.key_source, KeySourceKind::PrivateKey);
    }

    #[test]
    fn test_weak_password_is_rejected() {
        let service = fast_service();
        let material = service.validate_source(&KeySource::mnemonic(TEST_MNEMONIC)).unwrap();
        assert!(matches!(
            service.encrypt(&material, "short"),
            Err(WalletError::Validation(ValidationError::WeakPassword(8)))
        ));

        let result = service.import_wallet(&KeySource::mnemonic(TEST_MNEMONIC), "Main", "1234567", &mainnet());
        assert!(matches!(
            result,
            Err(WalletError::Validation(ValidationError::WeakPassword(_)))
        ));
    }

    #[test]
    fn test_encrypt_then_decrypt_recovers_material() {
        let service = fast_service();
        let material = service.validate_source(&KeySource::mnemonic(TEST_MNEMONIC)).unwrap();
        let blob = service.encrypt(&material, TEST_PASSWORD).unwrap();

        let address = service
            .with_decrypted(&blob, TEST_PASSWORD, |m| service.derive(m, &mainnet()))
            .unwrap();
        assert_eq!(address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    }

    #[test]
    fn test_wrong_password_fails_generically() {
        let service = fast_service();
        let material = service.validate_source(&KeySource::mnemonic(TEST_MNEMONIC)).unwrap();
        let blob = service.encrypt(&material, TEST_PASSWORD).unwrap();

        let err = service.decrypt(&blob, "not the password").unwrap_err();
        assert_eq!(err.to_string(), "Cryptographic error: Decryption failed");
    }

    #[test]
    fn test_each_encryption_uses_fresh_salt_and_nonce() {
        let service = fast_service();
        let material = service.validate_source(&KeySource::mnemonic(TEST_MNEMONIC)).unwrap();
        let a = service.encrypt(&material, TEST_PASSWORD).unwrap();
        let b = service.encrypt(&material, TEST_PASSWORD).unwrap();
        assert_ne!(a.kdf.salt, b.kdf.salt);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_generate_mnemonic_word_counts() {
        let service = fast_service();
        for count in [12, 24] {
            let phrase = service.generate_mnemonic(count).unwrap();
            assert_eq!(phrase.word_count(), count);
            assert!(service.validate_mnemonic(phrase.as_str()).is_ok());
        }
        assert!(matches!(
            service.generate_mnemonic(15),
            Err(WalletError::Validation(ValidationError::InvalidWordCount(15)))
        ));
    }

    #[test]
    fn test_create_wallet_returns_backup_phrase() {
        let service = fast_service();
        let (wallet, phrase) = service.create_wallet(12, "Fresh", TEST_PASSWORD, &mainnet()).unwrap();
        let material = service.validate_source(&KeySource::mnemonic(phrase.as_str())).unwrap();
        assert_eq!(service.derive(&material, &mainnet()).unwrap(), wallet.address);
    }

    #[test]
    fn test_chacha_cipher_service() {
        let service = KeyImportService::new(KdfConfig::pbkdf2(1_000), EncryptionAlgorithm::ChaCha20Poly1305);
        let material = service.validate_source(&KeySource::mnemonic(TEST_MNEMONIC)).unwrap();
        let blob = service.encrypt(&material, TEST_PASSWORD).unwrap();
        assert_eq!(blob.algorithm, EncryptionAlgorithm::ChaCha20Poly1305);
        assert_eq!(service.decrypt(&blob, TEST_PASSWORD).unwrap().kind(), KeySourceKind::Mnemonic);
    }

    proptest! {
        #[test]
        fn prop_word_counts_other_than_12_or_24_fail(count in 0usize..40) {
            prop_assume!(count != 12 && count != 24);
            let service = fast_service();
            let phrase = vec!["abandon"; count].join(" ");
            prop_assert_eq!(
                service.validate_mnemonic(&phrase).unwrap_err(),
                ValidationError::InvalidWordCount(count)
            );
        }
    }
}
