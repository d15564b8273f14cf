//! Key derivation and address computation
//!
//! Turns validated key material plus a chain's derivation parameters into
//! the secp256k1 key and EIP-55 address for that chain.

use super::{KeyMaterial, SecurePrivateKey, SecureSeedPhrase};
use crate::domain::entities::ChainConfig;
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::types::Address;
use crate::shared::utils::checksum_address;
use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

/// Key manager for derivation and address operations
pub struct KeyManager {
    secp256k1: Secp256k1<secp256k1::All>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self {
            secp256k1: Secp256k1::new(),
        }
    }

    /// Address for `material` on `chain`. Deterministic.
    ///
    /// Mnemonics follow `m/44'/<coin>'/0'/0/0` with the chain's coin type;
    /// a raw private key yields the same address on every chain.
    pub fn derive_address(
        &self,
        material: &KeyMaterial,
        chain: &ChainConfig,
    ) -> Result<Address, WalletError> {
        match material {
            KeyMaterial::PrivateKey(key) => self.address_of(key),
            KeyMaterial::Mnemonic(phrase) => {
                let key = self.derive_private_key_from_seed(phrase, chain.coin_type)?;
                self.address_of(&key)
            }
        }
    }

    /// Derive the account key for `coin_type` from a seed phrase
    pub fn derive_private_key_from_seed(
        &self,
        phrase: &SecureSeedPhrase,
        coin_type: u32,
    ) -> Result<SecurePrivateKey, WalletError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase.as_str())
            .map_err(|e| WalletError::crypto(format!("Invalid BIP39 seed phrase: {}", e)))?;

        let seed = Zeroizing::new(mnemonic.to_seed_normalized("")); // No passphrase

        let xprv = XPrv::new(&seed[..])
            .map_err(|e| WalletError::crypto(format!("Failed to create XPrv: {}", e)))?;

        let path = format!("m/{}'/{}'/0'/0/0", BIP44_PURPOSE, coin_type);
        let derivation_path = DerivationPath::from_str(&path)
            .map_err(|e| WalletError::crypto(format!("Invalid derivation path: {}", e)))?;

        let mut child_xprv = xprv;
        for child_number in derivation_path.into_iter() {
            child_xprv = child_xprv
                .derive_child(child_number)
                .map_err(|e| WalletError::crypto(format!("Failed to derive child XPrv: {}", e)))?;
        }

        let mut derived = child_xprv.private_key().to_bytes();
        let key = SecurePrivateKey::from_bytes(derived.as_slice());
        derived.as_mut_slice().zeroize();
        key.map_err(WalletError::from)
    }

    /// EIP-55 address of a private key
    pub fn address_of(&self, private_key: &SecurePrivateKey) -> Result<Address, WalletError> {
        private_key.with_key(|key_bytes| {
            let mut secret_key = SecretKey::from_byte_array(*key_bytes)?;
            let public_key = PublicKey::from_secret_key(&self.secp256k1, &secret_key);
            secret_key.non_secure_erase();
            let public_key_bytes = public_key.serialize_uncompressed();
            debug_assert_eq!(public_key_bytes.len(), PUBLIC_KEY_SIZE);

            // Hash without the 0x04 prefix; the address is the last 20 bytes
            let hash = Keccak256::digest(&public_key_bytes[1..]);
            let mut address = [0u8; ADDRESS_SIZE];
            address.copy_from_slice(&hash[12..]);

            Ok(checksum_address(&address))
        })
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}
