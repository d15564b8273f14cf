use crate::shared::constants::*;
use crate::shared::error::{ValidationError, WalletError};
use crate::shared::utils::validate_private_key_hex;
use zeroize::Zeroizing;

/// Secure private key wrapper
///
/// The scalar lives in a zeroizing buffer and is only reachable through
/// `with_key`; it is wiped when the wrapper is dropped.
pub struct SecurePrivateKey {
    bytes: Zeroizing<[u8; PRIVATE_KEY_SIZE]>,
}

impl SecurePrivateKey {
    /// Wrap raw key bytes, checking they form a valid secp256k1 scalar
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(ValidationError::InvalidKeyFormat(format!(
                "Private key must be {} bytes",
                PRIVATE_KEY_SIZE
            )));
        }

        let mut buffer = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        buffer.copy_from_slice(bytes);
        Self::from_buffer(buffer)
    }

    /// Parse a hex private key, `0x` optional
    pub fn from_hex(text: &str) -> Result<Self, ValidationError> {
        let cleaned = validate_private_key_hex(text)?;

        let mut buffer = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        hex::decode_to_slice(cleaned, &mut buffer[..])
            .map_err(|e| ValidationError::InvalidKeyFormat(e.to_string()))?;
        Self::from_buffer(buffer)
    }

    fn from_buffer(buffer: Zeroizing<[u8; PRIVATE_KEY_SIZE]>) -> Result<Self, ValidationError> {
        let mut scalar = secp256k1::SecretKey::from_byte_array(*buffer).map_err(|_| {
            ValidationError::InvalidKeyFormat(
                "Private key is not a valid secp256k1 scalar".to_string(),
            )
        })?;
        scalar.non_secure_erase();
        Ok(Self { bytes: buffer })
    }

    /// Perform an operation with the key bytes without handing out ownership
    pub fn with_key<F, T>(&self, f: F) -> Result<T, WalletError>
    where
        F: FnOnce(&[u8; PRIVATE_KEY_SIZE]) -> Result<T, WalletError>,
    {
        f(&self.bytes)
    }
}

// No Clone implementation to prevent accidental key duplication
impl std::fmt::Debug for SecurePrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecurePrivateKey(<redacted>)")
    }
}
