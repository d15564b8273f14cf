use super::{SecurePrivateKey, SecureSeedPhrase};
use crate::shared::constants::PRIVATE_KEY_SIZE;
use crate::shared::error::WalletError;
use crate::shared::types::KeySourceKind;
use crate::shared::WalletResult;
use zeroize::Zeroizing;

const TAG_MNEMONIC: u8 = 0x01;
const TAG_PRIVATE_KEY: u8 = 0x02;

/// Untrusted key input as supplied by a caller
pub enum KeySource {
    Mnemonic(Zeroizing<String>),
    PrivateKey(Zeroizing<String>),
}

impl KeySource {
    pub fn mnemonic(phrase: impl Into<String>) -> Self {
        Self::Mnemonic(Zeroizing::new(phrase.into()))
    }

    pub fn private_key(hex: impl Into<String>) -> Self {
        Self::PrivateKey(Zeroizing::new(hex.into()))
    }

    pub fn kind(&self) -> KeySourceKind {
        match self {
            Self::Mnemonic(_) => KeySourceKind::Mnemonic,
            Self::PrivateKey(_) => KeySourceKind::PrivateKey,
        }
    }
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeySource::{:?}(<redacted>)", self.kind())
    }
}

/// Validated key material, the plaintext of a wallet's encrypted blob
#[derive(Debug)]
pub enum KeyMaterial {
    Mnemonic(SecureSeedPhrase),
    PrivateKey(SecurePrivateKey),
}

impl KeyMaterial {
    pub fn kind(&self) -> KeySourceKind {
        match self {
            Self::Mnemonic(_) => KeySourceKind::Mnemonic,
            Self::PrivateKey(_) => KeySourceKind::PrivateKey,
        }
    }

    /// Serialize as a one-byte kind tag followed by the payload.
    ///
    /// The buffer must not grow: a reallocation would leave an unwiped copy
    /// of the secret behind.
    pub fn to_bytes(&self) -> WalletResult<Zeroizing<Vec<u8>>> {
        match self {
            Self::Mnemonic(phrase) => {
                let phrase = phrase.as_str().as_bytes();
                let mut out = Zeroizing::new(Vec::with_capacity(1 + phrase.len()));
                out.push(TAG_MNEMONIC);
                out.extend_from_slice(phrase);
                Ok(out)
            }
            Self::PrivateKey(key) => {
                let mut out = Zeroizing::new(Vec::with_capacity(1 + PRIVATE_KEY_SIZE));
                out.push(TAG_PRIVATE_KEY);
                key.with_key(|bytes| {
                    out.extend_from_slice(bytes);
                    Ok(())
                })?;
                Ok(out)
            }
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let malformed = || WalletError::crypto("Malformed key material");

        match bytes.split_first() {
            Some((&TAG_MNEMONIC, payload)) => {
                let phrase = std::str::from_utf8(payload).map_err(|_| malformed())?;
                Ok(Self::Mnemonic(SecureSeedPhrase::new(phrase)))
            }
            Some((&TAG_PRIVATE_KEY, payload)) if payload.len() == PRIVATE_KEY_SIZE => {
                let key = SecurePrivateKey::from_bytes(payload).map_err(|_| malformed())?;
                Ok(Self::PrivateKey(key))
            }
            _ => Err(malformed()),
        }
    }
}
