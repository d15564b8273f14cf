//! Error handling for the wallet core
//!
//! This module defines the error types used throughout the wallet core.

use thiserror::Error;

/// Rejected input. Never retried and always raised before any crypto or network work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Mnemonic must contain 12 or 24 words, got {0}")]
    InvalidWordCount(usize),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid private key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Password must be at least {0} characters long")]
    WeakPassword(usize),

    #[error("Invalid pairing string: {0}")]
    InvalidPairing(String),

    #[error("Invalid wallet name: {0}")]
    InvalidName(String),
}

/// Wallet error type
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Contract call failed: {0}")]
    ContractCallFailed(String),

    #[error("Wallet already exists: {0}")]
    DuplicateAddress(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(u64),

    #[error("Re-authentication required: {0}")]
    ReauthenticationRequired(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a cryptographic error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a transient network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a non-transient contract call error
    pub fn contract_call(message: impl Into<String>) -> Self {
        Self::ContractCallFailed(message.into())
    }

    pub fn duplicate_address(message: impl Into<String>) -> Self {
        Self::DuplicateAddress(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the failure may succeed on a later attempt.
    ///
    /// Only network level failures (timeouts, refused connections, 5xx/429
    /// responses) qualify; everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

// Standard library error conversions
impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(format!("IO error: {}", err))
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(err: hex::FromHexError) -> Self {
        Self::Validation(ValidationError::InvalidKeyFormat(format!("Hex decoding error: {}", err)))
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for WalletError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

impl From<config::ConfigError> for WalletError {
    fn from(err: config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        // Connection, timeout and body-read failures are worth another attempt.
        if err.is_decode() {
            Self::contract_call(format!("Malformed RPC response: {}", err))
        } else {
            Self::network(format!("RPC transport error: {}", err))
        }
    }
}

// Cryptographic error conversions
impl From<secp256k1::Error> for WalletError {
    fn from(err: secp256k1::Error) -> Self {
        Self::crypto(format!("Secp256k1 error: {}", err))
    }
}

impl From<argon2::Error> for WalletError {
    fn from(err: argon2::Error) -> Self {
        Self::crypto(format!("Argon2 error: {}", err))
    }
}

impl From<aes_gcm::Error> for WalletError {
    fn from(_: aes_gcm::Error) -> Self {
        // Deliberately opaque: a wrong password and a tampered blob look the same.
        Self::crypto("Decryption failed")
    }
}
