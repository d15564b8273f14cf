//! Password-based key derivation for the wallet core
//!
//! This module turns the owning password into the cipher key for a wallet's
//! encrypted blob (PBKDF2-HMAC-SHA256 or Argon2id).

pub mod key_derivation;
pub mod password_config;

// Re-export all public items from submodules
pub use key_derivation::*;
pub use password_config::*;
