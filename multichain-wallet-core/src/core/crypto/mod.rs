//! Cryptographic functionality for the wallet core
//!
//! This module provides key validation and derivation, password-based key
//! derivation, and authenticated encryption of wallet key material.
//!
//! SECURITY: plaintext key material is held in zeroizing buffers, only
//! exposed through scoped closures, and never logged.

pub mod keys;
pub mod encryption;
pub mod password;

// Re-export all public items from submodules
pub use keys::*;
pub use encryption::*;
pub use password::*;
