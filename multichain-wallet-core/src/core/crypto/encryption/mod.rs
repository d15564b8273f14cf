//! Encryption functionality for the wallet core
//!
//! This module handles AES-256-GCM and ChaCha20-Poly1305 encryption of the
//! wallet key blob.

pub mod encryption_manager;
pub mod encrypted_data;

// Re-export all public items from submodules
pub use encryption_manager::*;
pub use encrypted_data::*;
pub use crate::shared::types::EncryptionAlgorithm;
