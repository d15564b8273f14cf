//! Key management for the wallet core
//!
//! This module handles validation, derivation, and scoped handling of wallet
//! key material.

pub mod secure_private_key;
pub mod secure_seed_phrase;
pub mod key_material;
pub mod key_manager;
pub mod key_import;

// Re-export all public items from submodules
pub use secure_private_key::*;
pub use secure_seed_phrase::*;
pub use key_material::*;
pub use key_manager::*;
pub use key_import::*;
