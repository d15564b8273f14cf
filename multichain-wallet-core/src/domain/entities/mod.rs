//! Domain entities and value objects
//!
//! This module contains the core domain entities and value objects
//! that represent the business concepts in the wallet system.

pub mod chain;
pub mod wallet;
pub mod token;
pub mod pairing;

// Re-export entities
pub use chain::*;
pub use wallet::*;
pub use token::*;
pub use pairing::*;
