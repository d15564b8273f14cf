//! Token tracking and balance caching
//!
//! This module keeps the per-chain token registry and the per-wallet
//! balance cache, and refreshes balances concurrently through a
//! `ContractReader`.

pub mod engine;
pub mod outcome;

pub use engine::*;
pub use outcome::*;
