//! Core wallet functionality
//!
//! This module contains the chain catalogue, key handling, the wallet
//! store, ERC-20 contract access, token balance tracking and pairing
//! string intake.

pub mod chains;
pub mod crypto;
pub mod wallet;
pub mod contracts;
pub mod tokens;
pub mod pairing;
