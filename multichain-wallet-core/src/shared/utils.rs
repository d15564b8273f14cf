//! Utility functions for the wallet core
//!
//! This module contains common utility functions used throughout the wallet core.

use crate::shared::constants::*;
use crate::shared::error::ValidationError;
use ethers::types::{H160, U256};
use rand_core::OsRng;
use rand_core::RngCore;

/// Generate a unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Validate the canonical address format: `0x` followed by exactly 40 hex characters.
///
/// Checksum casing is not enforced; mixed case is accepted as-is.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if !address.starts_with("0x") {
        return Err(ValidationError::InvalidAddress("Address must start with 0x".to_string()));
    }

    if address.len() != ADDRESS_LENGTH {
        return Err(ValidationError::InvalidAddress(format!(
            "Address must be {} characters long",
            ADDRESS_LENGTH
        )));
    }

    // Check if all characters after 0x are valid hex
    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidAddress(
            "Address contains invalid hex characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate and lowercase an address for use as a lookup key.
pub fn normalize_address(address: &str) -> Result<String, ValidationError> {
    validate_address(address)?;
    Ok(address.to_ascii_lowercase())
}

/// Case-insensitive address comparison.
pub fn addresses_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Render 20 address bytes in EIP-55 checksum form.
pub fn checksum_address(bytes: &[u8; ADDRESS_SIZE]) -> String {
    ethers::utils::to_checksum(&H160::from_slice(bytes), None)
}

/// Parse a validated address into its checksum form.
pub fn to_checksum(address: &str) -> Result<String, ValidationError> {
    validate_address(address)?;
    let mut bytes = [0u8; ADDRESS_SIZE];
    hex::decode_to_slice(&address[2..], &mut bytes)
        .map_err(|e| ValidationError::InvalidAddress(e.to_string()))?;
    Ok(checksum_address(&bytes))
}

/// Strip an optional `0x` prefix and check for exactly 64 hex characters.
///
/// Returns the cleaned hex string; decoding is left to the caller.
pub fn validate_private_key_hex(private_key: &str) -> Result<&str, ValidationError> {
    let cleaned = private_key.trim();
    let cleaned = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(cleaned);

    if cleaned.len() != PRIVATE_KEY_HEX_LENGTH {
        return Err(ValidationError::InvalidKeyFormat(format!(
            "Private key must be {} hex characters, got {}",
            PRIVATE_KEY_HEX_LENGTH,
            cleaned.len()
        )));
    }

    if !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidKeyFormat(
            "Private key contains invalid hex characters".to_string(),
        ));
    }

    Ok(cleaned)
}

/// Split a mnemonic on whitespace and check the word count.
pub fn split_mnemonic(phrase: &str) -> Result<Vec<String>, ValidationError> {
    let words: Vec<String> = phrase.split_whitespace().map(|w| w.to_lowercase()).collect();
    if !MNEMONIC_WORD_COUNTS.contains(&words.len()) {
        return Err(ValidationError::InvalidWordCount(words.len()));
    }
    Ok(words)
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(ValidationError::WeakPassword(PASSWORD_MIN_LENGTH));
    }
    Ok(())
}

/// Validate a wallet display name
pub fn validate_wallet_name(name: &str) -> Result<(), ValidationError> {
    let length = name.trim().chars().count();
    if length < WALLET_NAME_MIN_LENGTH {
        return Err(ValidationError::InvalidName("Wallet name cannot be empty".to_string()));
    }
    if length > WALLET_NAME_MAX_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Wallet name must be at most {} characters",
            WALLET_NAME_MAX_LENGTH
        )));
    }
    Ok(())
}

/// Convert bytes to hex string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Format a raw integer amount with the token's decimals
pub fn format_units(amount: U256, decimals: u8) -> String {
    let amount_str = amount.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return amount_str;
    }

    if amount_str.len() <= decimals {
        // Pad with leading zeros
        let mut formatted = "0.".to_string();
        for _ in 0..(decimals - amount_str.len()) {
            formatted.push('0');
        }
        formatted.push_str(&amount_str);
        formatted
    } else {
        // Insert decimal point
        let mut formatted = amount_str;
        let decimal_pos = formatted.len() - decimals;
        formatted.insert(decimal_pos, '.');
        formatted
    }
}

/// Generate random bytes
pub fn generate_random_bytes(length: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; length];
    let mut rng = OsRng;
    rng.fill_bytes(&mut bytes);
    bytes
}
