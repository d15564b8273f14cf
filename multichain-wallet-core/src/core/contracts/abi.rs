//! ERC-20 call encoding and return decoding

use crate::shared::constants::*;
use crate::shared::error::{ValidationError, WalletError};
use crate::shared::utils::{bytes_to_hex, validate_address};
use crate::shared::WalletResult;
use ethers::abi::{self, ParamType, Token as AbiToken};
use ethers::types::{H160, U256};

pub fn name_call() -> String {
    SELECTOR_NAME.to_string()
}

pub fn symbol_call() -> String {
    SELECTOR_SYMBOL.to_string()
}

pub fn decimals_call() -> String {
    SELECTOR_DECIMALS.to_string()
}

/// `balanceOf(owner)` calldata
pub fn balance_of_call(owner: &str) -> WalletResult<String> {
    validate_address(owner)?;
    let mut bytes = [0u8; ADDRESS_SIZE];
    hex::decode_to_slice(&owner[2..], &mut bytes)
        .map_err(|e| ValidationError::InvalidAddress(e.to_string()))?;

    let encoded = abi::encode(&[AbiToken::Address(H160::from(bytes))]);
    Ok(format!("{}{}", SELECTOR_BALANCE_OF, hex::encode(encoded)))
}

fn return_bytes(result: &str) -> WalletResult<Vec<u8>> {
    let clean = result.strip_prefix("0x").unwrap_or(result);
    let bytes = hex::decode(clean)
        .map_err(|e| WalletError::contract_call(format!("Return data is not hex: {}", e)))?;
    if bytes.is_empty() {
        // Calls to non-contracts succeed with no data
        return Err(WalletError::contract_call("Empty return data (0x)"));
    }
    Ok(bytes)
}

/// Decode a `string` return, falling back to the legacy `bytes32` form
pub fn decode_string(result: &str) -> WalletResult<String> {
    let bytes = return_bytes(result)?;

    if let Ok(tokens) = abi::decode(&[ParamType::String], &bytes) {
        if let Some(AbiToken::String(value)) = tokens.into_iter().next() {
            return Ok(value);
        }
    }

    if bytes.len() == 32 {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        return std::str::from_utf8(&bytes[..end])
            .map(|s| s.to_string())
            .map_err(|_| WalletError::contract_call("bytes32 return is not UTF-8"));
    }

    Err(WalletError::contract_call(format!(
        "Undecodable string return ({})",
        bytes_to_hex(&bytes[..bytes.len().min(8)])
    )))
}

pub fn decode_uint(result: &str) -> WalletResult<U256> {
    let bytes = return_bytes(result)?;
    match abi::decode(&[ParamType::Uint(256)], &bytes) {
        Ok(tokens) => match tokens.into_iter().next() {
            Some(AbiToken::Uint(value)) => Ok(value),
            _ => Err(WalletError::contract_call("Unexpected uint return")),
        },
        Err(e) => Err(WalletError::contract_call(format!("Undecodable uint return: {}", e))),
    }
}

/// Decimals must fit in 0..=255
pub fn decode_decimals(result: &str) -> WalletResult<u8> {
    let value = decode_uint(result)?;
    if value > U256::from(u8::MAX) {
        return Err(WalletError::contract_call(format!("Decimals out of range: {}", value)));
    }
    Ok(value.as_u32() as u8)
}

#[cfg(test)]
pub(crate) fn encode_string(value: &str) -> String {
    bytes_to_hex(&abi::encode(&[AbiToken::String(value.to_string())]))
}

#[cfg(test)]
pub(crate) fn encode_uint(value: U256) -> String {
    bytes_to_hex(&abi::encode(&[AbiToken::Uint(value)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_of_calldata() {
        let data = balance_of_call("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf").unwrap();
        assert_eq!(
            data,
            "0x70a082310000000000000000000000007e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_balance_of_rejects_bad_owner() {
        assert!(matches!(balance_of_call("0x1234"), Err(WalletError::Validation(_))));
    }

    #[test]
    fn test_decode_string() {
        assert_eq!(decode_string(&encode_string("USD Coin")).unwrap(), "USD Coin");
    }

    #[test]
    fn test_decode_bytes32_string() {
        let mut word = [0u8; 32];
        word[..3].copy_from_slice(b"MKR");
        assert_eq!(decode_string(&bytes_to_hex(&word)).unwrap(), "MKR");
    }

    #[test]
    fn test_empty_return_is_contract_failure() {
        assert!(matches!(decode_string("0x"), Err(WalletError::ContractCallFailed(_))));
        assert!(matches!(decode_uint("0x"), Err(WalletError::ContractCallFailed(_))));
    }

    #[test]
    fn test_decode_decimals_range() {
        assert_eq!(decode_decimals(&encode_uint(U256::from(6))).unwrap(), 6);
        assert_eq!(decode_decimals(&encode_uint(U256::from(255))).unwrap(), 255);
        assert!(matches!(
            decode_decimals(&encode_uint(U256::from(256))),
            Err(WalletError::ContractCallFailed(_))
        ));
    }

    #[test]
    fn test_decode_large_balance() {
        let value = U256::MAX - U256::from(1);
        assert_eq!(decode_uint(&encode_uint(value)).unwrap(), value);
    }
}
