//! Constants for the wallet core
//!
//! This module contains all constants used throughout the wallet core.

// Wallet constants
pub const WALLET_FILE_VERSION: u32 = 1;
pub const WALLET_NAME_MAX_LENGTH: usize = 50;
pub const WALLET_NAME_MIN_LENGTH: usize = 1;
pub const STORAGE_DIR_NAME: &str = "multichain-wallet";
pub const STORAGE_FILE_NAME: &str = "wallets.json";

// Security constants
pub const PRIVATE_KEY_SIZE: usize = 32;
pub const PUBLIC_KEY_SIZE: usize = 65;
pub const ADDRESS_SIZE: usize = 20;
pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;
pub const SALT_SIZE: usize = 32;

// Password constants
pub const PASSWORD_MIN_LENGTH: usize = 8;

// Key derivation constants
pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const PBKDF2_MIN_ITERATIONS: u32 = 100_000;
pub const ARGON2_MEMORY_COST: u32 = 65536; // 64MB
pub const ARGON2_TIME_COST: u32 = 3;
pub const ARGON2_PARALLELISM: u32 = 1;

// Mnemonic constants
pub const MNEMONIC_WORD_COUNTS: [usize; 2] = [12, 24];
pub const BIP44_PURPOSE: u32 = 44;
pub const COIN_TYPE_ETHEREUM: u32 = 60;
pub const COIN_TYPE_TESTNET: u32 = 1;

// Validation constants
pub const ADDRESS_LENGTH: usize = 42; // 0x + 40 hex chars
pub const PRIVATE_KEY_HEX_LENGTH: usize = 64;

// ERC-20 function selectors
pub const SELECTOR_NAME: &str = "0x06fdde03";
pub const SELECTOR_SYMBOL: &str = "0x95d89b41";
pub const SELECTOR_DECIMALS: &str = "0x313ce567";
pub const SELECTOR_BALANCE_OF: &str = "0x70a08231";

// Network timeouts and retries
pub const RPC_TIMEOUT_MS: u64 = 10_000;
pub const RPC_MAX_RETRIES: u32 = 2;
pub const RPC_MAX_RETRIES_CEILING: u32 = 5;
pub const RPC_BACKOFF_MS: u64 = 250;

// Balance cache
pub const BALANCE_TTL_SECS: u64 = 300;

// Pairing
pub const PAIRING_SCHEME: &str = "wc";

// Build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
