use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::types::KdfAlgorithm;
use crate::shared::WalletResult;

/// Password-based key derivation settings for newly encrypted blobs.
///
/// Existing blobs always decrypt with the parameters recorded on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfConfig {
    pub algorithm: KdfAlgorithm,
    pub salt_length: usize,
    /// PBKDF2 rounds, or the Argon2 time cost.
    pub iterations: u32,
    pub memory_cost: u32,
    pub parallelism: u32,
}

impl KdfConfig {
    pub fn pbkdf2(iterations: u32) -> Self {
        Self {
            algorithm: KdfAlgorithm::Pbkdf2Sha256,
            iterations,
            ..Self::default()
        }
    }

    pub fn argon2id() -> Self {
        Self {
            algorithm: KdfAlgorithm::Argon2id,
            salt_length: SALT_SIZE,
            iterations: ARGON2_TIME_COST,
            memory_cost: ARGON2_MEMORY_COST,
            parallelism: ARGON2_PARALLELISM,
        }
    }

    pub fn validate(&self) -> WalletResult<()> {
        if self.algorithm == KdfAlgorithm::Pbkdf2Sha256 && self.iterations < PBKDF2_MIN_ITERATIONS {
            return Err(WalletError::config(format!(
                "PBKDF2 iterations must be at least {}, got {}",
                PBKDF2_MIN_ITERATIONS, self.iterations
            )));
        }
        if self.iterations == 0 {
            return Err(WalletError::config("KDF iterations must be positive"));
        }
        Ok(())
    }
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            algorithm: KdfAlgorithm::Pbkdf2Sha256,
            salt_length: SALT_SIZE,
            iterations: PBKDF2_ITERATIONS,
            memory_cost: ARGON2_MEMORY_COST,
            parallelism: ARGON2_PARALLELISM,
        }
    }
}
