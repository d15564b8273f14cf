use super::KdfConfig;
use crate::core::crypto::encryption::KdfParams;
use crate::shared::constants::KEY_SIZE;
use crate::shared::error::WalletError;
use crate::shared::types::KdfAlgorithm;
use crate::shared::utils::generate_random_bytes;
use crate::shared::WalletResult;
use argon2::Argon2;
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Turns a password into a 256-bit cipher key
pub struct PasswordKeyDeriver {
    config: KdfConfig,
}

impl PasswordKeyDeriver {
    pub fn new(config: KdfConfig) -> Self {
        Self { config }
    }

    pub fn new_default() -> Self {
        Self::new(KdfConfig::default())
    }

    pub fn config(&self) -> &KdfConfig {
        &self.config
    }

    /// Fresh parameters (new random salt) for a blob about to be encrypted
    pub fn fresh_params(&self) -> KdfParams {
        let salt = generate_random_bytes(self.config.salt_length);
        match self.config.algorithm {
            KdfAlgorithm::Pbkdf2Sha256 => KdfParams::pbkdf2(salt, self.config.iterations),
            KdfAlgorithm::Argon2id => {
                KdfParams::argon2id(salt, self.config.iterations, self.config.memory_cost)
            }
        }
    }

    /// Derive the cipher key described by `params`
    pub fn derive_key(
        &self,
        password: &str,
        params: &KdfParams,
    ) -> WalletResult<Zeroizing<[u8; KEY_SIZE]>> {
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);

        match params.algorithm {
            KdfAlgorithm::Pbkdf2Sha256 => {
                pbkdf2::<Hmac<Sha256>>(
                    password.as_bytes(),
                    &params.salt,
                    params.iterations,
                    &mut key[..],
                )
                .map_err(|e| WalletError::crypto(format!("PBKDF2 error: {:?}", e)))?;
            }
            KdfAlgorithm::Argon2id => {
                let memory_cost = params
                    .memory_cost
                    .unwrap_or(self.config.memory_cost);
                let argon2 = Argon2::new(
                    argon2::Algorithm::Argon2id,
                    argon2::Version::V0x13,
                    argon2::Params::new(
                        memory_cost,
                        params.iterations,
                        self.config.parallelism,
                        Some(KEY_SIZE),
                    )?,
                );
                argon2.hash_password_into(password.as_bytes(), &params.salt, &mut key[..])?;
            }
        }

        Ok(key)
    }
}
