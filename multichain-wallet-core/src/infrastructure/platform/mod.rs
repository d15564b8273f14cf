//! Platform storage backends
//!
//! Durable and in-memory implementations of `StorageRepository`.
//!
//! SECURITY: records only ever contain encrypted key blobs. The wallet file
//! is still written owner-only (0600) on unix and replaced atomically so a
//! crash mid-write never leaves a truncated file behind.

use crate::domain::entities::Wallet;
use crate::domain::repositories::StorageRepository;
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// On-disk layout of the wallet file
#[derive(Debug, Serialize, Deserialize)]
struct WalletFile {
    version: u32,
    wallets: Vec<Wallet>,
}

/// JSON file backend
pub struct FileStorage {
    path: PathBuf,
    // Serializes writers so temp files never collide
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Storage at the OS application data directory
    pub fn at_default_location() -> Self {
        Self::new(Self::default_path())
    }

    /// `<data_dir>/multichain-wallet/wallets.json`
    pub fn default_path() -> PathBuf {
        // Use OS-specific app data directory
        let base_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base_dir.join(STORAGE_DIR_NAME).join(STORAGE_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| STORAGE_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    #[cfg(unix)]
    async fn restrict_permissions(path: &Path) -> Result<(), WalletError> {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
        Ok(())
    }

    #[cfg(not(unix))]
    async fn restrict_permissions(_path: &Path) -> Result<(), WalletError> {
        Ok(())
    }
}

#[async_trait]
impl StorageRepository for FileStorage {
    async fn load_wallets(&self) -> Result<Vec<Wallet>, WalletError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No wallet file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let file: WalletFile = serde_json::from_slice(&data)?;
        if file.version > WALLET_FILE_VERSION {
            return Err(WalletError::storage(format!(
                "Unsupported wallet file version {} (expected at most {})",
                file.version, WALLET_FILE_VERSION
            )));
        }

        for wallet in &file.wallets {
            wallet.validate()?;
        }

        Ok(file.wallets)
    }

    async fn save_wallets(&self, wallets: &[Wallet]) -> Result<(), WalletError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = WalletFile {
            version: WALLET_FILE_VERSION,
            wallets: wallets.to_vec(),
        };
        let data = serde_json::to_vec_pretty(&file)?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, &data).await?;
        Self::restrict_permissions(&temp).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        log::debug!("Persisted {} wallet(s) to {}", wallets.len(), self.path.display());
        Ok(())
    }
}

/// Volatile backend for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStorage {
    wallets: Mutex<Vec<Wallet>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wallets(wallets: Vec<Wallet>) -> Self {
        Self {
            wallets: Mutex::new(wallets),
        }
    }
}

#[async_trait]
impl StorageRepository for MemoryStorage {
    async fn load_wallets(&self) -> Result<Vec<Wallet>, WalletError> {
        Ok(self.wallets.lock().await.clone())
    }

    async fn save_wallets(&self, wallets: &[Wallet]) -> Result<(), WalletError> {
        *self.wallets.lock().await = wallets.to_vec();
        Ok(())
    }
}
