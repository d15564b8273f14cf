use crate::domain::entities::{Token, TokenWithBalance};
use crate::shared::error::WalletError;

/// Result of a batch balance refresh.
///
/// A refresh never fails as a whole because one token failed; each token
/// lands in exactly one of the two lists.
#[derive(Debug, Clone, Default)]
pub struct RefreshOutcome {
    pub succeeded: Vec<TokenWithBalance>,
    pub failed: Vec<TokenFailure>,
}

/// A token whose balance could not be fetched. Its cached value is unchanged.
#[derive(Debug, Clone)]
pub struct TokenFailure {
    pub token: Token,
    pub error: WalletError,
}

impl RefreshOutcome {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// True when every requested token refreshed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}
