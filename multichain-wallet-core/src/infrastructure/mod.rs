//! Infrastructure layer - configuration, storage backends and logging
//!
//! This module contains the process-facing pieces of the wallet core:
//! configuration loading, wallet file storage and logger bootstrap.

pub mod config;
pub mod logging;
pub mod platform;

// Re-export infrastructure components
pub use self::config::*;
pub use logging::*;
pub use platform::*;
