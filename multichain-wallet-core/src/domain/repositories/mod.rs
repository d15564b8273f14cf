//! Domain repositories
//!
//! This module contains the traits the core services depend on for
//! persistence and remote contract access.

pub mod storage_repository;
pub mod contract_repository;

// Re-export repositories
pub use storage_repository::*;
pub use contract_repository::*;
