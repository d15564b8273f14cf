//! Domain layer - entities and repository traits
//!
//! This module contains the records the wallet core manages and the seams
//! (persistence, contract reads, cache eviction) its services depend on.

pub mod entities;
pub mod repositories;

// Re-export domain components
pub use entities::*;
pub use repositories::*;
