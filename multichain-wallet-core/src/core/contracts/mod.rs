//! Read-only ERC-20 contract access
//!
//! Calls go through a `RpcTransport` so the retry and timeout policy can be
//! exercised without a live node.

pub mod abi;
pub mod client;
pub mod retry;
pub mod transport;

pub use client::*;
pub use retry::*;
pub use transport::*;
