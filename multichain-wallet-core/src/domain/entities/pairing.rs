//! Validated remote-session pairing request

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pairing URI that passed validation, with its parsed parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PairingRequest {
    /// Trimmed URI as received.
    pub uri: String,
    pub scheme: String,
    pub topic: String,
    pub version: u32,
    /// Query parameters, percent-decoded.
    pub params: BTreeMap<String, String>,
}

impl PairingRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn relay_protocol(&self) -> Option<&str> {
        self.param("relay-protocol")
    }

    /// Session expiry as a unix timestamp, when the URI carries one.
    pub fn expiry_timestamp(&self) -> Option<i64> {
        self.param("expiryTimestamp").and_then(|v| v.parse().ok())
    }
}
