//! Pairing string intake
//!
//! Validates a pairing URI that an external scanner decoded, before it is
//! handed to a session layer. Nothing here opens a connection.

use crate::domain::entities::PairingRequest;
use crate::shared::constants::PAIRING_SCHEME;
use crate::shared::error::ValidationError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    /// `wc:<topic>@<version>?<query>`
    static ref PAIRING_URI: Regex =
        Regex::new(r"^([a-z]+):([0-9A-Za-z-]+)@([0-9]+)\?(.+)$").expect("valid pairing regex");
    static ref HEX_32_BYTES: Regex = Regex::new(r"^[0-9a-fA-F]{64}$").expect("valid hex regex");
}

/// Validates and parses pairing strings
#[derive(Debug, Clone, Default)]
pub struct PairingIntake;

impl PairingIntake {
    pub fn new() -> Self {
        Self
    }

    /// Parse a pairing URI, rejecting anything that is not a well-formed
    /// version 1 or version 2 request.
    pub fn parse(&self, input: &str) -> Result<PairingRequest, ValidationError> {
        let uri = input.trim();
        let captures = PAIRING_URI
            .captures(uri)
            .ok_or_else(|| invalid("expected wc:<topic>@<version>?<params>"))?;

        let scheme = &captures[1];
        if scheme != PAIRING_SCHEME {
            return Err(invalid(format!("unsupported scheme '{}'", scheme)));
        }

        let topic = captures[2].to_string();
        let version: u32 = captures[3]
            .parse()
            .map_err(|_| invalid("version out of range"))?;

        let params: BTreeMap<String, String> = url::form_urlencoded::parse(captures[4].as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        match version {
            2 => Self::check_v2(&topic, &params)?,
            1 => Self::check_v1(&params)?,
            other => return Err(invalid(format!("unsupported version {}", other))),
        }

        log::debug!("Accepted v{} pairing request for topic {}", version, topic);
        Ok(PairingRequest {
            uri: uri.to_string(),
            scheme: scheme.to_string(),
            topic,
            version,
            params,
        })
    }

    pub fn is_valid(&self, input: &str) -> bool {
        self.parse(input).is_ok()
    }

    fn check_v2(topic: &str, params: &BTreeMap<String, String>) -> Result<(), ValidationError> {
        if !HEX_32_BYTES.is_match(topic) {
            return Err(invalid("topic must be 64 hex characters"));
        }
        require(params, "relay-protocol")?;
        let sym_key = require(params, "symKey")?;
        if !HEX_32_BYTES.is_match(sym_key) {
            return Err(invalid("symKey must be 64 hex characters"));
        }
        if let Some(expiry) = params.get("expiryTimestamp") {
            expiry
                .parse::<i64>()
                .map_err(|_| invalid("expiryTimestamp must be an integer"))?;
        }
        Ok(())
    }

    fn check_v1(params: &BTreeMap<String, String>) -> Result<(), ValidationError> {
        require(params, "bridge")?;
        require(params, "key")?;
        Ok(())
    }
}

fn require<'a>(
    params: &'a BTreeMap<String, String>,
    key: &str,
) -> Result<&'a str, ValidationError> {
    match params.get(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(invalid(format!("missing {}", key))),
    }
}

fn invalid(reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidPairing(reason.into())
}
