use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use sha3::{Digest, Keccak256};

use crate::crypto::{Address, IdentityError};

/// Current envelope protocol version; receivers reject anything else
pub const ENVELOPE_VERSION: u8 = 1;
/// Validity window stamped on a fresh envelope, in seconds
pub const ENVELOPE_TTL_SECS: i64 = 10;

/// Errors that can occur handling envelopes
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(anyhow::Error),
    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(u8),
    #[error("envelope expired")]
    Expired,
    #[error("recovered address does not match envelope address")]
    AddressMismatch,
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// The versioned, timestamped, addressed wrapper around a request or
/// response payload
///
/// The canonical byte form is the JSON serialization of this struct. Field
/// order is fixed by the struct declaration (`version`, `expiry`, `address`,
/// `data`), which keeps the signed hash reproducible; a map-based encoding
/// would not be order-stable. `data` is base64 in the JSON form and `expiry`
/// is integer Unix seconds.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Protocol version tag
    pub version: u8,
    /// Unix timestamp after which the envelope is dead
    pub expiry: i64,
    /// The claimed sender address; bound to the signature at verification
    pub address: Address,
    /// Opaque payload, usually a JSON-encoded request or response body
    #[serde_as(as = "Base64")]
    pub data: Vec<u8>,
}

impl Envelope {
    /// Construct a fresh envelope stamped with the current version and an
    /// expiry of now + [`ENVELOPE_TTL_SECS`]
    pub fn new(address: Address, data: Vec<u8>) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            expiry: Utc::now().timestamp() + ENVELOPE_TTL_SECS,
            address,
            data,
        }
    }

    /// Serialize the envelope to its canonical byte form
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_json::to_vec(self).map_err(|e| EnvelopeError::Malformed(e.into()))
    }

    /// Deserialize an envelope from its canonical byte form
    ///
    /// # Errors
    ///
    /// Returns `Malformed` if required fields are missing or mistyped.
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        serde_json::from_slice(bytes).map_err(|e| EnvelopeError::Malformed(e.into()))
    }

    /// Keccak-256 hash of the canonical byte form; this is what gets signed
    pub fn hash(&self) -> Result<[u8; 32], EnvelopeError> {
        let encoded = self.encode()?;
        Ok(Keccak256::digest(&encoded).into())
    }
}
