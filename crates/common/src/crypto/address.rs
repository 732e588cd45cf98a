use std::fmt;
use std::ops::Deref;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use super::keys::PublicKey;

/// Size of a derived address in bytes
pub const ADDRESS_SIZE: usize = 20;

/// Errors that can occur parsing an address
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("address error: {0}")]
    Default(#[from] anyhow::Error),
}

/// A 20-byte address derived from a secp256k1 public key
///
/// Derivation: Keccak-256 of the uncompressed public key's X || Y bytes,
/// keeping the last 20 bytes. The address is a pure function of the public
/// key and is never stored independently of it.
///
/// Rendered as "0x"-prefixed lowercase hex. Comparisons happen on the raw
/// bytes, which makes the textual comparison inherently case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Deref for Address {
    type Target = [u8; ADDRESS_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }
}

impl From<&PublicKey> for Address {
    fn from(key: &PublicKey) -> Self {
        let uncompressed = key.to_uncompressed_bytes();
        // skip the 0x04 SEC1 tag, hash X || Y
        let digest = Keccak256::digest(&uncompressed[1..]);
        let mut buff = [0; ADDRESS_SIZE];
        buff.copy_from_slice(&digest[digest.len() - ADDRESS_SIZE..]);
        Address(buff)
    }
}

impl Address {
    /// Parse an address from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex, in any letter case.
    pub fn from_hex(hex: &str) -> Result<Self, AddressError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; ADDRESS_SIZE];
        hex::decode_to_slice(hex, &mut buff)
            .map_err(|_| anyhow::anyhow!("address hex decode error"))?;
        Ok(Address(buff))
    }

    /// Render the address as "0x"-prefixed lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Address::from_hex(&hex).map_err(de::Error::custom)
    }
}
