use std::ops::Deref;

use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Size of a secp256k1 private key in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of a SEC1 compressed secp256k1 public key in bytes
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;
/// Size of a SEC1 uncompressed secp256k1 public key in bytes
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 65;

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Public key identifying one party in the envelope protocol
///
/// A thin wrapper around a secp256k1 public key. This key serves two purposes:
/// - **Identity**: the party's address is derived from it (Keccak-256 of the
///   uncompressed point, last 20 bytes)
/// - **Confidentiality**: it is the recipient key for envelope encryption
///
/// On the wire (the `X-PubKey` header) the key travels as hex; both the
/// compressed (33 byte) and uncompressed (65 byte) SEC1 forms are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(k256::PublicKey);

impl Deref for PublicKey {
    type Target = k256::PublicKey;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<k256::PublicKey> for PublicKey {
    fn from(key: k256::PublicKey) -> Self {
        PublicKey(key)
    }
}

impl From<PublicKey> for k256::PublicKey {
    fn from(key: PublicKey) -> Self {
        key.0
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let key = k256::PublicKey::from_sec1_bytes(bytes)
            .map_err(|_| anyhow::anyhow!("invalid SEC1 public key encoding"))?;
        Ok(PublicKey(key))
    }
}

impl PublicKey {
    /// Parse a public key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex, in compressed or
    /// uncompressed SEC1 form.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes =
            hex::decode(hex).map_err(|_| anyhow::anyhow!("public key hex decode error"))?;
        Self::try_from(bytes.as_slice())
    }

    /// Convert public key to compressed SEC1 bytes
    pub fn to_bytes(&self) -> [u8; COMPRESSED_PUBLIC_KEY_SIZE] {
        let point = self.0.to_encoded_point(true);
        let mut buff = [0; COMPRESSED_PUBLIC_KEY_SIZE];
        buff.copy_from_slice(point.as_bytes());
        buff
    }

    /// Convert public key to uncompressed SEC1 bytes (0x04 || X || Y)
    pub fn to_uncompressed_bytes(&self) -> [u8; UNCOMPRESSED_PUBLIC_KEY_SIZE] {
        let point = self.0.to_encoded_point(false);
        let mut buff = [0; UNCOMPRESSED_PUBLIC_KEY_SIZE];
        buff.copy_from_slice(point.as_bytes());
        buff
    }

    /// Convert public key to compressed hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        PublicKey::from_hex(&hex).map_err(de::Error::custom)
    }
}

/// Secret key for a party's identity
///
/// A thin wrapper around a secp256k1 secret key. This key should be kept
/// secret and securely stored (e.g. `~/.station/key.pem`); it is loaded once
/// at process startup and never serialized back out by this crate.
#[derive(Clone)]
pub struct SecretKey(k256::SecretKey);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print key material
        f.write_str("SecretKey(..)")
    }
}

impl From<k256::SecretKey> for SecretKey {
    fn from(secret: k256::SecretKey) -> Self {
        Self(secret)
    }
}

impl Deref for SecretKey {
    type Target = k256::SecretKey;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl SecretKey {
    /// Parse a secret key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; PRIVATE_KEY_SIZE];
        hex::decode_to_slice(hex, &mut buff)
            .map_err(|_| anyhow::anyhow!("private key hex decode error"))?;
        Self::from_slice(&buff)
    }

    /// Create a secret key from raw scalar bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid non-zero scalar on the
    /// secp256k1 curve.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let secret = k256::SecretKey::from_slice(bytes)
            .map_err(|_| anyhow::anyhow!("invalid secret key scalar"))?;
        Ok(Self(secret))
    }

    /// Generate a new random secret key using a cryptographically secure RNG
    pub fn generate() -> Self {
        Self(k256::SecretKey::random(&mut rand::rngs::OsRng))
    }

    /// Derive the public key from this secret key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.public_key())
    }

    /// Convert secret key to raw bytes
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.0.to_bytes().into()
    }

    /// Convert secret key to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Encode secret key in PEM format for secure storage
    ///
    /// Returns a PEM-encoded string with tag "PRIVATE KEY".
    pub fn to_pem(&self) -> String {
        let pem = pem::Pem::new("PRIVATE KEY", self.to_bytes().to_vec());
        pem::encode(&pem)
    }

    /// Parse a secret key from PEM format
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The PEM string is malformed
    /// - The PEM tag is not "PRIVATE KEY"
    /// - The key size is incorrect
    pub fn from_pem(pem_str: &str) -> Result<Self, KeyError> {
        let pem = pem::parse(pem_str).map_err(|e| anyhow::anyhow!("failed to parse PEM: {}", e))?;

        if pem.tag() != "PRIVATE KEY" {
            return Err(anyhow::anyhow!("invalid PEM tag, expected PRIVATE KEY").into());
        }

        let contents = pem.contents();
        if contents.len() != PRIVATE_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid private key size in PEM, expected {}, got {}",
                PRIVATE_KEY_SIZE,
                contents.len()
            )
            .into());
        }

        Self::from_slice(contents)
    }
}
