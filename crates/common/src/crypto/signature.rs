use std::ops::Deref;

use k256::ecdsa::RecoveryId;

/// Size of a compact recoverable signature in bytes: r (32) || s (32) || v (1)
pub const SIGNATURE_SIZE: usize = 65;

/// Errors that can occur parsing a recoverable signature
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature error: {0}")]
    Default(#[from] anyhow::Error),
}

/// A compact recoverable ECDSA signature
///
/// Fixed byte layout: `r (32) || s (32) || v (1)`, where `v` is the recovery
/// id stored as `0` or `1`. Parsing also accepts the legacy `27`/`28`
/// convention and normalizes it; any other recovery byte is rejected up
/// front so that verification fails deterministically rather than recovering
/// a wrong key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_SIZE]);

impl Deref for RecoverableSignature {
    type Target = [u8; SIGNATURE_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<&[u8]> for RecoverableSignature {
    type Error = SignatureError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != SIGNATURE_SIZE {
            return Err(anyhow::anyhow!(
                "invalid signature size, expected {}, got {}",
                SIGNATURE_SIZE,
                bytes.len()
            )
            .into());
        }
        let mut buff = [0; SIGNATURE_SIZE];
        buff.copy_from_slice(bytes);

        // normalize the legacy 27/28 recovery byte to 0/1
        buff[64] = match buff[64] {
            v @ 0..=1 => v,
            v @ 27..=28 => v - 27,
            v => return Err(anyhow::anyhow!("invalid recovery id: {}", v).into()),
        };

        Ok(RecoverableSignature(buff))
    }
}

impl RecoverableSignature {
    /// Assemble a signature from its ECDSA parts
    pub fn from_parts(signature: &k256::ecdsa::Signature, recovery_id: RecoveryId) -> Self {
        let mut buff = [0; SIGNATURE_SIZE];
        buff[..64].copy_from_slice(&signature.to_bytes());
        buff[64] = recovery_id.to_byte();
        RecoverableSignature(buff)
    }

    /// Parse a signature from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, SignatureError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex).map_err(|_| anyhow::anyhow!("signature hex decode error"))?;
        Self::try_from(bytes.as_slice())
    }

    /// Render the signature as hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The `r || s` component as an ECDSA signature
    ///
    /// # Errors
    ///
    /// Returns an error if `r` or `s` is out of range for the curve.
    pub fn signature(&self) -> Result<k256::ecdsa::Signature, SignatureError> {
        k256::ecdsa::Signature::from_slice(&self.0[..64])
            .map_err(|_| anyhow::anyhow!("signature scalars out of range").into())
    }

    /// The recovery id component
    pub fn recovery_id(&self) -> Result<RecoveryId, SignatureError> {
        RecoveryId::from_byte(self.0[64])
            .ok_or_else(|| anyhow::anyhow!("invalid recovery id: {}", self.0[64]).into())
    }
}
