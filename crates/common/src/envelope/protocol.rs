use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::crypto::{Identity, PublicKey, RecoverableSignature};

use super::envelope::{Envelope, EnvelopeError, ENVELOPE_VERSION};

/// A sealed envelope ready for transport: the ciphertext travels as the
/// request/response body, the signature as a side-channel header
#[derive(Debug, Clone)]
pub struct SealedEnvelope {
    /// Base64 ECIES ciphertext of the canonical envelope bytes
    pub ciphertext: String,
    /// Recoverable signature over the plaintext envelope hash
    pub signature: RecoverableSignature,
}

impl Envelope {
    /// Sign the envelope with the sender's identity
    ///
    /// The signature covers the Keccak-256 hash of the canonical envelope
    /// bytes, all fields in fixed order.
    pub fn sign(&self, identity: &Identity) -> Result<RecoverableSignature, EnvelopeError> {
        let hash = self.hash()?;
        Ok(identity.sign(&hash)?)
    }

    /// Verify the envelope against a signature at the given time
    ///
    /// Expiry is checked before any asymmetric-crypto work so that stale
    /// requests fail cheaply. The envelope is accepted only if the address
    /// recovered from the signature equals the envelope's `address` field.
    ///
    /// Rejection is terminal: there is no state to retry against, the caller
    /// must mint a fresh envelope.
    pub fn verify(
        &self,
        signature: &RecoverableSignature,
        now: i64,
    ) -> Result<(), EnvelopeError> {
        if now > self.expiry {
            return Err(EnvelopeError::Expired);
        }
        if self.version != ENVELOPE_VERSION {
            return Err(EnvelopeError::UnsupportedVersion(self.version));
        }

        let hash = self.hash()?;
        let recovered = Identity::recover_address(&hash, signature)?;
        if recovered != self.address {
            return Err(EnvelopeError::AddressMismatch);
        }

        Ok(())
    }

    /// Seal the envelope for a recipient: encrypt the canonical bytes for
    /// their public key and independently sign the *plaintext* envelope with
    /// the sender's identity
    ///
    /// Signing the plaintext rather than the ciphertext keeps the signature
    /// meaningful even if the encryption parameters change.
    pub fn seal(
        &self,
        recipient: &PublicKey,
        identity: &Identity,
    ) -> Result<SealedEnvelope, EnvelopeError> {
        let signature = self.sign(identity)?;
        let encoded = self.encode()?;
        let ciphertext = identity.encrypt(&encoded, recipient)?;
        Ok(SealedEnvelope {
            ciphertext: BASE64.encode(ciphertext),
            signature,
        })
    }

    /// Open a sealed envelope: decrypt with the recipient's own identity,
    /// decode, and run the same checks as [`Envelope::verify`]
    pub fn open(
        ciphertext: &str,
        signature: &RecoverableSignature,
        identity: &Identity,
        now: i64,
    ) -> Result<Envelope, EnvelopeError> {
        let raw = BASE64
            .decode(ciphertext)
            .map_err(|e| EnvelopeError::Malformed(e.into()))?;
        let plaintext = identity.decrypt(&raw)?;
        let envelope = Envelope::decode(&plaintext)?;
        envelope.verify(signature, now)?;
        Ok(envelope)
    }
}
