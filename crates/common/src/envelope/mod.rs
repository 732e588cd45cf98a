//! The secure envelope protocol
//!
//! Every protected API request and response travels inside an `Envelope`: a
//! versioned, timestamped, addressed wrapper around an opaque payload. The
//! envelope gives each call three properties, layered rather than fused:
//!
//! - **Replay protection**: the `expiry` field is part of the signed content
//!   and acts as a nonce substitute. An envelope is valid for a short, fixed
//!   window ([`ENVELOPE_TTL_SECS`]) after creation and is never reused.
//! - **Authenticity**: a compact recoverable signature over the Keccak-256
//!   hash of the canonical envelope bytes. The recovered signer address must
//!   equal the envelope's `address` field.
//! - **Confidentiality**: the canonical envelope bytes are ECIES-encrypted
//!   for the recipient. The signature is always computed over the plaintext
//!   envelope, never the ciphertext, so it stays meaningful independent of
//!   the encryption parameters.
//!
//! An envelope's life is linear and terminal: created, signed, then either
//! accepted or rejected (expired, bad signature, or address mismatch). There
//! are no retries at this layer; a failed envelope is discarded and the
//! caller mints a fresh one with a new expiry.

mod envelope;
mod protocol;

pub use envelope::{Envelope, EnvelopeError, ENVELOPE_TTL_SECS, ENVELOPE_VERSION};
pub use protocol::SealedEnvelope;
