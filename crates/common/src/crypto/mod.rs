//! Cryptographic primitives for Station
//!
//! This module provides the cryptographic foundation for the secure envelope
//! protocol:
//!
//! - **Identity & Authentication**: secp256k1 key pairs with Ethereum-style
//!   derived addresses and compact recoverable ECDSA signatures
//! - **Confidentiality**: ECIES-style hybrid encryption (ephemeral ECDH +
//!   HKDF-SHA-256 + ChaCha20-Poly1305)
//!
//! # Security Model
//!
//! ## Identity
//! Each party holds a secp256k1 key pair (`SecretKey`/`PublicKey`). The
//! party's `Address` is the last 20 bytes of the Keccak-256 hash of the
//! uncompressed public key, so a valid recoverable signature is enough to
//! tie a message to an address without shipping the public key alongside it.
//!
//! ## Signatures
//! Signatures are compact and recoverable: `r (32) || s (32) || v (1)`.
//! Given the signed digest, the signer's public key (and therefore address)
//! is recovered from the signature itself.
//!
//! ## Encryption
//! To encrypt for a recipient:
//! 1. Generate an ephemeral secp256k1 key pair
//! 2. Perform ECDH between the ephemeral secret and the recipient key
//! 3. Derive a symmetric key with HKDF-SHA-256
//! 4. Encrypt the payload with ChaCha20-Poly1305
//! 5. Prepend the ephemeral public key and nonce to the ciphertext
//!
//! The recipient repeats the ECDH with their own secret key and the
//! transmitted ephemeral public key to recover the symmetric key. Encryption
//! provides no sender authenticity on its own; that is carried by the
//! separate signature over the plaintext.

mod address;
mod identity;
mod keys;
mod signature;

pub use address::{Address, AddressError, ADDRESS_SIZE};
pub use identity::{Identity, IdentityError};
pub use keys::{KeyError, PublicKey, SecretKey};
pub use signature::{RecoverableSignature, SignatureError, SIGNATURE_SIZE};
