use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use k256::ecdh::EphemeralSecret;
use k256::ecdsa::{SigningKey, VerifyingKey};
use sha2::Sha256;

use super::address::Address;
use super::keys::{PublicKey, SecretKey, COMPRESSED_PUBLIC_KEY_SIZE};
use super::signature::RecoverableSignature;

/// Size of the ChaCha20-Poly1305 nonce in bytes
const NONCE_SIZE: usize = 12;
/// Size of the derived symmetric key in bytes
const SYMMETRIC_KEY_SIZE: usize = 32;
/// Domain separator for the HKDF key derivation
const HKDF_INFO: &[u8] = b"station envelope encryption v1";
/// Minimum ciphertext length: ephemeral key || nonce || auth tag
const MIN_CIPHERTEXT_SIZE: usize = COMPRESSED_PUBLIC_KEY_SIZE + NONCE_SIZE + 16;

/// Errors that can occur during identity operations
///
/// `Decryption` deliberately carries no detail: callers must not be able to
/// distinguish a wrong key from a tampered ciphertext.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid key material")]
    InvalidKey,
    #[error("signing failed")]
    SigningFailed,
    #[error("signature recovery failed")]
    RecoveryFailed,
    #[error("encryption failed")]
    Encryption,
    #[error("decryption failed")]
    Decryption,
}

/// A key pair plus its derived address, representing one party in the
/// envelope protocol
///
/// Constructed once at process startup from a configured secret key and
/// shared read-only across request workers; it holds no mutable state.
#[derive(Debug, Clone)]
pub struct Identity {
    secret: SecretKey,
    public: PublicKey,
    address: Address,
}

impl From<SecretKey> for Identity {
    fn from(secret: SecretKey) -> Self {
        let public = secret.public();
        let address = Address::from(&public);
        Self {
            secret,
            public,
            address,
        }
    }
}

impl Identity {
    /// Create an identity with a freshly generated key pair
    pub fn generate() -> Self {
        Self::from(SecretKey::generate())
    }

    /// The identity's public key
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// The address derived from the identity's public key
    pub fn address(&self) -> Address {
        self.address
    }

    /// Produce a compact recoverable signature over a 32-byte digest
    pub fn sign(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, IdentityError> {
        let signing_key = SigningKey::from(&*self.secret);
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|_| IdentityError::SigningFailed)?;
        Ok(RecoverableSignature::from_parts(&signature, recovery_id))
    }

    /// Recover the signer's address from a digest and a recoverable signature
    ///
    /// # Errors
    ///
    /// Returns `RecoveryFailed` on a malformed signature (scalars out of
    /// range, invalid recovery id, or no curve point recoverable).
    pub fn recover_address(
        digest: &[u8; 32],
        signature: &RecoverableSignature,
    ) -> Result<Address, IdentityError> {
        let ecdsa = signature
            .signature()
            .map_err(|_| IdentityError::RecoveryFailed)?;
        let recovery_id = signature
            .recovery_id()
            .map_err(|_| IdentityError::RecoveryFailed)?;
        let verifying_key = VerifyingKey::recover_from_prehash(digest, &ecdsa, recovery_id)
            .map_err(|_| IdentityError::RecoveryFailed)?;
        let public = PublicKey::from(k256::PublicKey::from(&verifying_key));
        Ok(Address::from(&public))
    }

    /// Hybrid-encrypt a plaintext for a recipient's public key
    ///
    /// ECIES construction: an ephemeral secp256k1 key pair performs ECDH
    /// against the recipient key, the shared secret runs through
    /// HKDF-SHA-256, and the derived key encrypts the plaintext with
    /// ChaCha20-Poly1305.
    ///
    /// Output layout: `ephemeral compressed pubkey (33) || nonce (12) || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8], recipient: &PublicKey) -> Result<Vec<u8>, IdentityError> {
        let ephemeral = EphemeralSecret::random(&mut rand::rngs::OsRng);
        let ephemeral_public = PublicKey::from(ephemeral.public_key());
        let shared = ephemeral.diffie_hellman(recipient);

        let mut key_bytes = [0u8; SYMMETRIC_KEY_SIZE];
        shared
            .extract::<Sha256>(None)
            .expand(HKDF_INFO, &mut key_bytes)
            .map_err(|_| IdentityError::Encryption)?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key_bytes));
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes).map_err(|_| IdentityError::Encryption)?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| IdentityError::Encryption)?;

        let mut out =
            Vec::with_capacity(COMPRESSED_PUBLIC_KEY_SIZE + NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&ephemeral_public.to_bytes());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);

        Ok(out)
    }

    /// Decrypt a ciphertext addressed to this identity
    ///
    /// # Errors
    ///
    /// Returns `Decryption` on any failure: truncated input, a malformed
    /// ephemeral key, or an authentication tag mismatch. The cause is never
    /// distinguished.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, IdentityError> {
        if ciphertext.len() < MIN_CIPHERTEXT_SIZE {
            return Err(IdentityError::Decryption);
        }

        let ephemeral_public =
            k256::PublicKey::from_sec1_bytes(&ciphertext[..COMPRESSED_PUBLIC_KEY_SIZE])
                .map_err(|_| IdentityError::Decryption)?;
        let shared = k256::ecdh::diffie_hellman(
            self.secret.to_nonzero_scalar(),
            ephemeral_public.as_affine(),
        );

        let mut key_bytes = [0u8; SYMMETRIC_KEY_SIZE];
        shared
            .extract::<Sha256>(None)
            .expand(HKDF_INFO, &mut key_bytes)
            .map_err(|_| IdentityError::Decryption)?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key_bytes));
        let nonce = Nonce::from_slice(
            &ciphertext[COMPRESSED_PUBLIC_KEY_SIZE..COMPRESSED_PUBLIC_KEY_SIZE + NONCE_SIZE],
        );

        cipher
            .decrypt(nonce, &ciphertext[COMPRESSED_PUBLIC_KEY_SIZE + NONCE_SIZE..])
            .map_err(|_| IdentityError::Decryption)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sha3::{Digest, Keccak256};

    const PRIV_HEX: &str = "b123284ed609ca4c19a78124567d606f1202630e72784602475f1eb0b3f0a0a2";
    const ADDRESS_HEX: &str = "0x39bc81005a2bea2122a2f2fd963db3ac8adbc518";

    fn digest(data: &[u8]) -> [u8; 32] {
        Keccak256::digest(data).into()
    }

    #[test]
    fn test_sign_and_recover() {
        let identity = Identity::from(SecretKey::from_hex(PRIV_HEX).unwrap());
        let hash = digest(b"hello, world!");

        let signature = identity.sign(&hash).unwrap();
        let recovered = Identity::recover_address(&hash, &signature).unwrap();

        assert_eq!(recovered, identity.address());
        assert_eq!(recovered.to_hex(), ADDRESS_HEX);
    }

    #[test]
    fn test_recover_wrong_digest_yields_wrong_address() {
        let identity = Identity::generate();
        let signature = identity.sign(&digest(b"original message")).unwrap();

        // recovering against a different digest must not come back to the
        // signer's address
        match Identity::recover_address(&digest(b"tampered message"), &signature) {
            Ok(address) => assert_ne!(address, identity.address()),
            Err(IdentityError::RecoveryFailed) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let sender = Identity::generate();
        let recipient = Identity::generate();
        let plaintext = b"{\"hello\":\"world\"}";

        let ciphertext = sender.encrypt(plaintext, recipient.public()).unwrap();
        let decrypted = recipient.decrypt(&ciphertext).unwrap();

        assert_eq!(decrypted.as_slice(), plaintext);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let sender = Identity::generate();
        let recipient = Identity::generate();
        let eavesdropper = Identity::generate();

        let ciphertext = sender.encrypt(b"secret", recipient.public()).unwrap();
        assert!(matches!(
            eavesdropper.decrypt(&ciphertext),
            Err(IdentityError::Decryption)
        ));
    }

    #[test]
    fn test_decrypt_tampered_ciphertext_fails() {
        let sender = Identity::generate();
        let recipient = Identity::generate();

        let mut ciphertext = sender.encrypt(b"secret", recipient.public()).unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;

        assert!(matches!(
            recipient.decrypt(&ciphertext),
            Err(IdentityError::Decryption)
        ));
    }

    #[test]
    fn test_decrypt_truncated_ciphertext_fails() {
        let recipient = Identity::generate();
        assert!(matches!(
            recipient.decrypt(&[0u8; 10]),
            Err(IdentityError::Decryption)
        ));
    }

    #[test]
    fn test_empty_plaintext_round_trip() {
        let sender = Identity::generate();
        let recipient = Identity::generate();

        let ciphertext = sender.encrypt(b"", recipient.public()).unwrap();
        assert_eq!(recipient.decrypt(&ciphertext).unwrap(), Vec::<u8>::new());
    }
}
