/**
 * Chain and community descriptors.
 *  - chain.json descriptor for the chain we drive
 *  - <name>.community.json address book for the
 *    deployed community contracts
 */
pub mod chain;
/**
 * Cryptographic types and operations.
 *  - secp256k1 key pairs and derived addresses
 *  - recoverable signatures and ECIES encryption
 */
pub mod crypto;
/**
 * The secure envelope protocol: the versioned,
 *  timestamped, addressed wrapper that gives every
 *  API call confidentiality, authenticity, and
 *  replay protection.
 */
pub mod envelope;
/**
 * ERC-4337 style user operation wire shape.
 */
pub mod userop;
/**
 * Version information helpers set at compile time.
 */
pub mod version;
/**
 * Wei/gwei/eth denomination helpers.
 */
pub mod wei;

pub mod prelude {
    pub use crate::chain::{ChainConfig, CommunityAddress};
    pub use crate::crypto::{Address, Identity, PublicKey, RecoverableSignature, SecretKey};
    pub use crate::envelope::{Envelope, EnvelopeError, SealedEnvelope};
    pub use crate::version::build_info;
}
