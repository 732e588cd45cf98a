//! Station service: the community API server and its client.
//!
//! This crate provides everything behind the `station serve` command:
//! - Chain access (JSON-RPC client behind the `ChainClient` trait)
//! - Community facade (smart accounts, user operations, vouchers)
//! - HTTP layer (envelope middleware, responder, handlers, secure client)
//! - Push token registry
//! - Process plumbing (logging, graceful shutdown)

pub mod chain;
pub mod community;
pub mod config;
pub mod http;
pub mod process;
pub mod push;
pub mod state;
pub mod voucher;

// Re-export key types for convenience
pub use config::Config;
pub use state::{State as ServiceState, StateSetupError};
