use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::Address;

/// Errors that can occur loading chain or community descriptors
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid descriptor file: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChainNativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainExplorer {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub standard: String,
}

/// Descriptor for the chain the station drives, loaded from a `chain.json`
/// file (the upstream chainlist shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    pub chain: String,
    pub rpc: Vec<String>,
    #[serde(default)]
    pub faucets: Vec<String>,
    #[serde(rename = "nativeCurrency", default)]
    pub native_currency: ChainNativeCurrency,
    #[serde(rename = "shortName", default)]
    pub short_name: String,
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    #[serde(rename = "networkID", default)]
    pub network_id: u64,
    #[serde(default)]
    pub explorers: Vec<ChainExplorer>,
}

impl ChainConfig {
    /// Load a chain descriptor from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChainError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The primary RPC endpoint, if any is configured
    pub fn primary_rpc(&self) -> Option<&str> {
        self.rpc.first().map(String::as_str)
    }
}

/// Address book for one deployed community: the contract addresses the
/// station drives plus the chain they live on
///
/// Produced by the upstream deployment tooling as a `<name>.community.json`
/// file and exported verbatim to clients via `GET /community/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityAddress {
    pub gateway: Address,
    pub paymaster: Address,
    #[serde(rename = "accountFactory")]
    pub account_factory: Address,
    #[serde(rename = "gratitudeFactory")]
    pub gratitude_factory: Address,
    #[serde(rename = "profileFactory")]
    pub profile_factory: Address,
    pub token: Address,
    pub chain: ChainConfig,
}

impl CommunityAddress {
    /// Load a community address book from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChainError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
