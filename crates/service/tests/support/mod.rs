#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use sha3::{Digest, Keccak256};

use common::chain::CommunityAddress;
use common::crypto::{Address, Identity};
use common::userop::UserOperation;

use service::chain::{ChainClient, ChainClientError, LogEntry};
use service::community::Community;
use service::http::auth::AuthPolicy;
use service::ServiceState;

pub const COMMUNITY_JSON: &str = r#"{
    "gateway": "0x0000000000000000000000000000000000000001",
    "paymaster": "0x0000000000000000000000000000000000000002",
    "accountFactory": "0x0000000000000000000000000000000000000003",
    "gratitudeFactory": "0x0000000000000000000000000000000000000004",
    "profileFactory": "0x0000000000000000000000000000000000000005",
    "token": "0x0000000000000000000000000000000000000006",
    "chain": {
        "name": "Base Sepolia",
        "chain": "ETH",
        "rpc": ["https://sepolia.base.org"],
        "nativeCurrency": {"name": "Ether", "symbol": "ETH", "decimals": 18},
        "shortName": "basesep",
        "chainID": 84532,
        "networkID": 84532
    }
}"#;

pub const ACCOUNT_ADDRESS: &str = "0x39bc81005a2bea2122a2f2fd963db3ac8adbc518";

/// The paymaster balance the mock chain reports: 1.5 eth in wei
pub const PAYMASTER_BALANCE: u128 = 1_500_000_000_000_000_000;

fn pad(address: Address) -> String {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&*address);
    format!("0x{}", hex::encode(word))
}

/// Canned chain client: sponsors are pass-through, submissions return fixed
/// hashes, `owner()` reads answer with the configured owner, every other
/// factory view reports the same account address, and the event log holds a
/// single voucher transfer to that account
pub struct MockChain {
    pub owner: Address,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            owner: Address::from([0u8; 20]),
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for MockChain {
    async fn next_nonce(&self, _address: Address) -> Result<u64, ChainClientError> {
        Ok(0)
    }

    async fn balance(&self, _address: Address) -> Result<u128, ChainClientError> {
        Ok(PAYMASTER_BALANCE)
    }

    async fn estimate_gas(&self, _call: serde_json::Value) -> Result<u64, ChainClientError> {
        Ok(21_000)
    }

    async fn logs(&self, _filter: serde_json::Value) -> Result<Vec<LogEntry>, ChainClientError> {
        let account = Address::from_hex(ACCOUNT_ADDRESS).unwrap();
        let topic = Keccak256::digest(b"TransferSingle(address,address,address,uint256,uint256)");
        let mut value = [0u8; 32];
        value[31] = 5;

        Ok(vec![LogEntry {
            address: Address::from([6u8; 20]),
            topics: vec![
                format!("0x{}", hex::encode(topic)),
                pad(self.owner),
                pad(Address::from([0u8; 20])),
                pad(account),
            ],
            data: format!("0x{}{}", hex::encode([0u8; 32]), hex::encode(value)),
            transaction_hash: Some("0xvoucher".to_string()),
            block_number: Some("0x1".to_string()),
        }])
    }

    async fn send_raw_transaction(&self, _raw: &str) -> Result<String, ChainClientError> {
        Ok("0xtxhash".to_string())
    }

    async fn call(&self, _to: Address, data: &str) -> Result<String, ChainClientError> {
        let owner_selector = hex::encode(&Keccak256::digest(b"owner()")[..4]);
        if data.trim_start_matches("0x").starts_with(&owner_selector) {
            return Ok(pad(self.owner));
        }

        Ok(pad(Address::from_hex(ACCOUNT_ADDRESS).unwrap()))
    }

    async fn sponsor_user_operation(
        &self,
        op: UserOperation,
        _entry_point: Address,
    ) -> Result<UserOperation, ChainClientError> {
        Ok(op)
    }

    async fn send_user_operation(
        &self,
        _op: UserOperation,
        _entry_point: Address,
    ) -> Result<String, ChainClientError> {
        Ok("0xophash".to_string())
    }
}

pub fn test_app() -> (Router, Identity) {
    test_app_with_chain(MockChain::default())
}

pub fn test_app_with_chain(chain: MockChain) -> (Router, Identity) {
    let server = Identity::generate();
    let community_address: CommunityAddress = serde_json::from_str(COMMUNITY_JSON).unwrap();
    let community = Arc::new(Community::new(Arc::new(chain), community_address, None));
    let state = ServiceState::new(
        Arc::new(server.clone()),
        community,
        Arc::new(AuthPolicy::default()),
    );
    (service::http::router(state), server)
}
