use std::sync::Arc;

use sha3::{Digest, Keccak256};

use common::chain::CommunityAddress;
use common::crypto::Address;
use common::userop::UserOperation;

use crate::chain::{ChainClient, ChainClientError, LogEntry};
use crate::voucher::{
    VoucherDescriptor, VoucherError, VoucherMetadata, VoucherTransfer, VoucherUploader,
};

/// Errors that can occur driving the community contracts
#[derive(Debug, thiserror::Error)]
pub enum CommunityError {
    #[error("chain error: {0}")]
    Chain(#[from] ChainClientError),
    #[error("voucher error: {0}")]
    Voucher(#[from] VoucherError),
    #[error("voucher uploads are not configured")]
    UploaderNotConfigured,
    #[error("caller does not own the account")]
    NotAccountOwner,
    #[error("malformed contract response: {0}")]
    MalformedResponse(String),
}

/// Facade over one deployed community: the contract address book, the chain
/// client that drives it, and the voucher uploader
///
/// All contract interaction is thin call-data plumbing; the contracts
/// themselves are the asset and live upstream.
pub struct Community {
    client: Arc<dyn ChainClient>,
    address: CommunityAddress,
    uploader: Option<VoucherUploader>,
}

impl Community {
    pub fn new(
        client: Arc<dyn ChainClient>,
        address: CommunityAddress,
        uploader: Option<VoucherUploader>,
    ) -> Self {
        Self {
            client,
            address,
            uploader,
        }
    }

    /// The community's exported address book, as served to clients
    pub fn export_address(&self) -> &CommunityAddress {
        &self.address
    }

    /// Create a smart account owned by `owner` and return its address
    ///
    /// Submits a sponsored `createAccount(owner, 0)` operation through the
    /// account factory, then asks the factory for the counterfactual address.
    pub async fn create_account(&self, owner: Address) -> Result<Address, CommunityError> {
        let call_data = encode_call(
            "createAccount(address,uint256)",
            &[pad_address(owner), [0u8; 32]],
        );

        let mut op = UserOperation::empty(self.address.account_factory);
        op.call_data = call_data;

        let sponsored = self
            .client
            .sponsor_user_operation(op, self.address.gateway)
            .await?;
        self.client
            .send_user_operation(sponsored, self.address.gateway)
            .await?;

        let answer = self
            .client
            .call(
                self.address.account_factory,
                &encode_call("getAddress(address,uint256)", &[pad_address(owner), [0u8; 32]]),
            )
            .await?;
        decode_address(&answer)
    }

    /// The owner of a deployed smart account, read from the contract
    pub async fn account_owner(&self, account: Address) -> Result<Address, CommunityError> {
        let answer = self
            .client
            .call(account, &encode_call("owner()", &[]))
            .await?;
        decode_address(&answer)
    }

    /// Create a profile for `account` on behalf of `caller`
    ///
    /// Only the account's owner may attach a profile to it; anyone else is
    /// turned away before the factory is touched. The profile lands at the
    /// counterfactual address the factory reports.
    pub async fn create_profile(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<Address, CommunityError> {
        let owner = self.account_owner(account).await?;
        if owner != caller {
            return Err(CommunityError::NotAccountOwner);
        }

        let call_data = encode_call(
            "createProfile(address,uint256)",
            &[pad_address(owner), [0u8; 32]],
        );

        let mut op = UserOperation::empty(self.address.profile_factory);
        op.call_data = call_data;

        let sponsored = self
            .client
            .sponsor_user_operation(op, self.address.gateway)
            .await?;
        self.client
            .send_user_operation(sponsored, self.address.gateway)
            .await?;

        let answer = self
            .client
            .call(
                self.address.profile_factory,
                &encode_call(
                    "getProfileAddress(address,uint256)",
                    &[pad_address(owner), [0u8; 32]],
                ),
            )
            .await?;
        decode_address(&answer)
    }

    /// List voucher transfers on the community token, newest last
    ///
    /// Filters the token's `TransferSingle` events by any combination of
    /// operator, sender and recipient; `None` leaves that position open.
    pub async fn list_vouchers(
        &self,
        operator: Option<Address>,
        from: Option<Address>,
        to: Option<Address>,
    ) -> Result<Vec<VoucherTransfer>, CommunityError> {
        let filter = serde_json::json!({
            "fromBlock": "0x0",
            "toBlock": "latest",
            "address": self.address.token.to_hex(),
            "topics": [
                transfer_single_topic(),
                address_topic(operator),
                address_topic(from),
                address_topic(to),
            ],
        });

        let logs = self.client.logs(filter).await?;
        logs.iter().map(decode_transfer).collect()
    }

    /// Current balance of the community paymaster, in wei
    pub async fn paymaster_balance(&self) -> Result<u128, CommunityError> {
        Ok(self.client.balance(self.address.paymaster).await?)
    }

    /// Sponsor and submit a caller-built user operation, returning its hash
    pub async fn submit_op(&self, op: UserOperation) -> Result<String, CommunityError> {
        let sponsored = self
            .client
            .sponsor_user_operation(op, self.address.gateway)
            .await?;
        let hash = self
            .client
            .send_user_operation(sponsored, self.address.gateway)
            .await?;
        Ok(hash)
    }

    /// Forward a client-signed raw transaction, returning its hash
    pub async fn send_raw_transaction(&self, raw: &str) -> Result<String, CommunityError> {
        Ok(self.client.send_raw_transaction(raw).await?)
    }

    /// Mint voucher metadata for `minter` via the upload service
    pub async fn mint_voucher(
        &self,
        minter: Address,
        name: String,
        description: String,
        minter_name: String,
        amount: i64,
    ) -> Result<VoucherMetadata, CommunityError> {
        let uploader = self
            .uploader
            .as_ref()
            .ok_or(CommunityError::UploaderNotConfigured)?;

        tracing::debug!(minter = %minter, name = %name, "uploading voucher metadata");
        let descriptor = VoucherDescriptor {
            name,
            description,
            minter_name,
            amount,
        };
        Ok(uploader.upload(&descriptor).await?)
    }
}

/// ABI-encode a call: 4-byte selector (Keccak-256 of the signature) followed
/// by 32-byte padded arguments, as a "0x" hex string
fn encode_call(signature: &str, args: &[[u8; 32]]) -> String {
    let selector = Keccak256::digest(signature.as_bytes());
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&selector[..4]);
    for arg in args {
        data.extend_from_slice(arg);
    }
    format!("0x{}", hex::encode(data))
}

/// Left-pad an address into a 32-byte ABI word
fn pad_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&*address);
    word
}

/// Topic hash of the ERC-1155 `TransferSingle` event
fn transfer_single_topic() -> String {
    let digest = Keccak256::digest(b"TransferSingle(address,address,address,uint256,uint256)");
    format!("0x{}", hex::encode(digest))
}

/// An indexed-address topic filter: a padded word, or null to leave the
/// position open
fn address_topic(address: Option<Address>) -> serde_json::Value {
    match address {
        Some(address) => {
            serde_json::Value::String(format!("0x{}", hex::encode(pad_address(address))))
        }
        None => serde_json::Value::Null,
    }
}

/// Decode a `TransferSingle` log into a voucher transfer
fn decode_transfer(log: &LogEntry) -> Result<VoucherTransfer, CommunityError> {
    if log.topics.len() != 4 {
        return Err(CommunityError::MalformedResponse(format!(
            "expected 4 topics, got {}",
            log.topics.len()
        )));
    }

    let data = log.data.strip_prefix("0x").unwrap_or(&log.data);
    let words = hex::decode(data)
        .map_err(|_| CommunityError::MalformedResponse(format!("bad log data: {}", log.data)))?;
    if words.len() != 64 {
        return Err(CommunityError::MalformedResponse(format!(
            "expected two data words, got {} bytes",
            words.len()
        )));
    }

    Ok(VoucherTransfer {
        operator: decode_address(&log.topics[1])?,
        from: decode_address(&log.topics[2])?,
        to: decode_address(&log.topics[3])?,
        id: format!("0x{}", hex::encode(&words[..32])),
        value: format!("0x{}", hex::encode(&words[32..])),
        transaction_hash: log.transaction_hash.clone(),
    })
}

/// Decode an address from a 32-byte ABI return word
fn decode_address(raw: &str) -> Result<Address, CommunityError> {
    let trimmed = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(trimmed)
        .map_err(|_| CommunityError::MalformedResponse(format!("bad hex: {raw}")))?;
    if bytes.len() != 32 {
        return Err(CommunityError::MalformedResponse(format!(
            "expected 32-byte word, got {} bytes",
            bytes.len()
        )));
    }
    let mut address = [0u8; 20];
    address.copy_from_slice(&bytes[12..]);
    Ok(Address::from(address))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encode_call_shape() {
        let owner = Address::from_hex("0x39bc81005a2bea2122a2f2fd963db3ac8adbc518").unwrap();
        let encoded = encode_call(
            "createAccount(address,uint256)",
            &[pad_address(owner), [0u8; 32]],
        );

        // 0x + 4-byte selector + two 32-byte words
        assert_eq!(encoded.len(), 2 + 8 + 64 + 64);
        assert!(encoded.starts_with("0x"));
        assert!(encoded.contains("39bc81005a2bea2122a2f2fd963db3ac8adbc518"));
    }

    #[test]
    fn test_decode_address_round_trip() {
        let address = Address::from_hex("0x39bc81005a2bea2122a2f2fd963db3ac8adbc518").unwrap();
        let word = format!("0x{}", hex::encode(pad_address(address)));
        assert_eq!(decode_address(&word).unwrap(), address);
    }

    #[test]
    fn test_decode_address_rejects_short_word() {
        assert!(decode_address("0x1234").is_err());
        assert!(decode_address("garbage").is_err());
    }

    #[test]
    fn test_address_topic_pads_or_leaves_open() {
        let address = Address::from_hex("0x39bc81005a2bea2122a2f2fd963db3ac8adbc518").unwrap();
        let topic = address_topic(Some(address));
        assert_eq!(
            topic.as_str().unwrap(),
            "0x00000000000000000000000039bc81005a2bea2122a2f2fd963db3ac8adbc518"
        );
        assert!(address_topic(None).is_null());
    }

    #[test]
    fn test_decode_transfer() {
        let operator = Address::from_hex("0x39bc81005a2bea2122a2f2fd963db3ac8adbc518").unwrap();
        let mut id = [0u8; 32];
        id[31] = 7;
        let mut value = [0u8; 32];
        value[31] = 5;

        let log = LogEntry {
            address: Address::from([6u8; 20]),
            topics: vec![
                transfer_single_topic(),
                address_topic(Some(operator)).as_str().unwrap().to_string(),
                address_topic(Some(operator)).as_str().unwrap().to_string(),
                address_topic(Some(Address::from([9u8; 20])))
                    .as_str()
                    .unwrap()
                    .to_string(),
            ],
            data: format!("0x{}{}", hex::encode(id), hex::encode(value)),
            transaction_hash: Some("0xdeadbeef".to_string()),
            block_number: None,
        };

        let transfer = decode_transfer(&log).unwrap();
        assert_eq!(transfer.operator, operator);
        assert_eq!(transfer.from, operator);
        assert_eq!(transfer.to, Address::from([9u8; 20]));
        assert!(transfer.id.ends_with("07"));
        assert!(transfer.value.ends_with("05"));
        assert_eq!(transfer.transaction_hash.as_deref(), Some("0xdeadbeef"));
    }

    #[test]
    fn test_decode_transfer_rejects_short_data() {
        let log = LogEntry {
            address: Address::from([6u8; 20]),
            topics: vec![transfer_single_topic()],
            data: "0x00".to_string(),
            transaction_hash: None,
            block_number: None,
        };
        assert!(matches!(
            decode_transfer(&log),
            Err(CommunityError::MalformedResponse(_))
        ));
    }
}
