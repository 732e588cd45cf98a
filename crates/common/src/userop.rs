use serde::{Deserialize, Serialize};

use crate::crypto::Address;

/// An ERC-4337 style user operation, in the camelCase JSON shape the
/// bundler and paymaster RPCs expect
///
/// All quantity fields are "0x"-prefixed hex strings on the wire; this crate
/// treats them as opaque and leaves interpretation to the chain client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: String,
    pub init_code: String,
    pub call_data: String,
    pub call_gas_limit: String,
    pub verification_gas_limit: String,
    pub pre_verification_gas: String,
    pub max_fee_per_gas: String,
    pub max_priority_fee_per_gas: String,
    pub paymaster_and_data: String,
    pub signature: String,
}

impl UserOperation {
    /// A zeroed operation addressed from `sender`; callers fill in call data
    /// and let the paymaster RPC populate gas fields
    pub fn empty(sender: Address) -> Self {
        Self {
            sender,
            nonce: "0x0".to_string(),
            init_code: "0x".to_string(),
            call_data: "0x".to_string(),
            call_gas_limit: "0x0".to_string(),
            verification_gas_limit: "0x0".to_string(),
            pre_verification_gas: "0x0".to_string(),
            max_fee_per_gas: "0x0".to_string(),
            max_priority_fee_per_gas: "0x0".to_string(),
            paymaster_and_data: "0x".to_string(),
            signature: "0x".to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_camel_case_wire_shape() {
        let sender = Address::from_hex("0x39bc81005a2bea2122a2f2fd963db3ac8adbc518").unwrap();
        let op = UserOperation::empty(sender);

        let json = serde_json::to_value(&op).unwrap();
        assert!(json.get("callData").is_some());
        assert!(json.get("maxFeePerGas").is_some());
        assert!(json.get("paymasterAndData").is_some());
        assert!(json.get("call_data").is_none());
    }
}
