use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;

use common::crypto::Address;

/// In-memory registry of push notification tokens keyed by account address
///
/// Read-mostly shared state; the lock is held only for the duration of the
/// map operation, never across an await point.
#[derive(Debug, Default)]
pub struct PushRegistry {
    inner: RwLock<HashMap<Address, BTreeSet<String>>>,
}

impl PushRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a push token with an address; idempotent
    pub fn associate(&self, address: Address, token: String) {
        self.inner.write().entry(address).or_default().insert(token);
    }

    /// Remove a push token from an address; removing an unknown token is a
    /// no-op
    pub fn dissociate(&self, address: Address, token: &str) {
        let mut inner = self.inner.write();
        if let Some(tokens) = inner.get_mut(&address) {
            tokens.remove(token);
            if tokens.is_empty() {
                inner.remove(&address);
            }
        }
    }

    /// All tokens registered for an address
    pub fn list(&self, address: Address) -> Vec<String> {
        self.inner
            .read()
            .get(&address)
            .map(|tokens| tokens.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn address(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from(bytes)
    }

    #[test]
    fn test_associate_and_list() {
        let registry = PushRegistry::new();
        registry.associate(address(1), "token-a".to_string());
        registry.associate(address(1), "token-b".to_string());
        registry.associate(address(2), "token-c".to_string());

        assert_eq!(registry.list(address(1)), vec!["token-a", "token-b"]);
        assert_eq!(registry.list(address(2)), vec!["token-c"]);
        assert!(registry.list(address(3)).is_empty());
    }

    #[test]
    fn test_associate_is_idempotent() {
        let registry = PushRegistry::new();
        registry.associate(address(1), "token".to_string());
        registry.associate(address(1), "token".to_string());
        assert_eq!(registry.list(address(1)).len(), 1);
    }

    #[test]
    fn test_dissociate() {
        let registry = PushRegistry::new();
        registry.associate(address(1), "token".to_string());
        registry.dissociate(address(1), "token");
        assert!(registry.list(address(1)).is_empty());

        // unknown token and unknown address are no-ops
        registry.dissociate(address(1), "missing");
        registry.dissociate(address(9), "missing");
    }
}
