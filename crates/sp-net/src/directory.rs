use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::DirectoryError;

/// A peer's wire-level identity. This is a role *tag*, not a Rust type:
/// peer discovery is a registry keyed by role, never a type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The honest miner producing the public chain.
    HonestMiner,
    /// The miner running the double-spend attack.
    AdversaryMiner,
    /// Accepts the adversary's payment against a Merkle proof, no full chain.
    DoubleSpendSpvClient,
    /// Sells a good in exchange for the payment `DoubleSpendSpvClient` verifies.
    Vendor,
}

/// What the directory knows about one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    /// Hex-encoded compressed public key.
    pub pubkey: String,
    /// Demo transport address (an in-process channel id, a socket address
    /// in a real deployment — the core never interprets this string).
    pub address: String,
    pub name: String,
}

/// Role-tagged peer lookup, the only interface the core has onto peer
/// identity. Backed by a `RwLock`, like every other shared collection
/// in this workspace.
#[derive(Debug, Default)]
pub struct PeerDirectory {
    by_role: RwLock<HashMap<Role, PeerRecord>>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the peer playing `role`.
    pub fn register(&self, role: Role, record: PeerRecord) {
        self.by_role.write().insert(role, record);
    }

    pub fn find_by_role(&self, role: Role) -> Result<PeerRecord, DirectoryError> {
        self.by_role
            .read()
            .get(&role)
            .cloned()
            .ok_or(DirectoryError::UnknownRole(role))
    }

    pub fn find_by_pubkey(&self, pubkey: &str) -> Result<PeerRecord, DirectoryError> {
        self.by_role
            .read()
            .values()
            .find(|r| r.pubkey == pubkey)
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownPubkey(pubkey.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> PeerRecord {
        PeerRecord {
            pubkey: format!("pk-{name}"),
            address: format!("chan-{name}"),
            name: name.to_string(),
        }
    }

    #[test]
    fn register_then_find_by_role() {
        let dir = PeerDirectory::new();
        dir.register(Role::Vendor, record("vendor"));

        let found = dir.find_by_role(Role::Vendor).unwrap();
        assert_eq!(found.name, "vendor");
    }

    #[test]
    fn unregistered_role_is_an_error() {
        let dir = PeerDirectory::new();
        assert!(matches!(
            dir.find_by_role(Role::Vendor),
            Err(DirectoryError::UnknownRole(Role::Vendor))
        ));
    }

    #[test]
    fn find_by_pubkey_scans_every_role() {
        let dir = PeerDirectory::new();
        dir.register(Role::Vendor, record("vendor"));
        dir.register(Role::DoubleSpendSpvClient, record("spv"));

        let found = dir.find_by_pubkey("pk-spv").unwrap();
        assert_eq!(found.name, "spv");
    }

    #[test]
    fn unknown_pubkey_is_an_error() {
        let dir = PeerDirectory::new();
        assert!(dir.find_by_pubkey("nope").is_err());
    }

    #[test]
    fn registering_twice_replaces_the_record() {
        let dir = PeerDirectory::new();
        dir.register(Role::Vendor, record("first"));
        dir.register(Role::Vendor, record("second"));
        assert_eq!(dir.find_by_role(Role::Vendor).unwrap().name, "second");
    }
}
