use std::collections::{HashMap, HashSet};

use sp_blockchain::Block;

use crate::SyncError;

/// Tracks blocks that arrived before their ancestor did.
///
/// When [`sp_blockchain::Blockchain::add`] rejects a block with
/// `UnknownPrevHash`, the caller hands it to [`OrphanPool::record`] instead
/// of dropping it. Once the
/// missing ancestor is itself accepted into the chain, the caller drains the
/// blocks waiting on it with [`OrphanPool::take_children`] and retries
/// `add()` on each — which may itself unblock a further generation of
/// orphans, so callers should loop until a round produces nothing new.
#[derive(Debug, Default)]
pub struct OrphanPool {
    /// Missing ancestor hash → blocks waiting on it, in arrival order.
    waiting: HashMap<String, Vec<Block>>,
    /// Ancestor hashes an ancestor-request has already been issued for, so
    /// a node does not re-request the same block on every duplicate orphan.
    requested: HashSet<String>,
}

impl OrphanPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `block` as waiting on its own `prev_hash`. Returns an error if
    /// `block` is a genesis block (no `prev_hash` to wait on) or is already
    /// tracked.
    pub fn record(&mut self, block: Block) -> Result<(), SyncError> {
        let Some(missing) = block.header.prev_hash.clone() else {
            return Err(SyncError::AlreadyOrphaned(block.hash_hex()));
        };

        let bucket = self.waiting.entry(missing).or_default();
        if bucket.iter().any(|b| b.hash_hex() == block.hash_hex()) {
            return Err(SyncError::AlreadyOrphaned(block.hash_hex()));
        }
        bucket.push(block);
        Ok(())
    }

    /// `true` the first time this ancestor hash is asked about; `false` on
    /// every subsequent call, so a caller can use it as an
    /// ancestor-request-already-in-flight guard.
    pub fn should_request(&mut self, ancestor_hash: &str) -> bool {
        self.requested.insert(ancestor_hash.to_string())
    }

    /// Remove and return every block waiting directly on `ancestor_hash`,
    /// in the order they were recorded. Also clears the request guard for
    /// that hash, since it is no longer missing.
    pub fn take_children(&mut self, ancestor_hash: &str) -> Vec<Block> {
        self.requested.remove(ancestor_hash);
        self.waiting.remove(ancestor_hash).unwrap_or_default()
    }

    /// Number of blocks currently held in the pool, across every missing
    /// ancestor.
    pub fn len(&self) -> usize {
        self.waiting.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use sp_blockchain::Blockchain;

    use super::*;

    #[test]
    fn genesis_block_cannot_be_orphaned() {
        let genesis = Block::genesis().unwrap();
        let mut pool = OrphanPool::new();
        assert!(pool.record(genesis).is_err());
    }

    #[test]
    fn recorded_block_is_released_once_its_ancestor_arrives() {
        let mut chain = Blockchain::new();
        let genesis_hash = chain.tips().keys().next().unwrap().clone();

        let middle = Block::mine(Some(genesis_hash.clone()), vec![]).unwrap();
        let middle_hash = middle.hash_hex();
        let child = Block::mine(Some(middle_hash.clone()), vec![]).unwrap();

        let mut pool = OrphanPool::new();
        pool.record(child).unwrap();
        assert_eq!(pool.len(), 1);

        // The orphan's ancestor is still missing from the chain.
        assert!(pool.take_children(&genesis_hash).is_empty());

        chain.add(middle).unwrap();
        let released = pool.take_children(&middle_hash);
        assert_eq!(released.len(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn duplicate_orphan_is_rejected() {
        let genesis = Block::genesis().unwrap();
        let genesis_hash = genesis.hash_hex();
        let orphan = Block::mine(Some(genesis_hash.clone()), vec![]).unwrap();

        let mut pool = OrphanPool::new();
        pool.record(orphan.clone()).unwrap();
        assert!(pool.record(orphan).is_err());
    }

    #[test]
    fn should_request_is_true_only_once() {
        let mut pool = OrphanPool::new();
        assert!(pool.should_request("abc"));
        assert!(!pool.should_request("abc"));
        pool.take_children("abc");
        assert!(pool.should_request("abc"));
    }
}
