use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::{Block, BlockError, BlockchainError, MEDIAN_WINDOW, TARGET};

/// A multi-tip, hash-indexed blockchain store.
///
/// `blocks` holds every block reachable from genesis that has not yet been
/// pruned; `tips` tracks every block with no known successor, keyed by its
/// hash, alongside its chain length from genesis. Forks are first-class:
/// [`Blockchain::add`] accepts a block onto any known ancestor, and
/// [`Blockchain::resolve`] collapses the tree down to one canonical chain
/// on demand, pruning everything off it.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: HashMap<String, Block>,
    tips: HashMap<String, u64>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Mine a fresh genesis block and start a new store from it.
    pub fn new() -> Self {
        let genesis = Block::genesis().expect("genesis mining cannot fail");
        let hash = genesis.hash_hex();

        let mut blocks = HashMap::new();
        blocks.insert(hash.clone(), genesis);

        let mut tips = HashMap::new();
        tips.insert(hash, 0);

        Self { blocks, tips }
    }

    /// Start a new store from a genesis block mined elsewhere (e.g. by
    /// another peer bootstrapping the same network). `genesis` must be a
    /// genuine, already-valid genesis block: no `prev_hash`, and it must
    /// satisfy the same proof-of-work and self-verification checks
    /// [`Blockchain::add`] would apply to it.
    ///
    /// Every peer in a multi-node deployment must be built from the exact
    /// same genesis block — [`Blockchain::new`] mines a fresh (and thus
    /// different) one on every call, so it is only correct for a
    /// single-node chain or as the one place genesis is minted before
    /// being handed to every other peer via this constructor.
    pub fn with_genesis(genesis: Block) -> Result<Self, BlockchainError> {
        if genesis.header.prev_hash.is_some() {
            return Err(BlockchainError::ChainNotEmpty);
        }
        genesis.validate().map_err(BlockchainError::Block)?;
        genesis.verify().map_err(BlockchainError::Block)?;

        let hash = genesis.hash_hex();
        if hash.as_str() >= TARGET {
            return Err(BlockchainError::InsufficientWork);
        }

        let mut blocks = HashMap::new();
        blocks.insert(hash.clone(), genesis);

        let mut tips = HashMap::new();
        tips.insert(hash, 0);

        Ok(Self { blocks, tips })
    }

    /// Number of blocks currently retained (not pruned).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a retained block by its hash.
    pub fn get(&self, hash: &str) -> Option<&Block> {
        self.blocks.get(hash)
    }

    /// `true` if `hash` names a currently retained block.
    pub fn contains(&self, hash: &str) -> bool {
        self.blocks.contains_key(hash)
    }

    /// Every current tip hash paired with its chain length.
    pub fn tips(&self) -> &HashMap<String, u64> {
        &self.tips
    }

    /// Walk from `hash` back to genesis, returning blocks in that order
    /// (the block at `hash` first, genesis last).
    fn ancestor_chain(&self, hash: &str) -> Vec<&Block> {
        let mut chain = Vec::new();
        let mut cursor = Some(hash.to_string());

        while let Some(h) = cursor {
            let block = self
                .blocks
                .get(&h)
                .expect("ancestor hash must reference a retained block");
            cursor = block.header.prev_hash.clone();
            chain.push(block);
        }

        chain
    }

    /// Chain length of the (already known) block named by `hash`: the
    /// number of `prev_hash` hops from it back to genesis.
    fn length_of(&self, hash: &str) -> u64 {
        let mut length = 0u64;
        let mut cursor = hash.to_string();

        loop {
            let block = &self.blocks[&cursor];
            match &block.header.prev_hash {
                None => break,
                Some(prev) => {
                    length += 1;
                    cursor = prev.clone();
                }
            }
        }

        length
    }

    /// Sum of `nonce` over every block from genesis to `hash` inclusive,
    /// the proof-of-work tie-break measure used by [`Blockchain::resolve`].
    fn total_work(&self, hash: &str) -> u128 {
        self.ancestor_chain(hash)
            .iter()
            .map(|b| b.header.nonce as u128)
            .sum()
    }

    /// Validate and insert `block`. On success the block becomes a tip;
    /// if its `prev_hash` was previously a tip, that tip is replaced.
    ///
    /// Validation order: structural self-check, semantic self-check,
    /// proof-of-work target, known attach point, no transaction already
    /// spent by an ancestor, timestamp strictly after the ancestor median.
    /// No state is mutated unless every check passes.
    pub fn add(&mut self, block: Block) -> Result<(), BlockchainError> {
        block.validate().map_err(BlockchainError::Block)?;
        block.verify().map_err(BlockchainError::Block)?;

        let header_hash = block.hash_hex();
        if header_hash.as_str() >= TARGET {
            return Err(BlockchainError::InsufficientWork);
        }

        match &block.header.prev_hash {
            None => {
                if !self.blocks.is_empty() {
                    return Err(BlockchainError::ChainNotEmpty);
                }
            }
            Some(prev) => {
                if !self.blocks.contains_key(prev) {
                    return Err(BlockchainError::UnknownPrevHash(prev.clone()));
                }

                let mut already_spent = HashSet::new();
                for ancestor in self.ancestor_chain(prev) {
                    for tx in &ancestor.transactions {
                        let hash = tx
                            .hash_hex()
                            .map_err(|e| BlockchainError::Block(BlockError::BadTransaction(e)))?;
                        already_spent.insert(hash);
                    }
                }
                for tx in &block.transactions {
                    let hash = tx
                        .hash_hex()
                        .map_err(|e| BlockchainError::Block(BlockError::BadTransaction(e)))?;
                    if already_spent.contains(&hash) {
                        return Err(BlockchainError::TransactionAlreadyInChain(hash));
                    }
                }

                let ancestor_timestamps: Vec<f64> = self
                    .ancestor_chain(prev)
                    .into_iter()
                    .take(MEDIAN_WINDOW)
                    .map(|b| b.header.timestamp)
                    .collect();
                let median = median_of(ancestor_timestamps);
                if !(block.header.timestamp > median) {
                    return Err(BlockchainError::TimestampNotAfterMedian);
                }
            }
        }

        let length = match &block.header.prev_hash {
            None => 0,
            Some(prev) => {
                let length = match self.tips.remove(prev) {
                    Some(l) => l,
                    None => self.length_of(prev),
                };
                length + 1
            }
        };

        debug!(hash = %header_hash, length, "block accepted");
        self.tips.insert(header_hash.clone(), length);
        self.blocks.insert(header_hash, block);

        Ok(())
    }

    /// Collapse every known fork down to a single canonical tip: longest
    /// chain wins; ties break on total proof-of-work (nonce sum from
    /// genesis); further ties break on the lexicographically greatest tip
    /// hash. Prunes every block not an ancestor of the chosen tip.
    ///
    /// Never fails: the store always holds at least genesis.
    pub fn resolve(&mut self) -> &Block {
        let chosen = if self.tips.len() == 1 {
            self.tips.keys().next().unwrap().clone()
        } else {
            let max_length = *self.tips.values().max().unwrap();
            let mut candidates: Vec<String> = self
                .tips
                .iter()
                .filter(|(_, &len)| len == max_length)
                .map(|(h, _)| h.clone())
                .collect();

            if candidates.len() > 1 {
                let max_work = candidates
                    .iter()
                    .map(|h| self.total_work(h))
                    .max()
                    .unwrap();
                candidates.retain(|h| self.total_work(h) == max_work);
            }

            if candidates.len() > 1 {
                warn!(
                    count = candidates.len(),
                    "fork tie on length and proof-of-work, breaking on lexicographically greatest hash"
                );
            }

            candidates.into_iter().max().unwrap()
        };

        self.prune_to(&chosen);
        info!(tip = %chosen, length = self.tips[&chosen], "resolved canonical chain");
        &self.blocks[&chosen]
    }

    fn prune_to(&mut self, tip_hash: &str) {
        let length = self.length_of(tip_hash);
        let keep: HashSet<String> = self
            .ancestor_chain(tip_hash)
            .into_iter()
            .map(|b| b.hash_hex())
            .collect();

        self.blocks.retain(|hash, _| keep.contains(hash));
        self.tips.clear();
        self.tips.insert(tip_hash.to_string(), length);
    }
}

fn median_of(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.partial_cmp(b).expect("timestamps are always finite"));
    let mid = values.len() / 2;

    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use sp_crypto::Keypair;
    use sp_transaction::Transaction;

    use super::*;

    fn signed_tx(nonce: u64) -> Transaction {
        let sender = Keypair::generate();
        let sender_pk = sender.public_key_bytes();
        let receiver_pk = Keypair::generate().public_key_bytes();
        Transaction::create(&sender_pk, &receiver_pk, 1, &sender, nonce, None).unwrap()
    }

    #[test]
    fn new_chain_has_one_tip_at_genesis() {
        let chain = Blockchain::new();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.tips().len(), 1);
    }

    #[test]
    fn add_extends_the_tip() {
        let mut chain = Blockchain::new();
        let genesis_hash = chain.tips().keys().next().unwrap().clone();

        let block = Block::mine(Some(genesis_hash.clone()), vec![signed_tx(0)]).unwrap();
        let block_hash = block.hash_hex();
        chain.add(block).unwrap();

        assert_eq!(chain.len(), 2);
        assert!(!chain.tips().contains_key(&genesis_hash));
        assert_eq!(chain.tips().get(&block_hash), Some(&1));
    }

    #[test]
    fn unknown_prev_hash_is_rejected() {
        let mut chain = Blockchain::new();
        let orphan = Block::mine(Some("f".repeat(64)), vec![]).unwrap();
        assert!(matches!(
            chain.add(orphan),
            Err(BlockchainError::UnknownPrevHash(_))
        ));
    }

    #[test]
    fn duplicate_second_genesis_is_rejected() {
        let mut chain = Blockchain::new();
        let second_genesis = Block::genesis().unwrap();
        assert!(matches!(
            chain.add(second_genesis),
            Err(BlockchainError::ChainNotEmpty)
        ));
    }

    #[test]
    fn spending_the_same_transaction_twice_is_rejected() {
        let mut chain = Blockchain::new();
        let genesis_hash = chain.tips().keys().next().unwrap().clone();
        let tx = signed_tx(0);

        let first = Block::mine(Some(genesis_hash.clone()), vec![tx.clone()]).unwrap();
        let first_hash = first.hash_hex();
        chain.add(first).unwrap();

        let second = Block::mine(Some(first_hash), vec![tx]).unwrap();
        assert!(matches!(
            chain.add(second),
            Err(BlockchainError::TransactionAlreadyInChain(_))
        ));
    }

    #[test]
    fn resolve_prefers_the_longer_fork_and_prunes_the_other() {
        let mut chain = Blockchain::new();
        let genesis_hash = chain.tips().keys().next().unwrap().clone();

        let short = Block::mine(Some(genesis_hash.clone()), vec![signed_tx(0)]).unwrap();
        let short_hash = short.hash_hex();
        chain.add(short).unwrap();

        let long_a = Block::mine(Some(genesis_hash.clone()), vec![signed_tx(1)]).unwrap();
        let long_a_hash = long_a.hash_hex();
        chain.add(long_a).unwrap();

        let long_b = Block::mine(Some(long_a_hash.clone()), vec![signed_tx(2)]).unwrap();
        let long_b_hash = long_b.hash_hex();
        chain.add(long_b).unwrap();

        assert_eq!(chain.tips().len(), 2);

        let resolved_hash = chain.resolve().hash_hex();
        assert_eq!(resolved_hash, long_b_hash);
        assert_eq!(chain.tips().len(), 1);
        assert!(chain.contains(&long_a_hash));
        assert!(!chain.contains(&short_hash));
    }

    #[test]
    fn resolve_breaks_an_equal_length_tie_by_total_proof_of_work() {
        let mut chain = Blockchain::new();
        let genesis_hash = chain.tips().keys().next().unwrap().clone();

        let a = Block::mine(Some(genesis_hash.clone()), vec![signed_tx(10)]).unwrap();
        let a_hash = a.hash_hex();
        let a_nonce = a.header.nonce;
        chain.add(a).unwrap();

        let b = Block::mine(Some(genesis_hash.clone()), vec![signed_tx(20)]).unwrap();
        let b_hash = b.hash_hex();
        let b_nonce = b.header.nonce;
        chain.add(b).unwrap();

        // Both sit at length 1 off the same parent: a genuine tie on length.
        assert_eq!(chain.tips().len(), 2);
        assert_eq!(chain.tips()[&a_hash], chain.tips()[&b_hash]);

        let genesis_nonce = chain.get(&genesis_hash).unwrap().header.nonce;
        let total_a = genesis_nonce as u128 + a_nonce as u128;
        let total_b = genesis_nonce as u128 + b_nonce as u128;

        let resolved_hash = chain.resolve().hash_hex();

        if total_a > total_b {
            assert_eq!(resolved_hash, a_hash);
        } else if total_b > total_a {
            assert_eq!(resolved_hash, b_hash);
        } else {
            // Astronomically unlikely nonce tie: falls through to the
            // lexicographically-greatest-hash rule.
            assert_eq!(resolved_hash, a_hash.max(b_hash));
        }
    }
}
