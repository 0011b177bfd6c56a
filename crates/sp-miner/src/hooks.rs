use sp_blockchain::Block;
use sp_transaction::Transaction;

/// What a miner should do with a block it just mined.
#[derive(Debug)]
pub enum BroadcastDecision {
    /// Announce it immediately.
    Broadcast,
    /// Keep it private for now.
    Withhold,
    /// Announce every block in this list, in order, and resume normal
    /// (`Broadcast`) behavior afterward. Used by the adversary's FIRE → INIT
    /// transition to release its withheld queue as one event.
    Release(Vec<Block>),
}

/// Where a block accepted into the local chain came from, so hooks can
/// tell "I just mined this" from "I heard about this on the wire" without
/// threading the distinction through every call site by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOrigin {
    SelfMined,
    Received,
}

/// The capability interface [`crate::MinerCore`] drives every tick and
/// inbound-message handler through. `HonestMiner` and `AdversaryMiner`
/// each implement this once, in place of subclassing a base miner.
///
/// Implementations own whatever interior-mutable state they need (locks,
/// not `&mut self` methods) since `MinerCore` only ever holds hooks behind
/// a shared reference.
pub trait MinerHooks: Send + Sync {
    /// Remove from `pool_snapshot` any transaction this miner must never
    /// include in a block it produces (the adversary's exclusion set; the
    /// identity filter for an honest miner).
    fn tx_pool_filter(&self, pool_snapshot: Vec<Transaction>) -> Vec<Transaction>;

    /// Pick the hash to mine the next block on top of. May block (a
    /// bounded poll) until the chosen hash is actually present in
    /// `blockchain`.
    fn choose_prev_hash(&self, blockchain: &parking_lot::RwLock<sp_blockchain::Blockchain>) -> String;

    /// Decide whether, and how, to announce a freshly-mined block.
    fn broadcast_policy(&self, block: &Block) -> BroadcastDecision;

    /// Called once for every block that becomes part of the local chain,
    /// whether mined locally or received from the wire. Drives mode
    /// transitions and the public-chain counter.
    fn on_block_accepted(&self, block: &Block, origin: BlockOrigin);

    /// Called for every inbound transaction before it would be added to
    /// the shared pool. Returning `true` means this hook has fully
    /// handled the transaction (e.g. recorded it into an exclusion set)
    /// and it must not also land in the pool.
    fn on_inbound_tx(&self, tx: &Transaction) -> bool;
}
