use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use sp_blockchain::{Block, Blockchain, BlockchainError};
use sp_sync::OrphanPool;
use sp_transaction::Transaction;
use tracing::{debug, warn};

use crate::{
    hooks::{BlockOrigin, BroadcastDecision, MinerHooks},
    pool::TransactionPool,
    MinerError,
};

/// Drives one miner's tick loop and inbound-message handling against a
/// shared chain and pool, deferring every policy decision to `H`
/// (`HonestMiner` or `AdversaryMiner`).
///
/// `announce` is the only way this core talks to the outside world: a
/// callback invoked with each block this miner decides to broadcast. The
/// transport that turns that into wire frames for other peers — sockets,
/// or `sp-node`'s in-process channel — is deliberately outside this
/// crate.
pub struct MinerCore<H: MinerHooks> {
    pub blockchain: Arc<RwLock<Blockchain>>,
    pub pool: Arc<Mutex<TransactionPool>>,
    orphans: Mutex<OrphanPool>,
    pub hooks: H,
    announce: Box<dyn Fn(Block) + Send + Sync>,
}

impl<H: MinerHooks> MinerCore<H> {
    pub fn new(
        blockchain: Arc<RwLock<Blockchain>>,
        pool: Arc<Mutex<TransactionPool>>,
        hooks: H,
        announce: impl Fn(Block) + Send + Sync + 'static,
    ) -> Self {
        Self {
            blockchain,
            pool,
            orphans: Mutex::new(OrphanPool::new()),
            hooks,
            announce: Box::new(announce),
        }
    }

    /// One mining round: choose a previous-hash, snapshot and filter the
    /// pool, mine, add to the local chain, then broadcast or withhold per
    /// `hooks.broadcast_policy`.
    pub fn tick(&self) -> Result<Block, MinerError> {
        let prev_hash = self.hooks.choose_prev_hash(&self.blockchain);

        let txs = {
            let snapshot = self.pool.lock().snapshot();
            self.hooks.tx_pool_filter(snapshot)
        };

        let block = Block::mine(Some(prev_hash), txs)?;

        self.blockchain.write().add(block.clone())?;
        self.pool.lock().remove_all(&block.transactions);
        debug!(hash = %block.hash_hex(), "mined block");

        match self.hooks.broadcast_policy(&block) {
            BroadcastDecision::Broadcast => (self.announce)(block.clone()),
            BroadcastDecision::Withhold => {}
            BroadcastDecision::Release(blocks) => {
                for b in blocks {
                    (self.announce)(b);
                }
            }
        }

        self.hooks.on_block_accepted(&block, BlockOrigin::SelfMined);
        Ok(block)
    }

    /// Handle a transaction received from the wire: verify its signature,
    /// let hooks decide whether they've claimed it, otherwise add it to
    /// the shared pool.
    pub fn handle_inbound_tx(&self, tx: Transaction) {
        if let Err(e) = tx.verify() {
            warn!(error = %e, "dropping transaction with invalid signature");
            return;
        }

        if self.hooks.on_inbound_tx(&tx) {
            return;
        }

        self.pool.lock().insert(tx);
    }

    /// Handle a block received from the wire: validate/add it, and if its
    /// ancestor is unknown, hand it to the orphan pool instead of
    /// discarding it.
    pub fn handle_inbound_block(&self, block: Block) {
        match self.try_add(block.clone()) {
            Ok(()) => {
                self.hooks.on_block_accepted(&block, BlockOrigin::Received);
                self.release_orphans(block.hash_hex());
            }
            Err(BlockchainError::UnknownPrevHash(missing)) => {
                let mut orphans = self.orphans.lock();
                if orphans.record(block).is_ok() && orphans.should_request(&missing) {
                    warn!(ancestor = %missing, "missing ancestor, awaiting its arrival");
                }
            }
            Err(e) => warn!(error = %e, "rejected inbound block"),
        }
    }

    fn try_add(&self, block: Block) -> Result<(), BlockchainError> {
        self.blockchain.write().add(block)
    }

    /// After `newly_accepted` lands in the chain, recursively release and
    /// retry any blocks that were waiting on it (and in turn on them).
    fn release_orphans(&self, newly_accepted: String) {
        let mut queue = vec![newly_accepted];
        while let Some(hash) = queue.pop() {
            let children = self.orphans.lock().take_children(&hash);
            for child in children {
                let child_hash = child.hash_hex();
                match self.try_add(child.clone()) {
                    Ok(()) => {
                        self.hooks.on_block_accepted(&child, BlockOrigin::Received);
                        queue.push(child_hash);
                    }
                    Err(e) => warn!(error = %e, "orphaned block still invalid once its ancestor arrived"),
                }
            }
        }
    }
}
