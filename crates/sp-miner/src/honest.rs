use parking_lot::RwLock;
use sp_blockchain::{Block, Blockchain};
use sp_transaction::Transaction;

use crate::hooks::{BlockOrigin, BroadcastDecision, MinerHooks};

/// The base miner: always mines on the resolved canonical tip, never
/// filters its pool, always broadcasts, and never claims a transaction
/// specially. `AdversaryMiner` overrides every one of these hooks; this
/// type is what it overrides *from*.
#[derive(Debug, Default)]
pub struct HonestMiner;

impl HonestMiner {
    pub fn new() -> Self {
        Self
    }
}

impl MinerHooks for HonestMiner {
    fn tx_pool_filter(&self, pool_snapshot: Vec<Transaction>) -> Vec<Transaction> {
        pool_snapshot
    }

    fn choose_prev_hash(&self, blockchain: &RwLock<Blockchain>) -> String {
        blockchain.write().resolve().hash_hex()
    }

    fn broadcast_policy(&self, _block: &Block) -> BroadcastDecision {
        BroadcastDecision::Broadcast
    }

    fn on_block_accepted(&self, _block: &Block, _origin: BlockOrigin) {}

    fn on_inbound_tx(&self, _tx: &Transaction) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use sp_crypto::Keypair;

    use super::*;
    use crate::{pool::TransactionPool, MinerCore};

    fn signed_tx(nonce: u64) -> Transaction {
        let sender = Keypair::generate();
        let sender_pk = sender.public_key_bytes();
        let receiver_pk = Keypair::generate().public_key_bytes();
        Transaction::create(&sender_pk, &receiver_pk, 1, &sender, nonce, None).unwrap()
    }

    #[test]
    fn tick_mines_pooled_transactions_onto_the_resolved_tip() {
        let blockchain = Arc::new(RwLock::new(Blockchain::new()));
        let pool = Arc::new(Mutex::new(TransactionPool::new()));
        pool.lock().insert(signed_tx(0));

        let announced = Arc::new(Mutex::new(Vec::new()));
        let announced_clone = announced.clone();

        let core = MinerCore::new(blockchain.clone(), pool.clone(), HonestMiner::new(), move |b| {
            announced_clone.lock().push(b);
        });

        let block = core.tick().unwrap();
        assert_eq!(block.transactions.len(), 1);
        assert!(pool.lock().is_empty());
        assert_eq!(announced.lock().len(), 1);
        assert_eq!(blockchain.read().len(), 2);
    }

    #[test]
    fn inbound_transaction_with_bad_signature_is_dropped() {
        let blockchain = Arc::new(RwLock::new(Blockchain::new()));
        let pool = Arc::new(Mutex::new(TransactionPool::new()));
        let core = MinerCore::new(blockchain, pool.clone(), HonestMiner::new(), |_| {});

        let mut tx = signed_tx(0);
        tx.amount = 999;
        core.handle_inbound_tx(tx);
        assert!(pool.lock().is_empty());
    }

    #[test]
    fn inbound_block_with_unknown_ancestor_is_orphaned_not_dropped() {
        let blockchain = Arc::new(RwLock::new(Blockchain::new()));
        let pool = Arc::new(Mutex::new(TransactionPool::new()));
        let core = MinerCore::new(blockchain.clone(), pool, HonestMiner::new(), |_| {});

        let orphan = Block::mine(Some("f".repeat(64)), vec![]).unwrap();
        core.handle_inbound_block(orphan);
        // Rejected, but not applied; the chain is unchanged.
        assert_eq!(blockchain.read().len(), 1);
    }
}
