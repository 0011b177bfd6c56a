use std::collections::HashSet;

use sp_transaction::Transaction;

/// The set of signed transactions a miner knows about but has not yet
/// mined into a block. Deliberately a `HashSet`, so re-announcing the
/// same transaction is a no-op rather than a duplicate pool entry.
///
/// Not internally locked — callers share it behind
/// `Arc<parking_lot::Mutex<TransactionPool>>` (see `MinerCore`), taking
/// the lock once per insert or per mining tick rather than per method
/// call.
#[derive(Debug, Default)]
pub struct TransactionPool {
    transactions: HashSet<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tx`, returning `true` if it was not already present.
    pub fn insert(&mut self, tx: Transaction) -> bool {
        self.transactions.insert(tx)
    }

    /// A clone of every pooled transaction, for a miner to build a
    /// candidate block from.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.iter().cloned().collect()
    }

    /// Drop every transaction in `mined` from the pool (they are now
    /// committed to a block and no longer pending).
    pub fn remove_all(&mut self, mined: &[Transaction]) {
        for tx in mined {
            self.transactions.remove(tx);
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use sp_crypto::Keypair;

    use super::*;

    fn tx(nonce: u64) -> Transaction {
        let sender = Keypair::generate();
        let sender_pk = sender.public_key_bytes();
        let receiver_pk = Keypair::generate().public_key_bytes();
        Transaction::create(&sender_pk, &receiver_pk, 1, &sender, nonce, None).unwrap()
    }

    #[test]
    fn reinserting_the_same_transaction_is_a_no_op() {
        let t = tx(0);
        let mut pool = TransactionPool::new();
        assert!(pool.insert(t.clone()));
        assert!(!pool.insert(t));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn remove_all_drops_only_the_mined_transactions() {
        let a = tx(0);
        let b = tx(1);
        let mut pool = TransactionPool::new();
        pool.insert(a.clone());
        pool.insert(b.clone());

        pool.remove_all(&[a]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.snapshot(), vec![b]);
    }
}
