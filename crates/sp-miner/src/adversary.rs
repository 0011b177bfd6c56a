use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use sp_blockchain::{Block, Blockchain};
use sp_transaction::Transaction;
use tracing::info;

use crate::hooks::{BlockOrigin, BroadcastDecision, MinerHooks};

/// One pollable bounded wait between ancestor-presence checks in
/// [`AdversaryMiner::choose_prev_hash`]. A known piece of ugliness, kept
/// deliberately rather than replaced with a condition variable.
const ANCESTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The three-mode attack state, held as one record guarded by locks,
/// never module-level mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Init,
    Fork,
    Fire,
}

#[derive(Debug, Default)]
struct AdversaryState {
    mode: RwLock<Mode>,
    fork_point: RwLock<Option<Block>>,
    withheld: Mutex<VecDeque<Block>>,
    public_count: Mutex<u64>,
    excluded: Mutex<HashSet<String>>,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Init
    }
}

/// The attacker's miner: an honest miner until it sees its own payment to
/// the colluding `bad_spv` peer confirmed, at which point it starts
/// withholding its own fork, and releases that fork the instant it can
/// overtake the public chain.
pub struct AdversaryMiner {
    /// This miner's own hex-encoded public key.
    pub pubkey_hex: String,
    /// The colluding lightweight client's hex-encoded public key.
    pub bad_spv_pubkey_hex: String,
    /// The victim merchant's hex-encoded public key.
    pub vendor_pubkey_hex: String,
    state: AdversaryState,
}

impl AdversaryMiner {
    pub fn new(pubkey_hex: String, bad_spv_pubkey_hex: String, vendor_pubkey_hex: String) -> Self {
        Self {
            pubkey_hex,
            bad_spv_pubkey_hex,
            vendor_pubkey_hex,
            state: AdversaryState::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        *self.state.mode.read()
    }

    pub fn public_count(&self) -> u64 {
        *self.state.public_count.lock()
    }

    pub fn withheld_len(&self) -> usize {
        self.state.withheld.lock().len()
    }

    fn is_payment_to_bad_spv(&self, tx: &Transaction) -> bool {
        tx.sender == self.pubkey_hex && tx.receiver == self.bad_spv_pubkey_hex
    }

    fn is_return_from_bad_spv(&self, tx: &Transaction) -> bool {
        tx.sender == self.bad_spv_pubkey_hex && tx.receiver == self.pubkey_hex
    }

    fn is_bad_spv_paying_vendor(&self, tx: &Transaction) -> bool {
        tx.sender == self.bad_spv_pubkey_hex && tx.receiver == self.vendor_pubkey_hex
    }
}

impl MinerHooks for AdversaryMiner {
    fn tx_pool_filter(&self, pool_snapshot: Vec<Transaction>) -> Vec<Transaction> {
        let excluded = self.state.excluded.lock();
        pool_snapshot
            .into_iter()
            .filter(|tx| match tx.hash_hex() {
                Ok(hash) => !excluded.contains(&hash),
                Err(_) => false,
            })
            .collect()
    }

    fn choose_prev_hash(&self, blockchain: &RwLock<Blockchain>) -> String {
        if self.mode() == Mode::Init {
            return blockchain.write().resolve().hash_hex();
        }

        let target = {
            let withheld = self.state.withheld.lock();
            match withheld.back() {
                Some(block) => block.hash_hex(),
                None => self
                    .state
                    .fork_point
                    .read()
                    .as_ref()
                    .expect("fork_point is set before entering Fork mode")
                    .hash_hex(),
            }
        };

        while !blockchain.read().contains(&target) {
            std::thread::sleep(ANCESTOR_POLL_INTERVAL);
        }

        target
    }

    fn broadcast_policy(&self, block: &Block) -> BroadcastDecision {
        match self.mode() {
            Mode::Init => BroadcastDecision::Broadcast,
            Mode::Fork => {
                self.state.withheld.lock().push_back(block.clone());
                BroadcastDecision::Withhold
            }
            Mode::Fire => {
                let mut withheld = self.state.withheld.lock();
                withheld.push_back(block.clone());
                let public = *self.state.public_count.lock();

                if withheld.len() as u64 > public {
                    let released: Vec<Block> = withheld.drain(..).collect();
                    drop(withheld);
                    *self.state.public_count.lock() = 0;
                    *self.state.mode.write() = Mode::Init;
                    info!(count = released.len(), "releasing withheld fork, returning to INIT");
                    BroadcastDecision::Release(released)
                } else {
                    BroadcastDecision::Withhold
                }
            }
        }
    }

    fn on_block_accepted(&self, block: &Block, origin: BlockOrigin) {
        let mode = self.mode();

        if mode == Mode::Init {
            if block.transactions.iter().any(|tx| self.is_payment_to_bad_spv(tx)) {
                *self.state.fork_point.write() = Some(block.clone());
                *self.state.public_count.lock() = 0;
                *self.state.mode.write() = Mode::Fork;
                info!(fork_point = %block.hash_hex(), "entering FORK mode");
            }
            return;
        }

        if matches!(mode, Mode::Fork | Mode::Fire) && origin == BlockOrigin::Received {
            *self.state.public_count.lock() += 1;
        }
    }

    fn on_inbound_tx(&self, tx: &Transaction) -> bool {
        if self.is_bad_spv_paying_vendor(tx) {
            if let Ok(hash) = tx.hash_hex() {
                self.state.excluded.lock().insert(hash);
            }
            return true;
        }

        if self.is_return_from_bad_spv(tx) && self.mode() == Mode::Fork {
            *self.state.mode.write() = Mode::Fire;
            info!("entering FIRE mode");
        }

        false
    }
}
