use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sp_merkle::MerkleTree;
use sp_transaction::Transaction;

use crate::{BlockError, TARGET};

/// The proof-of-work-committed header of a [`Block`].
///
/// Hashed through [`sp_crypto::canonical_bytes`] before double-SHA256, so
/// the bytes actually hashed list these fields in lexicographic key order
/// (`nonce`, `prev_hash`, `root`, `timestamp`), not declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Hex-encoded hash of the previous block's header. `None` only for
    /// genesis.
    pub prev_hash: Option<String>,
    /// Hex-encoded Merkle root of `transactions`.
    pub root: String,
    /// Seconds since the Unix epoch, fixed when mining starts.
    pub timestamp: f64,
    /// Proof-of-work nonce.
    pub nonce: u64,
}

/// A mined block: a header plus the transactions it commits to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

fn now_as_f64() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs_f64()
}

fn header_hash_hex(header: &BlockHeader) -> Result<String, BlockError> {
    let bytes = sp_crypto::canonical_bytes(header)?;
    Ok(sp_crypto::double_sha256_hex(&bytes))
}

impl Block {
    /// Mine a new block on top of `prev_hash` (`None` for genesis)
    /// containing `transactions`. Searches `nonce` from zero until the
    /// header's double-SHA256 hex digest is strictly less than
    /// [`crate::TARGET`]. The timestamp is fixed once, at loop entry, and
    /// never refreshed mid-search.
    pub fn mine(prev_hash: Option<String>, transactions: Vec<Transaction>) -> Result<Self, BlockError> {
        let tree = MerkleTree::new(&transactions)?;
        let root = tree.root_hash_hex();

        let mut header = BlockHeader {
            prev_hash,
            root,
            timestamp: now_as_f64(),
            nonce: 0,
        };

        loop {
            let candidate = header_hash_hex(&header)?;
            if candidate.as_str() < TARGET {
                break;
            }
            header.nonce += 1;
            if header.nonce % 4096 == 0 {
                std::thread::yield_now();
            }
        }

        Ok(Self { header, transactions })
    }

    /// Mine the genesis block: no transactions, no previous hash. Uses the
    /// same proof-of-work search as every other block, so there is exactly
    /// one code path for "is this header hash valid PoW".
    pub fn genesis() -> Result<Self, BlockError> {
        Self::mine(None, Vec::new())
    }

    /// Hex-encoded double-SHA256 of this block's canonical header. This is
    /// the block's identity everywhere it is keyed (chain store, wire
    /// frames, `prev_hash` links).
    pub fn hash_hex(&self) -> String {
        header_hash_hex(&self.header).expect("an already-built header always canonicalizes")
    }

    /// Structural, context-free validation: does this look like a
    /// syntactically well-formed header? Does not check proof-of-work,
    /// ancestry, or transaction content — see [`Block::verify`] and
    /// `Blockchain::add` for those.
    pub fn validate(&self) -> Result<(), BlockError> {
        if let Some(prev) = &self.header.prev_hash {
            let is_hex64 = prev.len() == 64 && prev.chars().all(|c| c.is_ascii_hexdigit());
            if !is_hex64 {
                return Err(BlockError::MalformedHeader(
                    "prev_hash must be a 64-character hex string",
                ));
            }
        }

        if !(self.header.timestamp > 0.0) {
            return Err(BlockError::MalformedHeader("timestamp must be positive"));
        }

        Ok(())
    }

    /// Semantic verification: the committed Merkle root matches the
    /// transaction list, every transaction's signature verifies, and no
    /// transaction hash repeats within the block.
    pub fn verify(&self) -> Result<(), BlockError> {
        let tree = MerkleTree::new(&self.transactions)?;
        if tree.root_hash_hex() != self.header.root {
            return Err(BlockError::InvalidRoot);
        }

        let mut seen = HashSet::new();
        for tx in &self.transactions {
            tx.verify()?;
            let hash = tx.hash_hex()?;
            if !seen.insert(hash) {
                return Err(BlockError::DuplicateTransaction);
            }
        }

        Ok(())
    }
}
