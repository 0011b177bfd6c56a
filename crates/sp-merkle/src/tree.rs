use sp_crypto::double_sha256;
use sp_transaction::Transaction;

use crate::{
    error::MerkleError,
    proof::{MerkleProof, ProofNode, ProofSide},
};

/// The Merkle root of an empty transaction list: `double_sha256(b"")`, a
/// fixed, well-known value. Genesis blocks (no transactions) commit to
/// this root.
pub fn empty_root() -> [u8; 32] {
    double_sha256(b"")
}

/// A binary Merkle tree built from an ordered slice of [`Transaction`]s.
///
/// Leaves are the transactions' own hashes (not re-hashed). Parent hashes
/// are `double_sha256(left || right)`. When a level has an odd number of
/// nodes the last node is paired with itself. Duplicate transactions are
/// not deduplicated by the tree, they simply occupy two leaf slots.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaf hashes (empty when built from no
    /// transactions); `levels[last]` holds the single root hash.
    levels: Vec<Vec<[u8; 32]>>,
}

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut v = left.to_vec();
    v.extend_from_slice(right);
    double_sha256(&v)
}

impl MerkleTree {
    /// Build a tree from `transactions`. An empty slice yields a tree whose
    /// root is [`empty_root`].
    pub fn new(transactions: &[Transaction]) -> Result<Self, MerkleError> {
        if transactions.is_empty() {
            return Ok(Self {
                levels: vec![vec![]],
            });
        }

        let mut leaves: Vec<[u8; 32]> = transactions
            .iter()
            .map(|tx| tx.hash().map_err(|e| MerkleError::HashFailed(e.to_string())))
            .collect::<Result<_, _>>()?;

        let mut levels: Vec<Vec<[u8; 32]>> = vec![leaves.clone()];

        while leaves.len() > 1 {
            // Duplicate last leaf when odd number of leaves.
            if leaves.len() % 2 != 0 {
                let last = *leaves.last().unwrap();
                leaves.push(last);
            }

            let parent_level: Vec<[u8; 32]> = leaves
                .chunks(2)
                .map(|chunk| hash_pair(&chunk[0], &chunk[1]))
                .collect();

            levels.push(parent_level.clone());
            leaves = parent_level;
        }

        Ok(Self { levels })
    }

    /// The Merkle root hash. Never fails: an empty tree's root is
    /// [`empty_root`].
    pub fn root_hash(&self) -> [u8; 32] {
        match self.levels.last().and_then(|l| l.first()) {
            Some(h) => *h,
            None => empty_root(),
        }
    }

    /// Hex-encoded root hash.
    pub fn root_hash_hex(&self) -> String {
        hex::encode(self.root_hash())
    }

    /// Build an inclusion proof for the leaf whose hash is `leaf_hash`.
    /// Returns [`MerkleError::NotFound`] if no leaf matches.
    pub fn proof(&self, leaf_hash: [u8; 32]) -> Result<MerkleProof, MerkleError> {
        let leaves = self.levels.first().ok_or(MerkleError::NotFound)?;
        let mut index = leaves
            .iter()
            .position(|h| *h == leaf_hash)
            .ok_or(MerkleError::NotFound)?;

        let mut path = Vec::new();

        for level in &self.levels[..self.levels.len().saturating_sub(1)] {
            // Ensure the level is padded to even length (mirrors build logic).
            let mut padded = level.clone();
            if padded.len() % 2 != 0 {
                let last = *padded.last().unwrap();
                padded.push(last);
            }

            let sibling_index = if index % 2 == 0 { index + 1 } else { index - 1 };
            let sibling_hash = padded[sibling_index];
            let side = if index % 2 == 0 {
                ProofSide::Right
            } else {
                ProofSide::Left
            };

            path.push(ProofNode {
                hash: sibling_hash,
                side,
            });

            index /= 2;
        }

        Ok(MerkleProof { leaf_hash, path })
    }
}
