use thiserror::Error;

/// Errors from a single block's context-free self-validation
/// ([`crate::Block::validate`]) and semantic verification
/// ([`crate::Block::verify`]).
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("malformed block header: {0}")]
    MalformedHeader(&'static str),

    #[error("merkle root in header does not match the recomputed root")]
    InvalidRoot,

    #[error("transaction failed verification: {0}")]
    BadTransaction(#[from] sp_transaction::TransactionError),

    #[error("block contains the same transaction hash more than once")]
    DuplicateTransaction,

    #[error("merkle error: {0}")]
    Merkle(#[from] sp_merkle::MerkleError),

    #[error("canonicalization error: {0}")]
    Canonicalize(#[from] sp_crypto::CryptoError),
}

/// Errors from adding a block to, or resolving, a [`crate::Blockchain`].
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("block failed self-validation: {0}")]
    Block(#[from] BlockError),

    #[error("previous hash {0} is not a block this store knows about")]
    UnknownPrevHash(String),

    #[error("genesis block submitted but the store is not empty")]
    ChainNotEmpty,

    #[error("header hash does not satisfy the proof-of-work target")]
    InsufficientWork,

    #[error("timestamp is not strictly after the median of ancestor timestamps")]
    TimestampNotAfterMedian,

    #[error("transaction {0} already appears in an ancestor of the attach point")]
    TransactionAlreadyInChain(String),
}
