use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("block {0} is already tracked as an orphan")]
    AlreadyOrphaned(String),

    #[error("blockchain error: {0}")]
    Blockchain(#[from] sp_blockchain::BlockchainError),
}
