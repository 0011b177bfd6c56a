use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinerError {
    #[error("block construction failed: {0}")]
    Block(#[from] sp_blockchain::BlockError),

    #[error("block rejected by local chain: {0}")]
    Blockchain(#[from] sp_blockchain::BlockchainError),
}
