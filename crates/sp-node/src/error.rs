use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("miner error: {0}")]
    Miner(#[from] sp_miner::MinerError),

    #[error("blockchain error: {0}")]
    Blockchain(#[from] sp_blockchain::BlockchainError),

    #[error("block error: {0}")]
    Block(#[from] sp_blockchain::BlockError),

    #[error("transaction error: {0}")]
    Transaction(#[from] sp_transaction::TransactionError),

    #[error("frame error: {0}")]
    Frame(#[from] sp_net::FrameError),

    #[error("directory error: {0}")]
    Directory(#[from] sp_net::DirectoryError),

    #[error("serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("no peer subscribed for role {0:?}")]
    NoSubscriber(sp_net::Role),
}
