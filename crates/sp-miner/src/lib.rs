pub mod adversary;
pub mod core;
pub mod error;
pub mod honest;
pub mod hooks;
pub mod pool;

pub use adversary::{AdversaryMiner, Mode};
pub use core::MinerCore;
pub use error::MinerError;
pub use honest::HonestMiner;
pub use hooks::{BlockOrigin, BroadcastDecision, MinerHooks};
pub use pool::TransactionPool;
