pub mod error;
pub mod orphans;

pub use error::SyncError;
pub use orphans::OrphanPool;
