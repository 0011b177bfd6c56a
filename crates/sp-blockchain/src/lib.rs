pub mod block;
pub mod blockchain;
pub mod error;

pub use block::{Block, BlockHeader};
pub use blockchain::Blockchain;
pub use error::{BlockError, BlockchainError};

/// Fixed proof-of-work target. A header hash (lowercase hex) is valid
/// proof-of-work when it compares strictly less than this string.
pub const TARGET: &str = "000029ffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

/// Number of trailing ancestor timestamps a new block's own timestamp must
/// be strictly greater than the median of.
pub const MEDIAN_WINDOW: usize = 11;
