pub mod directory;
pub mod error;
pub mod frame;

pub use directory::{PeerDirectory, PeerRecord, Role};
pub use error::{DirectoryError, FrameError};
pub use frame::{decode_frame, encode_frame, Frame};
