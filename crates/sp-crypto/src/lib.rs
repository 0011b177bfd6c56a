pub mod canonical;
pub mod error;
pub mod hash;
pub mod keys;

pub use canonical::{canonical_bytes, canonical_string};
pub use error::CryptoError;
pub use hash::{double_sha256, double_sha256_hex};
pub use keys::{verify, Keypair, PublicKeyBytes};
