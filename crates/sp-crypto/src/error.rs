use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("canonicalization failed: {0}")]
    Canonicalize(#[from] serde_json::Error),

    #[error("invalid public key bytes")]
    InvalidKey,

    #[error("invalid signature bytes")]
    InvalidSignature,

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}
