use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("canonicalization error: {0}")]
    Canonicalize(#[from] sp_crypto::CryptoError),

    #[error("signature does not verify under the sender's key")]
    InvalidSignature,

    #[error("malformed transaction: missing or invalid field `{0}`")]
    Malformed(&'static str),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}
