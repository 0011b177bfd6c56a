use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is empty, no tag byte")]
    Empty,

    #[error("unrecognized frame tag byte {0:#04x}")]
    UnknownTag(u8),

    #[error("malformed frame body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("frame body is not valid utf-8")]
    NotUtf8,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no peer registered for role {0:?}")]
    UnknownRole(crate::Role),

    #[error("no peer registered with public key {0}")]
    UnknownPubkey(String),
}
