use sha2::{Digest, Sha256};

/// Bitcoin-style double SHA-256: `SHA256(SHA256(bytes))`.
pub fn double_sha256(bytes: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(bytes);
    let second = Sha256::digest(first);
    second.into()
}

/// Lowercase-hex double SHA-256, the form every hash in this workspace is
/// compared and stored as.
pub fn double_sha256_hex(bytes: &[u8]) -> String {
    hex::encode(double_sha256(bytes))
}
