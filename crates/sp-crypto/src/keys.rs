use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;

use crate::CryptoError;

/// A secp256k1 ECDSA keypair. `sender`/`receiver` fields on a transaction
/// only ever carry the public half ([`PublicKeyBytes`]); the signing key
/// stays with whichever actor originates a transaction.
pub struct Keypair {
    signing_key: SigningKey,
}

/// Sec1-compressed public key bytes (33 bytes), the wire/storage form used
/// throughout this workspace.
pub type PublicKeyBytes = Vec<u8>;

impl Keypair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// The compressed public key bytes for this keypair.
    pub fn public_key_bytes(&self) -> PublicKeyBytes {
        self.signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    /// Sign an arbitrary message, returning a compact (r || s) signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing_key.sign(message);
        signature.to_bytes().to_vec()
    }
}

/// Verify a compact ECDSA signature over `message` against a compressed
/// public key's raw bytes.
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool, CryptoError> {
    let verifying_key = VerifyingKey::from_sec1_bytes(public_key).map_err(|_| CryptoError::InvalidKey)?;
    let signature = Signature::try_from(signature).map_err(|_| CryptoError::InvalidSignature)?;
    Ok(verifying_key.verify(message, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_succeeds() {
        let kp = Keypair::generate();
        let msg = b"transfer 5 coins";
        let sig = kp.sign(msg);
        assert!(verify(msg, &sig, &kp.public_key_bytes()).unwrap());
    }

    #[test]
    fn tampered_message_fails_verification() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"transfer 5 coins");
        assert!(!verify(b"transfer 500 coins", &sig, &kp.public_key_bytes()).unwrap());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp_a = Keypair::generate();
        let kp_b = Keypair::generate();
        let sig = kp_a.sign(b"hello");
        assert!(!verify(b"hello", &sig, &kp_b.public_key_bytes()).unwrap());
    }

    #[test]
    fn malformed_public_key_is_an_error() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"hello");
        assert!(verify(b"hello", &sig, &[1, 2, 3]).is_err());
    }
}
