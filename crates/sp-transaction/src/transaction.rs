use serde::{Deserialize, Serialize};
use sp_crypto::{canonical_bytes, double_sha256, Keypair};

use crate::TransactionError;

/// The fields a signature actually commits to — everything on [`Transaction`]
/// except the signature bytes themselves.
#[derive(Serialize)]
struct SignablePayload<'a> {
    sender: &'a str,
    receiver: &'a str,
    amount: u64,
    nonce: u64,
    comment: &'a Option<String>,
}

/// A single signed transfer record.
///
/// `sender`/`receiver` are hex-encoded sec1-compressed secp256k1 public
/// keys; `signature` is a hex-encoded compact ECDSA signature. Keeping
/// these as hex strings (rather than raw byte arrays) means the canonical
/// JSON this type hashes to is human-readable text, matching how every
/// other hashed structure in this workspace serializes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
    pub nonce: u64,
    pub comment: Option<String>,
    pub signature: String,
}

/// Every key a canonical transaction JSON object must carry, used to
/// validate deserialized input (see [`Transaction::from_canonical_json`]).
const REQUIRED_FIELDS: [&str; 6] = [
    "sender",
    "receiver",
    "amount",
    "nonce",
    "comment",
    "signature",
];

impl Transaction {
    /// Sign and build a new transaction. `sender_pk` must match `signer`'s
    /// public key; this is the caller's responsibility, exactly as in the
    /// reference protocol where a node always signs with its own key.
    pub fn create(
        sender_pk: &[u8],
        receiver_pk: &[u8],
        amount: u64,
        signer: &Keypair,
        nonce: u64,
        comment: Option<String>,
    ) -> Result<Self, TransactionError> {
        let sender = hex::encode(sender_pk);
        let receiver = hex::encode(receiver_pk);

        let payload = SignablePayload {
            sender: &sender,
            receiver: &receiver,
            amount,
            nonce,
            comment: &comment,
        };
        let message = canonical_bytes(&payload)?;
        let signature = hex::encode(signer.sign(&message));

        Ok(Self {
            sender,
            receiver,
            amount,
            nonce,
            comment,
            signature,
        })
    }

    /// Recompute the signed message and check `signature` against `sender`.
    pub fn verify(&self) -> Result<(), TransactionError> {
        let payload = SignablePayload {
            sender: &self.sender,
            receiver: &self.receiver,
            amount: self.amount,
            nonce: self.nonce,
            comment: &self.comment,
        };
        let message = canonical_bytes(&payload)?;

        let sender_bytes =
            hex::decode(&self.sender).map_err(|_| TransactionError::Malformed("sender"))?;
        let signature_bytes =
            hex::decode(&self.signature).map_err(|_| TransactionError::Malformed("signature"))?;

        let ok = sp_crypto::verify(&message, &signature_bytes, &sender_bytes)
            .map_err(|_| TransactionError::InvalidSignature)?;

        if ok {
            Ok(())
        } else {
            Err(TransactionError::InvalidSignature)
        }
    }

    /// Double-SHA256 of the canonical serialization of the *whole*
    /// transaction (signature included). Used as both the Merkle leaf
    /// value and the chain-wide duplicate-transaction key.
    pub fn hash(&self) -> Result<[u8; 32], TransactionError> {
        let bytes = canonical_bytes(self)?;
        Ok(double_sha256(&bytes))
    }

    pub fn hash_hex(&self) -> Result<String, TransactionError> {
        Ok(hex::encode(self.hash()?))
    }

    /// Canonical JSON text for this transaction.
    pub fn to_canonical_json(&self) -> Result<String, TransactionError> {
        Ok(sp_crypto::canonical_string(self)?)
    }

    /// Parse canonical JSON text back into a [`Transaction`].
    ///
    /// Validates that every key in [`REQUIRED_FIELDS`] is present in the
    /// parsed object before attempting a typed deserialize. This is the
    /// deliberate fix for the reference implementation's `from_json`
    /// membership check, which tested each field name against the
    /// object's *values* rather than its *keys* and therefore could never
    /// catch a truly malformed object.
    pub fn from_canonical_json(json: &str) -> Result<Self, TransactionError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let obj = value
            .as_object()
            .ok_or(TransactionError::Malformed("<root>"))?;

        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                return Err(TransactionError::Malformed(field));
            }
        }

        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair_and_pk() -> (Keypair, Vec<u8>) {
        let kp = Keypair::generate();
        let pk = kp.public_key_bytes();
        (kp, pk)
    }

    #[test]
    fn create_then_verify_succeeds() {
        let (sender_kp, sender_pk) = keypair_and_pk();
        let (_, receiver_pk) = keypair_and_pk();

        let tx = Transaction::create(&sender_pk, &receiver_pk, 10, &sender_kp, 0, None).unwrap();
        assert!(tx.verify().is_ok());
    }

    #[test]
    fn tampered_amount_fails_verification() {
        let (sender_kp, sender_pk) = keypair_and_pk();
        let (_, receiver_pk) = keypair_and_pk();

        let mut tx = Transaction::create(&sender_pk, &receiver_pk, 10, &sender_kp, 0, None).unwrap();
        tx.amount = 1000;
        assert!(tx.verify().is_err());
    }

    #[test]
    fn canonical_json_round_trips() {
        let (sender_kp, sender_pk) = keypair_and_pk();
        let (_, receiver_pk) = keypair_and_pk();

        let tx = Transaction::create(
            &sender_pk,
            &receiver_pk,
            42,
            &sender_kp,
            7,
            Some("hello".into()),
        )
        .unwrap();

        let json = tx.to_canonical_json().unwrap();
        let back = Transaction::from_canonical_json(&json).unwrap();
        assert_eq!(tx, back);
        assert_eq!(json, back.to_canonical_json().unwrap());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let json = r#"{"sender":"ab","receiver":"cd","amount":1,"nonce":0,"comment":null}"#;
        let err = Transaction::from_canonical_json(json).unwrap_err();
        assert!(matches!(err, TransactionError::Malformed("signature")));
    }

    #[test]
    fn same_fields_hash_identically_and_different_fields_differ() {
        let (sender_kp, sender_pk) = keypair_and_pk();
        let (_, receiver_pk) = keypair_and_pk();

        let a = Transaction::create(&sender_pk, &receiver_pk, 5, &sender_kp, 1, None).unwrap();
        let b = Transaction::create(&sender_pk, &receiver_pk, 5, &sender_kp, 2, None).unwrap();

        assert_eq!(a.hash().unwrap(), a.hash().unwrap());
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
    }
}
