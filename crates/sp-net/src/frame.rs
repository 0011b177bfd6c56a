use serde::{Deserialize, Serialize};

use crate::FrameError;

const TAG_BLOCK: u8 = b'b';
const TAG_TRANSACTION: u8 = b't';
const TAG_PRODUCT_DELIVERED: u8 = b'p';

/// A single frame as it crosses the (externally-owned) transport: one tag
/// byte identifying the payload shape, followed by a body.
///
/// `"b"`/`"t"` carry a JSON object wrapping the already-serialized inner
/// value (`blk_json`/`tx_json`), while `"p"`
/// carries the transaction hash as a bare hex string with no JSON
/// wrapping — the vendor's "product delivered" notification needs nothing
/// more than that one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Block { blk_json: String },
    Transaction { tx_json: String },
    ProductDelivered { tx_hash: String },
}

#[derive(Serialize, Deserialize)]
struct BlockBody {
    blk_json: String,
}

#[derive(Serialize, Deserialize)]
struct TransactionBody {
    tx_json: String,
}

/// Tag byte + body, ready to hand to the transport.
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::new();
    match frame {
        Frame::Block { blk_json } => {
            out.push(TAG_BLOCK);
            out.extend_from_slice(&serde_json::to_vec(&BlockBody {
                blk_json: blk_json.clone(),
            })?);
        }
        Frame::Transaction { tx_json } => {
            out.push(TAG_TRANSACTION);
            out.extend_from_slice(&serde_json::to_vec(&TransactionBody {
                tx_json: tx_json.clone(),
            })?);
        }
        Frame::ProductDelivered { tx_hash } => {
            out.push(TAG_PRODUCT_DELIVERED);
            out.extend_from_slice(tx_hash.as_bytes());
        }
    }
    Ok(out)
}

/// Inverse of [`encode_frame`]. A frame with no tag byte, an unrecognized
/// tag, or a body that fails to parse for its tag is
/// [`FrameError`] — the caller logs and drops it.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, FrameError> {
    let (&tag, body) = bytes.split_first().ok_or(FrameError::Empty)?;

    match tag {
        TAG_BLOCK => {
            let parsed: BlockBody = serde_json::from_slice(body)?;
            Ok(Frame::Block {
                blk_json: parsed.blk_json,
            })
        }
        TAG_TRANSACTION => {
            let parsed: TransactionBody = serde_json::from_slice(body)?;
            Ok(Frame::Transaction {
                tx_json: parsed.tx_json,
            })
        }
        TAG_PRODUCT_DELIVERED => {
            let tx_hash = std::str::from_utf8(body)
                .map_err(|_| FrameError::NotUtf8)?
                .to_string();
            Ok(Frame::ProductDelivered { tx_hash })
        }
        other => Err(FrameError::UnknownTag(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_frame_round_trips() {
        let frame = Frame::Block {
            blk_json: r#"{"header":{}}"#.to_string(),
        };
        let bytes = encode_frame(&frame).unwrap();
        assert_eq!(bytes[0], TAG_BLOCK);
        assert_eq!(decode_frame(&bytes).unwrap(), frame);
    }

    #[test]
    fn transaction_frame_round_trips() {
        let frame = Frame::Transaction {
            tx_json: r#"{"amount":1}"#.to_string(),
        };
        let bytes = encode_frame(&frame).unwrap();
        assert_eq!(decode_frame(&bytes).unwrap(), frame);
    }

    #[test]
    fn product_delivered_frame_carries_bare_hex() {
        let frame = Frame::ProductDelivered {
            tx_hash: "ab".repeat(32),
        };
        let bytes = encode_frame(&frame).unwrap();
        assert_eq!(bytes[0], TAG_PRODUCT_DELIVERED);
        assert_eq!(&bytes[1..], "ab".repeat(32).as_bytes());
        assert_eq!(decode_frame(&bytes).unwrap(), frame);
    }

    #[test]
    fn empty_frame_is_rejected() {
        assert!(matches!(decode_frame(&[]), Err(FrameError::Empty)));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(matches!(
            decode_frame(b"zgarbage"),
            Err(FrameError::UnknownTag(b'z'))
        ));
    }

    #[test]
    fn malformed_body_is_rejected() {
        let mut bytes = vec![TAG_BLOCK];
        bytes.extend_from_slice(b"not json");
        assert!(matches!(decode_frame(&bytes), Err(FrameError::Malformed(_))));
    }
}
