use serde::Serialize;

use crate::CryptoError;

/// Render `value` as canonical JSON bytes: compact separators and object
/// keys in lexicographic order.
///
/// `serde_json::Value`'s map type is a `BTreeMap` (this workspace never
/// enables serde_json's `preserve_order` feature), so routing a struct
/// through `Value` before stringifying it is sufficient to get
/// deterministic, lexicographically-ordered keys at every nesting level —
/// no hand-rolled key sort is needed. Two semantically equal values always
/// produce identical bytes; two unequal values never collide on bytes
/// without also colliding on structure.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CryptoError> {
    let as_value = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&as_value)?)
}

/// Same as [`canonical_bytes`] but returns a `String`.
pub fn canonical_string<T: Serialize>(value: &T) -> Result<String, CryptoError> {
    let as_value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&as_value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Unsorted {
        zebra: u32,
        apple: u32,
        mango: Nested,
    }

    #[derive(Serialize)]
    struct Nested {
        z: u32,
        a: u32,
    }

    #[test]
    fn keys_are_sorted_lexicographically_at_every_level() {
        let v = Unsorted {
            zebra: 1,
            apple: 2,
            mango: Nested { z: 3, a: 4 },
        };
        let s = canonical_string(&v).unwrap();
        assert_eq!(s, r#"{"apple":2,"mango":{"a":4,"z":3},"zebra":1}"#);
    }

    #[test]
    fn equal_values_serialize_identically() {
        let a = Unsorted { zebra: 1, apple: 2, mango: Nested { z: 3, a: 4 } };
        let b = Unsorted { zebra: 1, apple: 2, mango: Nested { z: 3, a: 4 } };
        assert_eq!(canonical_bytes(&a).unwrap(), canonical_bytes(&b).unwrap());
    }
}
