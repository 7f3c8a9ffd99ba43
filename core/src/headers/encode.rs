//! headers/encode.rs
//! JSON encoding of a header container.
//!
//! Design notes:
//! - Output is one flat JSON object with keys in lexicographic order, so
//!   equal headers always encode to identical bytes.
//! - Byte values are written directly as quoted base64url text; everything
//!   else goes through serde.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::headers::container::HeaderContainer;
use crate::headers::types::{HeaderFields, HeaderPair, HeaderValue};
use crate::types::HeaderError;

/// Sort `pairs` by key and write them as one JSON object.
pub fn encode_pairs(mut pairs: Vec<HeaderPair>) -> Result<Vec<u8>, HeaderError> {
    pairs.sort_by(|a, b| a.key.cmp(&b.key));

    let mut out = Vec::with_capacity(32 * pairs.len() + 2);
    out.push(b'{');
    for (i, pair) in pairs.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        let encode_err = |source| HeaderError::Encode {
            key: pair.key.clone(),
            source,
        };
        serde_json::to_writer(&mut out, &pair.key).map_err(encode_err)?;
        out.push(b':');
        match &pair.value {
            HeaderValue::Bytes(b) => {
                // base64url needs no JSON escaping
                out.push(b'"');
                out.extend_from_slice(b.base64_encode().as_bytes());
                out.push(b'"');
            }
            other => serde_json::to_writer(&mut out, other).map_err(encode_err)?,
        }
    }
    out.push(b'}');
    Ok(out)
}

impl<F: HeaderFields> HeaderContainer<F> {
    /// Encode as a flat JSON object.
    pub fn encode(&self) -> Result<Vec<u8>, HeaderError> {
        let pairs = self.read().make_pairs();
        encode_pairs(pairs)
    }
}

impl<F: HeaderFields> Serialize for HeaderContainer<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pairs = self.read().make_pairs();
        pairs.sort_by(|a, b| a.key.cmp(&b.key));

        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for pair in &pairs {
            map.serialize_entry(&pair.key, &pair.value)?;
        }
        map.end()
    }
}
