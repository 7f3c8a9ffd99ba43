//! headers/decode.rs
//! Single-pass JSON decoding into a header container.
//!
//! Design notes:
//! - One streaming pass over the object. Known keys are decoded by the
//!   generated `decode_field` with their exact type; other keys are read as
//!   generic JSON and routed through the same `set_field` path as `set`.
//! - Decode is a full replace. It fills fresh storage and swaps it in under
//!   the write lock only once the whole object decoded cleanly.
//! - Anything other than a JSON object is a hard error.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, MapAccess};
use serde_json::Value;
use tracing::debug;

use crate::headers::container::HeaderContainer;
use crate::headers::types::{HeaderFields, HeaderValue};
use crate::types::HeaderError;

struct FieldsVisitor<'a, F> {
    // Set to the key whose value failed, if any.
    failed_key: &'a mut Option<String>,
    marker: PhantomData<F>,
}

impl<'a, F> FieldsVisitor<'a, F> {
    fn new(failed_key: &'a mut Option<String>) -> Self {
        Self {
            failed_key,
            marker: PhantomData,
        }
    }
}

fn decode_entry<'de, F, A>(fields: &mut F, key: &str, map: &mut A) -> Result<(), A::Error>
where
    F: HeaderFields,
    A: MapAccess<'de>,
{
    if fields.decode_field(key, map)? {
        return Ok(());
    }
    let value: Value = map.next_value()?;
    fields
        .set_field(key, HeaderValue::Json(value))
        .map_err(<A::Error as de::Error>::custom)
}

impl<'de, F: HeaderFields> de::Visitor<'de> for FieldsVisitor<'_, F> {
    type Value = F;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object of header parameters")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<F, A::Error> {
        let mut fields = F::default();
        while let Some(key) = map.next_key::<String>()? {
            if let Err(e) = decode_entry(&mut fields, &key, &mut map) {
                *self.failed_key = Some(key);
                return Err(e);
            }
        }
        Ok(fields)
    }
}

/// Decode `data` into fresh storage.
pub fn decode_fields<F: HeaderFields>(data: &[u8]) -> Result<F, HeaderError> {
    let mut failed_key = None;
    let mut de = serde_json::Deserializer::from_slice(data);
    let result = (&mut de)
        .deserialize_map(FieldsVisitor::<F>::new(&mut failed_key))
        .and_then(|fields| de.end().map(|()| fields));

    match result {
        Ok(fields) => Ok(fields),
        Err(source) => {
            debug!(key = failed_key.as_deref(), error = %source, "header decode failed");
            Err(HeaderError::Decode {
                key: failed_key,
                source,
            })
        }
    }
}

impl<F: HeaderFields> HeaderContainer<F> {
    /// Replace the whole content with the JSON object in `data`.
    ///
    /// On error the container keeps its previous content.
    pub fn decode(&self, data: &[u8]) -> Result<(), HeaderError> {
        let fields = decode_fields::<F>(data)?;
        *self.write() = fields;
        debug!(bytes = data.len(), "decoded header");
        Ok(())
    }

    /// Build a container from a JSON object.
    pub fn from_slice(data: &[u8]) -> Result<Self, HeaderError> {
        decode_fields(data).map(Self::from_fields)
    }
}

impl<'de, F: HeaderFields> Deserialize<'de> for HeaderContainer<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut failed_key = None;
        deserializer
            .deserialize_map(FieldsVisitor::<F>::new(&mut failed_key))
            .map(Self::from_fields)
    }
}
