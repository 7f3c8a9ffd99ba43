//! buffer.rs
//! Byte-valued header parameters (`apu`, `apv`, raw extension bytes).
//!
//! On the wire a `Buffer` is a base64url string without padding. Decoding is
//! tolerant of the standard alphabet and of trailing `=` padding, since peers
//! disagree on both.

use std::fmt;

use base64::Engine;
use bytes::Bytes;
use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};

use crate::constants::base64_engines;
use crate::headers::{Accept, HeaderType, HeaderValue};
use crate::types::{AcceptError, Base64Error};

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Buffer(Bytes);

impl Buffer {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Base64url (no padding) text form.
    pub fn base64_encode(&self) -> String {
        base64_engines::WIRE.encode(&self.0)
    }

    /// Decode base64 text in either alphabet, padded or not.
    pub fn base64_decode(src: &str) -> Result<Self, Base64Error> {
        let trimmed = src.trim_end_matches('=');
        let standard = trimmed.contains(&['+', '/'][..]);
        let decoded = if standard {
            base64_engines::STANDARD_NO_PAD.decode(trimmed)?
        } else {
            base64_engines::WIRE.decode(trimmed)?
        };
        Ok(Self(Bytes::from(decoded)))
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer({})", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}

impl From<&[u8]> for Buffer {
    fn from(v: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(v))
    }
}

impl From<Bytes> for Buffer {
    fn from(v: Bytes) -> Self {
        Self(v)
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.base64_encode())
    }
}

impl<'de> Deserialize<'de> for Buffer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Buffer::base64_decode(&text).map_err(de::Error::custom)
    }
}

/// Byte values are taken as-is; text is taken as its raw UTF-8 bytes, not
/// base64-decoded.
impl Accept for Buffer {
    fn accept(&mut self, value: HeaderValue) -> Result<(), AcceptError> {
        match value {
            HeaderValue::Bytes(b) => *self = b,
            HeaderValue::String(s) | HeaderValue::Json(serde_json::Value::String(s)) => {
                *self = Buffer::from(s.into_bytes());
            }
            other => {
                return Err(AcceptError::UnsupportedType {
                    target: Self::TYPE_NAME,
                    received: other.type_name(),
                })
            }
        }
        Ok(())
    }
}

impl HeaderType for Buffer {
    const TYPE_NAME: &'static str = "bytes";

    fn from_value(value: HeaderValue) -> Result<Self, HeaderValue> {
        match value {
            HeaderValue::Bytes(b) => Ok(b),
            other => Err(other),
        }
    }

    fn into_value(self) -> HeaderValue {
        HeaderValue::Bytes(self)
    }
}
