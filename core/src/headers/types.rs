//! headers/types.rs
//! Dynamic header values and the contracts generated code is written against.
//!
//! Design notes:
//! - `HeaderValue` is the tagged union behind the generic `get`/`set` API.
//!   Extension (private) parameters always surface as `HeaderValue::Json`.
//! - `HeaderType` is the strict conversion used by fields without an
//!   acceptor; `Accept` is the coercing one used by fields that declare it.
//! - `HeaderFields` is implemented by generated storage structs; the
//!   container in `container.rs` supplies locking and everything
//!   field-independent on top of it.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::MapAccess;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::buffer::Buffer;
use crate::jwa::{CompressionAlgorithm, ContentEncryptionAlgorithm, KeyEncryptionAlgorithm};
use crate::jwk::{EcdsaPublicKey, Key};
use crate::types::{AcceptError, HeaderError, KeyError, ValidationError};

/// A header parameter value of any supported type.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    String(String),
    StringList(Vec<String>),
    Bytes(Buffer),
    KeyEncryption(KeyEncryptionAlgorithm),
    ContentEncryption(ContentEncryptionAlgorithm),
    Compression(CompressionAlgorithm),
    Key(Key),
    EcdsaPublicKey(EcdsaPublicKey),
    /// Arbitrary JSON; the form extension parameters are stored in.
    Json(Value),
}

impl HeaderValue {
    /// Human-readable type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            HeaderValue::String(_) => "string",
            HeaderValue::StringList(_) => "string list",
            HeaderValue::Bytes(_) => "bytes",
            HeaderValue::KeyEncryption(_) => "key encryption algorithm",
            HeaderValue::ContentEncryption(_) => "content encryption algorithm",
            HeaderValue::Compression(_) => "compression algorithm",
            HeaderValue::Key(_) => "jwk",
            HeaderValue::EcdsaPublicKey(_) => "ecdsa public key",
            HeaderValue::Json(v) => json_type_name(v),
        }
    }

    /// Text of string-like values (plain strings, JSON strings, algorithms).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            HeaderValue::Json(Value::String(s)) => Some(s),
            HeaderValue::KeyEncryption(a) => Some(a.as_str()),
            HeaderValue::ContentEncryption(a) => Some(a.as_str()),
            HeaderValue::Compression(a) => Some(a.as_str()),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            HeaderValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Serialize for HeaderValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HeaderValue::String(s) => serializer.serialize_str(s),
            HeaderValue::StringList(v) => v.serialize(serializer),
            HeaderValue::Bytes(b) => b.serialize(serializer),
            HeaderValue::KeyEncryption(a) => a.serialize(serializer),
            HeaderValue::ContentEncryption(a) => a.serialize(serializer),
            HeaderValue::Compression(a) => a.serialize(serializer),
            HeaderValue::Key(k) => k.serialize(serializer),
            HeaderValue::EcdsaPublicKey(k) => k.serialize(serializer),
            HeaderValue::Json(v) => v.serialize(serializer),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        HeaderValue::String(v.to_owned())
    }
}

impl From<String> for HeaderValue {
    fn from(v: String) -> Self {
        HeaderValue::String(v)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(v: Vec<String>) -> Self {
        HeaderValue::StringList(v)
    }
}

impl From<Vec<&str>> for HeaderValue {
    fn from(v: Vec<&str>) -> Self {
        HeaderValue::StringList(v.into_iter().map(str::to_owned).collect())
    }
}

impl From<Value> for HeaderValue {
    fn from(v: Value) -> Self {
        HeaderValue::Json(v)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for HeaderValue {
                fn from(v: $ty) -> Self {
                    HeaderValue::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    Buffer => Bytes,
    KeyEncryptionAlgorithm => KeyEncryption,
    ContentEncryptionAlgorithm => ContentEncryption,
    CompressionAlgorithm => Compression,
    Key => Key,
    EcdsaPublicKey => EcdsaPublicKey,
}

macro_rules! json_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for HeaderValue {
                fn from(v: $ty) -> Self {
                    HeaderValue::Json(Value::from(v))
                }
            }
        )*
    };
}

json_from!(bool, i32, i64, u32, u64, f64);

/// One `(key, value)` entry, as produced by iteration and encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderPair {
    pub key: String,
    pub value: HeaderValue,
}

impl HeaderPair {
    pub fn new(key: impl Into<String>, value: HeaderValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Strict conversion between a field type and `HeaderValue`.
pub trait HeaderType: Sized {
    /// Name reported as `expected` in type mismatch errors.
    const TYPE_NAME: &'static str;

    /// Take the value if it already has this type; hand it back otherwise.
    fn from_value(value: HeaderValue) -> Result<Self, HeaderValue>;

    fn into_value(self) -> HeaderValue;
}

impl HeaderType for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: HeaderValue) -> Result<Self, HeaderValue> {
        match value {
            HeaderValue::String(s) | HeaderValue::Json(Value::String(s)) => Ok(s),
            other => Err(other),
        }
    }

    fn into_value(self) -> HeaderValue {
        HeaderValue::String(self)
    }
}

impl HeaderType for Vec<String> {
    const TYPE_NAME: &'static str = "string list";

    fn from_value(value: HeaderValue) -> Result<Self, HeaderValue> {
        match value {
            HeaderValue::StringList(v) => Ok(v),
            HeaderValue::Json(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect()),
            other => Err(other),
        }
    }

    fn into_value(self) -> HeaderValue {
        HeaderValue::StringList(self)
    }
}

/// Coerces an arbitrary input value into the implementing type.
///
/// Fields that declare an acceptor default-construct their type and call
/// `accept` with whatever the caller passed to `set`.
pub trait Accept {
    fn accept(&mut self, value: HeaderValue) -> Result<(), AcceptError>;
}

/// Builds a key object from its raw JSON form while decoding.
pub trait ParseKey: Sized {
    fn parse_key(raw: Value) -> Result<Self, KeyError>;
}

/// Field storage for one header set. Implemented by generated code.
pub trait HeaderFields: Default + Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Wire keys of every well-known field.
    const KNOWN_KEYS: &'static [&'static str];

    fn get_field(&self, key: &str) -> Option<HeaderValue>;

    /// Validate and store; storage is unchanged on error.
    fn set_field(&mut self, key: &str, value: HeaderValue) -> Result<(), HeaderError>;

    fn remove_field(&mut self, key: &str);

    /// Present fields in field order, then private parameters in key order.
    fn make_pairs(&self) -> Vec<HeaderPair>;

    fn private_params(&self) -> &BTreeMap<String, Value>;

    /// Decode the value for `key` if it names a known field.
    ///
    /// Returns `Ok(false)` without consuming the value when `key` is not a
    /// known field.
    fn decode_field<'de, A: MapAccess<'de>>(
        &mut self,
        key: &str,
        map: &mut A,
    ) -> Result<bool, A::Error>;

    fn is_known_key(key: &str) -> bool {
        Self::KNOWN_KEYS.contains(&key)
    }
}

/// Type mismatch on a strictly typed field.
pub fn wrong_type<T: HeaderType>(key: &str, received: &HeaderValue) -> HeaderError {
    let received = received.type_name();
    tracing::debug!(key, expected = T::TYPE_NAME, received, "header value has wrong type");
    ValidationError::WrongType {
        key: key.to_owned(),
        expected: T::TYPE_NAME,
        received,
    }
    .into()
}

/// Acceptor refusal on a coercing field.
pub fn rejected(key: &str, source: AcceptError) -> HeaderError {
    tracing::debug!(key, error = %source, "header value rejected");
    ValidationError::Rejected {
        key: key.to_owned(),
        source,
    }
    .into()
}

/// Empty value on a field that must not be empty.
pub fn empty_value(key: &str) -> HeaderError {
    tracing::debug!(key, "empty value for non-empty header field");
    ValidationError::Empty {
        key: key.to_owned(),
    }
    .into()
}

/// Store an extension parameter in canonical JSON form.
pub fn insert_private(
    params: &mut BTreeMap<String, Value>,
    key: &str,
    value: HeaderValue,
) -> Result<(), HeaderError> {
    let json = match value {
        HeaderValue::Json(v) => v,
        other => serde_json::to_value(&other).map_err(|source| ValidationError::Unrepresentable {
            key: key.to_owned(),
            source,
        })?,
    };
    params.insert(key.to_owned(), json);
    Ok(())
}
