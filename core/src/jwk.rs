//! jwk.rs
//! Key objects referenced from JWE headers (`jwk`, `epk`).
//!
//! Neither type validates key material; they check only enough structure to
//! route the value (`kty`, `crv`) and carry it losslessly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::buffer::Buffer;
use crate::constants::{SUPPORTED_EC_CURVES, SUPPORTED_KEY_TYPES};
use crate::headers::{HeaderType, HeaderValue, ParseKey};
use crate::types::KeyError;

/// An opaque JSON Web Key: the raw parameter object with a known `kty`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Key(Map<String, Value>);

impl Key {
    pub fn from_json(raw: Value) -> Result<Self, KeyError> {
        let Value::Object(params) = raw else {
            return Err(KeyError::NotAnObject);
        };
        let kty = match params.get("kty") {
            Some(Value::String(kty)) => kty,
            Some(_) | None => return Err(KeyError::MissingKeyType),
        };
        if !SUPPORTED_KEY_TYPES.contains(&kty.as_str()) {
            return Err(KeyError::UnsupportedKeyType(kty.clone()));
        }
        Ok(Self(params))
    }

    /// Parse a key from its JSON text.
    pub fn parse(data: &[u8]) -> Result<Self, KeyError> {
        Self::from_json(serde_json::from_slice(data)?)
    }

    pub fn key_type(&self) -> &str {
        self.0.get("kty").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn key_id(&self) -> Option<&str> {
        self.0.get("kid").and_then(Value::as_str)
    }

    /// A raw key parameter, e.g. `"n"` or `"crv"`.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl TryFrom<Value> for Key {
    type Error = KeyError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        Key::from_json(raw)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        Value::Object(key.0)
    }
}

impl ParseKey for Key {
    fn parse_key(raw: Value) -> Result<Self, KeyError> {
        Key::from_json(raw)
    }
}

impl HeaderType for Key {
    const TYPE_NAME: &'static str = "jwk";

    fn from_value(value: HeaderValue) -> Result<Self, HeaderValue> {
        match value {
            HeaderValue::Key(k) => Ok(k),
            other => Err(other),
        }
    }

    fn into_value(self) -> HeaderValue {
        HeaderValue::Key(self)
    }
}

/// Public half of an elliptic-curve key, as used for `epk`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EcdsaPublicKeyRepr", into = "EcdsaPublicKeyRepr")]
pub struct EcdsaPublicKey {
    curve: String,
    x: Buffer,
    y: Buffer,
}

#[derive(Serialize, Deserialize)]
struct EcdsaPublicKeyRepr {
    kty: String,
    crv: String,
    x: Buffer,
    y: Buffer,
}

impl EcdsaPublicKey {
    pub fn new(curve: &str, x: impl Into<Buffer>, y: impl Into<Buffer>) -> Result<Self, KeyError> {
        if !SUPPORTED_EC_CURVES.contains(&curve) {
            return Err(KeyError::UnsupportedCurve(curve.to_owned()));
        }
        Ok(Self {
            curve: curve.to_owned(),
            x: x.into(),
            y: y.into(),
        })
    }

    pub fn curve(&self) -> &str {
        &self.curve
    }

    pub fn x(&self) -> &Buffer {
        &self.x
    }

    pub fn y(&self) -> &Buffer {
        &self.y
    }
}

impl TryFrom<EcdsaPublicKeyRepr> for EcdsaPublicKey {
    type Error = KeyError;

    fn try_from(repr: EcdsaPublicKeyRepr) -> Result<Self, Self::Error> {
        if repr.kty != "EC" {
            return Err(KeyError::UnsupportedKeyType(repr.kty));
        }
        EcdsaPublicKey::new(&repr.crv, repr.x, repr.y)
    }
}

impl From<EcdsaPublicKey> for EcdsaPublicKeyRepr {
    fn from(key: EcdsaPublicKey) -> Self {
        Self {
            kty: "EC".to_owned(),
            crv: key.curve,
            x: key.x,
            y: key.y,
        }
    }
}

impl HeaderType for EcdsaPublicKey {
    const TYPE_NAME: &'static str = "ecdsa public key";

    fn from_value(value: HeaderValue) -> Result<Self, HeaderValue> {
        match value {
            HeaderValue::EcdsaPublicKey(k) => Ok(k),
            other => Err(other),
        }
    }

    fn into_value(self) -> HeaderValue {
        HeaderValue::EcdsaPublicKey(self)
    }
}
