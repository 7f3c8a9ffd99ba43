//! jwa.rs
//! JSON Web Algorithm identifiers carried in JWE headers (RFC 7518).
//!
//! Industry notes:
//! - Algorithm names are open-ended strings; the registry grows, so values
//!   outside the constants below are carried, not refused. `is_registered`
//!   tells callers whether a value is one this crate knows.
//! - The zero value is the empty string, which is how an unset `alg`/`enc`
//!   reads through the typed getters.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::headers::{Accept, HeaderType, HeaderValue};
use crate::types::AcceptError;

macro_rules! string_algorithm {
    (
        $(#[$meta:meta])*
        $name:ident, $variant:ident, $type_name:literal {
            $( $(#[$cmeta:meta])* $konst:ident = $value:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            $( $(#[$cmeta])* pub const $konst: $name = $name(Cow::Borrowed($value)); )*

            const REGISTERED: &'static [&'static str] = &[$($value),*];

            pub fn new(value: impl Into<String>) -> Self {
                Self(Cow::Owned(value.into()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn is_registered(&self) -> bool {
                Self::REGISTERED.contains(&self.as_str())
            }

            /// Every registered value, in declaration order.
            pub fn registered() -> impl Iterator<Item = $name> {
                Self::REGISTERED.iter().map(|v| $name(Cow::Borrowed(*v)))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self::new)
            }
        }

        impl Accept for $name {
            fn accept(&mut self, value: HeaderValue) -> Result<(), AcceptError> {
                match value {
                    HeaderValue::$variant(v) => *self = v,
                    HeaderValue::String(s) | HeaderValue::Json(serde_json::Value::String(s)) => {
                        *self = Self::new(s);
                    }
                    other => {
                        return Err(AcceptError::UnsupportedType {
                            target: $type_name,
                            received: other.type_name(),
                        })
                    }
                }
                Ok(())
            }
        }

        impl HeaderType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn from_value(value: HeaderValue) -> Result<Self, HeaderValue> {
                match value {
                    HeaderValue::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }

            fn into_value(self) -> HeaderValue {
                HeaderValue::$variant(self)
            }
        }
    };
}

string_algorithm! {
    /// Key management algorithm (`alg`).
    KeyEncryptionAlgorithm, KeyEncryption, "key encryption algorithm" {
        A128GCMKW = "A128GCMKW",
        A128KW = "A128KW",
        A192GCMKW = "A192GCMKW",
        A192KW = "A192KW",
        A256GCMKW = "A256GCMKW",
        A256KW = "A256KW",
        /// Direct use of a shared symmetric key as the CEK.
        DIRECT = "dir",
        ECDH_ES = "ECDH-ES",
        ECDH_ES_A128KW = "ECDH-ES+A128KW",
        ECDH_ES_A192KW = "ECDH-ES+A192KW",
        ECDH_ES_A256KW = "ECDH-ES+A256KW",
        PBES2_HS256_A128KW = "PBES2-HS256+A128KW",
        PBES2_HS384_A192KW = "PBES2-HS384+A192KW",
        PBES2_HS512_A256KW = "PBES2-HS512+A256KW",
        RSA1_5 = "RSA1_5",
        RSA_OAEP = "RSA-OAEP",
        RSA_OAEP_256 = "RSA-OAEP-256",
    }
}

impl KeyEncryptionAlgorithm {
    /// Whether the algorithm works with a shared symmetric key rather than a
    /// key pair.
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self.as_str(),
            "A128GCMKW"
                | "A128KW"
                | "A192GCMKW"
                | "A192KW"
                | "A256GCMKW"
                | "A256KW"
                | "dir"
                | "PBES2-HS256+A128KW"
                | "PBES2-HS384+A192KW"
                | "PBES2-HS512+A256KW"
        )
    }
}

string_algorithm! {
    /// Content encryption algorithm (`enc`).
    ContentEncryptionAlgorithm, ContentEncryption, "content encryption algorithm" {
        A128CBC_HS256 = "A128CBC-HS256",
        A128GCM = "A128GCM",
        A192CBC_HS384 = "A192CBC-HS384",
        A192GCM = "A192GCM",
        A256CBC_HS512 = "A256CBC-HS512",
        A256GCM = "A256GCM",
    }
}

string_algorithm! {
    /// Compression algorithm (`zip`).
    CompressionAlgorithm, Compression, "compression algorithm" {
        DEFLATE = "DEF",
        /// No compression; also the zero value.
        NO_COMPRESS = "",
    }
}
