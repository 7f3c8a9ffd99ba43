//! types.rs
//! Error taxonomy shared by the header runtime and its collaborators.
//!
//! Design notes:
//! - `ValidationError` covers values refused by `set` (wrong type, acceptor
//!   failure, business rule).
//! - `HeaderError` is the container-level error; `From` impls let `?` flow
//!   from validation into decode/encode paths.
//! - Every variant names the offending key so callers can report it.

use thiserror::Error;

/// Failure of an `Accept` implementation to coerce an input value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceptError {
    #[error("cannot accept {received} as {target}")]
    UnsupportedType {
        target: &'static str,
        received: &'static str,
    },

    #[error("invalid {target}: {reason}")]
    Invalid { target: &'static str, reason: String },
}

/// A value refused by a header setter.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid value for {key:?} key: expected {expected}, got {received}")]
    WrongType {
        key: String,
        expected: &'static str,
        received: &'static str,
    },

    #[error("invalid value for {key:?} key: {source}")]
    Rejected {
        key: String,
        #[source]
        source: AcceptError,
    },

    #[error("{key:?} field cannot be an empty string")]
    Empty { key: String },

    #[error("value for {key:?} key cannot be represented as JSON: {source}")]
    Unrepresentable {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ValidationError {
    /// Key the refused value was destined for.
    pub fn key(&self) -> &str {
        match self {
            ValidationError::WrongType { key, .. }
            | ValidationError::Rejected { key, .. }
            | ValidationError::Empty { key }
            | ValidationError::Unrepresentable { key, .. } => key,
        }
    }
}

/// Unified header container error.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to decode value for key {}: {source}", .key.as_deref().unwrap_or("<header>"))]
    Decode {
        key: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl HeaderError {
    /// Offending key, when the error can be pinned to one.
    pub fn key(&self) -> Option<&str> {
        match self {
            HeaderError::Validation(e) => Some(e.key()),
            HeaderError::Decode { key, .. } => key.as_deref(),
            HeaderError::Encode { key, .. } => Some(key),
        }
    }
}

/// Failure to interpret a raw JSON value as a key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("key must be a JSON object")]
    NotAnObject,

    #[error("key is missing the \"kty\" parameter")]
    MissingKeyType,

    #[error("unsupported key type {0:?}")]
    UnsupportedKeyType(String),

    #[error("unsupported elliptic curve {0:?}")]
    UnsupportedCurve(String),

    #[error("malformed key: {0}")]
    Json(#[from] serde_json::Error),
}

/// Base64 decode failure for byte-valued fields.
pub type Base64Error = base64::DecodeError;
