//! jwe-core
//!
//! JWE protected header container.
//! Typed registered parameters, private parameters, deterministic JSON codec.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;

// Header values
pub mod buffer;
pub mod jwa;
pub mod jwk;

pub mod headers;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::buffer::Buffer;
    pub use crate::headers::{CancelToken, HeaderPair, HeaderValue, Headers};
    pub use crate::jwa::{CompressionAlgorithm, ContentEncryptionAlgorithm, KeyEncryptionAlgorithm};
    pub use crate::jwk::{EcdsaPublicKey, Key};
    pub use crate::types::{HeaderError, ValidationError};
}
