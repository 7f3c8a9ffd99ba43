//! headers/mod.rs
//! JWE protected header container.
//!
//! Industry notes:
//! - Registered parameters (RFC 7516 section 4.1) are typed fields generated
//!   from `schema/objects.yml`; anything else is kept verbatim as a private
//!   parameter and re-emitted on encode.
//! - Encoding is deterministic: keys are written in lexicographic order.
//! - Never trust header content before the envelope's integrity check; this
//!   module only checks types.

pub mod container;
pub mod decode;
pub mod encode;
pub mod iterate;
pub mod types;

#[allow(unused_imports, clippy::all)]
mod generated;

pub use container::HeaderContainer;
pub use generated::*;
pub use iterate::{CancelToken, HeaderIter, Visitor};
pub use types::*;

pub use crate::types::{AcceptError, HeaderError, KeyError, ValidationError};
