//! jwe-codegen
//!
//! Schema-driven generator for JWE header containers.
//! Reads a declarative field schema and emits the field-specific half of a
//! header container (storage, dispatch tables, typed getters) as Rust source.

#![forbid(unsafe_code)]

pub mod generate;
pub mod output;
pub mod schema;

use std::fs;
use std::io;
use std::path::Path;

pub use generate::{generate, GenerateOptions};
pub use schema::{FieldDescriptor, Schema, SchemaError, SemanticType, Storage};

/// Load `schema_path`, generate, and return the source.
pub fn generate_from_path(
    schema_path: impl AsRef<Path>,
    opts: &GenerateOptions,
) -> Result<String, SchemaError> {
    let schema_path = schema_path.as_ref();
    let schema = Schema::load(schema_path)?;
    tracing::debug!(
        schema = %schema_path.display(),
        fields = schema.fields.len(),
        "loaded header schema"
    );
    generate(&schema, opts)
}

/// Write `source` to `out` unless the file already holds exactly that text.
///
/// Returns `true` when the file was (re)written.
pub fn write_if_changed(out: impl AsRef<Path>, source: &str) -> io::Result<bool> {
    let out = out.as_ref();
    if is_up_to_date(out, source)? {
        return Ok(false);
    }
    fs::write(out, source)?;
    Ok(true)
}

/// Whether `out` exists and matches `source` byte for byte.
pub fn is_up_to_date(out: impl AsRef<Path>, source: &str) -> io::Result<bool> {
    match fs::read(out.as_ref()) {
        Ok(existing) => Ok(existing == source.as_bytes()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
