//! build.rs
//! Generates `headers_gen.rs` from the field schema into OUT_DIR.
//!
//! The schema defaults to `schema/objects.yml`; set `JWE_HEADERS_SCHEMA` to
//! build against a different one.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use jwe_codegen::{generate_from_path, write_if_changed, GenerateOptions};

const SCHEMA_ENV: &str = "JWE_HEADERS_SCHEMA";
const DEFAULT_SCHEMA: &str = "schema/objects.yml";

fn main() -> Result<()> {
    println!("cargo:rerun-if-env-changed={SCHEMA_ENV}");

    let schema = match env::var_os(SCHEMA_ENV) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(DEFAULT_SCHEMA),
    };
    println!("cargo:rerun-if-changed={}", schema.display());

    let opts = GenerateOptions {
        source: schema.display().to_string(),
        ..GenerateOptions::default()
    };
    let source = generate_from_path(&schema, &opts)
        .with_context(|| format!("generating headers from {}", schema.display()))?;

    let out_dir = PathBuf::from(env::var("OUT_DIR").context("OUT_DIR is not set")?);
    let out = out_dir.join("headers_gen.rs");
    write_if_changed(&out, &source).with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}
