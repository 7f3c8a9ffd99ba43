//! Header container generator
//!
//! Generates the field-specific header module from a YAML/JSON field schema.
//! `jwe-core` runs the same generator from its build script; this binary is
//! for inspecting the output or checking a committed copy in CI.
//!
//! Usage:
//!   cargo run --bin genheader -p jwe-codegen --features cli -- --objects core/schema/objects.yml --output headers_gen.rs

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use jwe_codegen::{generate_from_path, is_up_to_date, write_if_changed, GenerateOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Generate a JWE header container module from a field schema")]
struct Args {
    /// Field schema (.yml/.yaml as YAML, anything else as JSON)
    #[arg(long = "objects", value_name = "PATH", default_value = "objects.yml")]
    objects: PathBuf,

    /// Generated Rust source
    #[arg(long = "output", value_name = "PATH", default_value = "headers_gen.rs")]
    output: PathBuf,

    /// Module path of the header runtime inside the target crate
    #[arg(long = "runtime", value_name = "PATH", default_value = "crate::headers")]
    runtime: String,

    /// Fail if the output file is stale instead of writing it
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let opts = GenerateOptions {
        source: args.objects.display().to_string(),
        runtime: args.runtime,
    };
    let source = generate_from_path(&args.objects, &opts)
        .with_context(|| format!("generating headers from {}", args.objects.display()))?;

    if args.check {
        let fresh = is_up_to_date(&args.output, &source)
            .with_context(|| format!("reading {}", args.output.display()))?;
        if !fresh {
            bail!(
                "{} is out of date with {}",
                args.output.display(),
                args.objects.display()
            );
        }
        tracing::info!(output = %args.output.display(), "generated headers are up to date");
        return Ok(());
    }

    let written = write_if_changed(&args.output, &source)
        .with_context(|| format!("writing {}", args.output.display()))?;
    if written {
        tracing::info!(output = %args.output.display(), bytes = source.len(), "wrote generated headers");
    } else {
        tracing::info!(output = %args.output.display(), "generated headers unchanged");
    }
    Ok(())
}

fn init_logging() {
    let default_level = "info";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
