//! headers/generated.rs
//! Field-specific half of the header container, generated by `build.rs`
//! from `schema/objects.yml`.

include!(concat!(env!("OUT_DIR"), "/headers_gen.rs"));
