//! codegen/generate.rs
//! Emits the header module for a `Schema`.
//!
//! Design notes:
//! - Output is a plain Rust item list meant for `include!`, so it carries no
//!   inner attributes or `//!` docs.
//! - The schema is organized (sorted by name) before emitting; the same
//!   schema always yields byte-identical source.
//! - Everything field-independent (locking, iteration, codec drivers) lives in
//!   the runtime; generated code is the per-field storage, dispatch tables and
//!   typed getters.
//! - Validation for a field lives in exactly one `store_<name>` function,
//!   shared by the setter and the decoder.

use crate::output::Output;
use crate::schema::{FieldDescriptor, Schema, SchemaError, SemanticType, Storage};

/// Knobs for one generator run.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Schema location quoted in the "do not edit" banner.
    pub source: String,
    /// Module path of the header runtime inside the target crate.
    pub runtime: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            source: "objects.yml".to_owned(),
            runtime: "crate::headers".to_owned(),
        }
    }
}

/// Generate the header module source for `schema`.
pub fn generate(schema: &Schema, opts: &GenerateOptions) -> Result<String, SchemaError> {
    let mut schema = schema.clone();
    schema.organize();
    schema.validate()?;

    let mut o = Output::new();
    o.l(format!(
        "// Code generated by jwe-codegen from {}. DO NOT EDIT.",
        opts.source
    ));

    write_imports(&mut o, &schema, opts);
    write_constants(&mut o, &schema);
    write_storage(&mut o, &schema);
    write_store_fns(&mut o, &schema);
    write_fields_impl(&mut o, &schema);
    write_getters(&mut o, &schema);

    debug_assert_eq!(o.depth(), 0, "unbalanced generated source");
    Ok(o.into_string())
}

fn write_imports(o: &mut Output, schema: &Schema, opts: &GenerateOptions) {
    let fields = &schema.fields;
    let any_accept = fields.iter().any(|f| f.has_accept);
    let any_checked = fields.iter().any(|f| !f.has_accept);
    let any_reject_empty = fields.iter().any(|f| f.reject_empty);
    let any_key_ref = fields
        .iter()
        .any(|f| f.semantic_type == SemanticType::OpaqueKeyRef);

    let mut runtime: Vec<&str> = Vec::new();
    if any_accept {
        runtime.push("Accept");
    }
    runtime.extend([
        "HeaderContainer",
        "HeaderError",
        "HeaderFields",
        "HeaderPair",
        "HeaderType",
        "HeaderValue",
    ]);
    if any_key_ref {
        runtime.push("ParseKey");
    }
    if any_reject_empty {
        runtime.push("empty_value");
    }
    runtime.push("insert_private");
    if any_accept {
        runtime.push("rejected");
    }
    if any_checked {
        runtime.push("wrong_type");
    }

    o.ll("use std::collections::BTreeMap;");
    o.ll("use serde::de::{self, MapAccess};");
    o.ll(format!("use {}::{{{}}};", opts.runtime, runtime.join(", ")));

    let mut imports: Vec<&str> = schema.imports.iter().map(String::as_str).collect();
    imports.sort_unstable();
    imports.dedup();
    for import in imports {
        o.l(format!("use {import};"));
    }
}

fn write_constants(o: &mut Output, schema: &Schema) {
    o.l("");
    for f in &schema.fields {
        o.l(format!("pub const {}: &str = {:?};", f.const_name(), f.json));
    }
}

fn write_storage(o: &mut Output, schema: &Schema) {
    let storage = schema.storage_name();

    o.l("");
    match &schema.comment {
        Some(comment) => write_doc(o, comment),
        None => o.l(format!("/// The `{}` header set.", schema.name)),
    }
    o.l(format!(
        "pub type {} = HeaderContainer<{}>;",
        schema.name, storage
    ));

    o.ll(format!("/// Field storage behind [`{}`].", schema.name));
    o.l("#[derive(Clone, Debug, Default, PartialEq)]");
    o.l(format!("pub struct {storage} {{"));
    for f in &schema.fields {
        if let Some(comment) = &f.comment {
            write_doc(o, comment);
        }
        o.l(format!("{}: Option<{}>,", f.name, f.rust_type()));
    }
    o.l("private_params: BTreeMap<String, serde_json::Value>,");
    o.l("}");
}

fn write_store_fns(o: &mut Output, schema: &Schema) {
    o.ll(format!("impl {} {{", schema.storage_name()));
    for (i, f) in schema.fields.iter().enumerate() {
        if i > 0 {
            o.l("");
        }
        o.l(format!(
            "fn store_{}(&mut self, v: {}) -> Result<(), HeaderError> {{",
            f.name,
            f.rust_type()
        ));
        if f.reject_empty {
            o.l("if v.is_empty() {");
            o.l(format!("return Err(empty_value({}));", f.const_name()));
            o.l("}");
        }
        o.l(format!("self.{} = Some(v);", f.name));
        o.l("Ok(())");
        o.l("}");
    }
    o.l("}");
}

fn write_fields_impl(o: &mut Output, schema: &Schema) {
    let fields = &schema.fields;

    o.ll(format!("impl HeaderFields for {} {{", schema.storage_name()));
    o.l("const KNOWN_KEYS: &'static [&'static str] = &[");
    for f in fields {
        o.l(format!("{},", f.const_name()));
    }
    o.l("];");

    // get
    o.ll("fn get_field(&self, key: &str) -> Option<HeaderValue> {");
    o.l("match key {");
    for f in fields {
        o.l(format!(
            "{} => self.{}.clone().map(HeaderType::into_value),",
            f.const_name(),
            f.name
        ));
    }
    o.l("_ => self.private_params.get(key).cloned().map(HeaderValue::Json),");
    o.l("}");
    o.l("}");

    // set
    o.ll("fn set_field(&mut self, key: &str, value: HeaderValue) -> Result<(), HeaderError> {");
    o.l("match key {");
    for f in fields {
        write_set_arm(o, f);
    }
    o.l("_ => insert_private(&mut self.private_params, key, value),");
    o.l("}");
    o.l("}");

    // remove
    o.ll("fn remove_field(&mut self, key: &str) {");
    o.l("match key {");
    for f in fields {
        o.l(format!("{} => self.{} = None,", f.const_name(), f.name));
    }
    o.l("_ => {");
    o.l("self.private_params.remove(key);");
    o.l("}");
    o.l("}");
    o.l("}");

    // pairs
    o.ll("fn make_pairs(&self) -> Vec<HeaderPair> {");
    o.l(format!(
        "let mut pairs = Vec::with_capacity({} + self.private_params.len());",
        fields.len()
    ));
    for f in fields {
        o.l(format!("if let Some(v) = &self.{} {{", f.name));
        o.l(format!(
            "pairs.push(HeaderPair::new({}, v.clone().into_value()));",
            f.const_name()
        ));
        o.l("}");
    }
    o.l("for (key, value) in &self.private_params {");
    o.l("pairs.push(HeaderPair::new(key.as_str(), HeaderValue::Json(value.clone())));");
    o.l("}");
    o.l("pairs");
    o.l("}");

    o.ll("fn private_params(&self) -> &BTreeMap<String, serde_json::Value> {");
    o.l("&self.private_params");
    o.l("}");

    // decode
    o.ll(
        "fn decode_field<'de, A: MapAccess<'de>>(&mut self, key: &str, map: &mut A) -> Result<bool, A::Error> {",
    );
    o.l("match key {");
    for f in fields {
        write_decode_arm(o, f);
    }
    o.l("_ => return Ok(false),");
    o.l("}");
    o.l("Ok(true)");
    o.l("}");

    o.l("}");
}

fn write_set_arm(o: &mut Output, f: &FieldDescriptor) {
    let key = f.const_name();
    let ty = f.rust_type();
    if f.has_accept {
        o.l(format!("{key} => {{"));
        o.l(format!("let mut acceptor = <{ty} as Default>::default();"));
        o.l("if let Err(source) = acceptor.accept(value) {");
        o.l(format!("return Err(rejected({key}, source));"));
        o.l("}");
        o.l(format!("self.store_{}(acceptor)", f.name));
        o.l("}");
    } else {
        o.l(format!(
            "{key} => match <{ty} as HeaderType>::from_value(value) {{"
        ));
        o.l(format!("Ok(v) => self.store_{}(v),", f.name));
        o.l(format!("Err(other) => Err(wrong_type::<{ty}>({key}, &other)),"));
        o.l("},");
    }
}

fn write_decode_arm(o: &mut Output, f: &FieldDescriptor) {
    let ty = f.rust_type();
    let store = format!(
        "self.store_{}(v).map_err(<A::Error as de::Error>::custom)?;",
        f.name
    );
    o.l(format!("{} => {{", f.const_name()));
    match (f.semantic_type, f.storage()) {
        // null leaves a nullable field absent
        (SemanticType::OpaqueKeyRef, _) => {
            o.l("let raw: Option<serde_json::Value> = map.next_value()?;");
            o.l("if let Some(raw) = raw {");
            o.l(format!(
                "let v = <{ty} as ParseKey>::parse_key(raw).map_err(<A::Error as de::Error>::custom)?;"
            ));
            o.l(store);
            o.l("}");
        }
        (_, Storage::Direct) => {
            o.l(format!("if let Some(v) = map.next_value::<Option<{ty}>>()? {{"));
            o.l(store);
            o.l("}");
        }
        (_, Storage::Indirect) => {
            o.l(format!("let v: {ty} = map.next_value()?;"));
            o.l(store);
        }
    }
    o.l("}");
}

fn write_getters(o: &mut Output, schema: &Schema) {
    o.ll(format!("impl HeaderContainer<{}> {{", schema.storage_name()));
    for (i, f) in schema.fields.iter().enumerate() {
        if i > 0 {
            o.l("");
        }
        match &f.comment {
            Some(comment) => write_doc(o, comment),
            None => o.l(format!("/// The `{}` header parameter.", f.json)),
        }
        o.l(format!("pub fn {}(&self) -> {} {{", f.name, f.getter_type()));
        match f.storage() {
            Storage::Indirect => o.l(format!(
                "self.with_fields(|f| f.{}.clone().unwrap_or_default())",
                f.name
            )),
            Storage::Direct => o.l(format!("self.with_fields(|f| f.{}.clone())", f.name)),
        }
        o.l("}");
    }
    o.l("}");
}

fn write_doc(o: &mut Output, text: &str) {
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            o.l("///");
        } else {
            o.l(format!("/// {line}"));
        }
    }
}
