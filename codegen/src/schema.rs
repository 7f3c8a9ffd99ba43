//! codegen/schema.rs
//! Declarative field schema consumed by the header generator.
//!
//! Design notes:
//! - One `FieldDescriptor` per well-known header parameter; the schema is the
//!   single source of truth for wire keys, Rust types and validation flags.
//! - Storage indirection is decided by a fixed per-type policy table
//!   (`Storage::for_type`), never per field.
//! - `organize()` sorts fields by name so generated output never depends on
//!   the order fields were written in the source file.
//! - Validation is strict: any ambiguity is a `SchemaError`, never resolved
//!   silently.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic type of a header field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticType {
    String,
    StringList,
    Bytes,
    OpaqueKeyRef,
    AlgorithmEnum,
    Nested,
}

impl SemanticType {
    /// Rust type used when the descriptor does not name one.
    pub fn default_rust_type(self) -> Option<&'static str> {
        match self {
            SemanticType::String => Some("String"),
            SemanticType::StringList => Some("Vec<String>"),
            SemanticType::Bytes => Some("Buffer"),
            SemanticType::OpaqueKeyRef => Some("Key"),
            SemanticType::AlgorithmEnum | SemanticType::Nested => None,
        }
    }

    /// Whether the non-empty rule can be expressed for this type.
    pub fn supports_reject_empty(self) -> bool {
        matches!(self, SemanticType::String | SemanticType::AlgorithmEnum)
    }
}

/// Storage indirection policy.
///
/// - `Indirect`: scalar values. The typed getter hides absence behind the
///   type's zero value (`Default`).
/// - `Direct`: sequence and reference values, nullable by nature. The typed
///   getter returns `Option<T>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Storage {
    Indirect,
    Direct,
}

impl Storage {
    pub fn for_type(ty: SemanticType) -> Storage {
        match ty {
            SemanticType::String | SemanticType::Bytes | SemanticType::AlgorithmEnum => {
                Storage::Indirect
            }
            SemanticType::StringList | SemanticType::OpaqueKeyRef | SemanticType::Nested => {
                Storage::Direct
            }
        }
    }
}

/// Static description of one header field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDescriptor {
    /// snake_case identifier; becomes the storage field and getter name.
    pub name: String,
    /// Wire key used in the serialized JSON object.
    pub json: String,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust_type: Option<String>,
    #[serde(default)]
    pub has_accept: bool,
    #[serde(default)]
    pub reject_empty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: &str, json: &str, semantic_type: SemanticType) -> Self {
        Self {
            name: name.to_owned(),
            json: json.to_owned(),
            semantic_type,
            rust_type: None,
            has_accept: false,
            reject_empty: false,
            comment: None,
        }
    }

    /// Name of the generated wire-key constant, e.g. `ALGORITHM_KEY`.
    pub fn const_name(&self) -> String {
        format!("{}_KEY", self.name.to_ascii_uppercase())
    }

    pub fn rust_type(&self) -> Cow<'_, str> {
        match (&self.rust_type, self.semantic_type.default_rust_type()) {
            (Some(ty), _) => Cow::Borrowed(ty.as_str()),
            (None, Some(ty)) => Cow::Borrowed(ty),
            (None, None) => Cow::Borrowed("()"),
        }
    }

    pub fn storage(&self) -> Storage {
        Storage::for_type(self.semantic_type)
    }

    pub fn is_indirect(&self) -> bool {
        self.storage() == Storage::Indirect
    }

    /// Return type of the generated typed getter.
    pub fn getter_type(&self) -> String {
        match self.storage() {
            Storage::Indirect => self.rust_type().into_owned(),
            Storage::Direct => format!("Option<{}>", self.rust_type()),
        }
    }
}

/// Ordered set of field descriptors for one header type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Schema {
    /// Public alias of the generated container, e.g. `Headers`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// `use` paths the generated module needs for the field types.
    #[serde(default)]
    pub imports: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
}

/// Method names already taken by the container; typed getters may not reuse them.
pub const RESERVED_NAMES: &[&str] = &[
    "as_map",
    "clone",
    "copy_to",
    "decode",
    "encode",
    "from_fields",
    "from_slice",
    "get",
    "iterate",
    "merge",
    "new",
    "private_params",
    "read",
    "remove",
    "set",
    "snapshot",
    "walk",
    "with_fields",
    "write",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "try",
    "type", "unsafe", "use", "where", "while", "yield",
];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema {name} declares no fields")]
    Empty { name: String },

    #[error("field {name:?} has an empty wire key")]
    EmptyWireKey { name: String },

    #[error("wire key {key:?} is declared more than once")]
    DuplicateWireKey { key: String },

    #[error("field name {name:?} is declared more than once")]
    DuplicateName { name: String },

    #[error("{name:?} is not a valid identifier")]
    InvalidIdentifier { name: String },

    #[error("field name {name:?} collides with a reserved name")]
    ReservedName { name: String },

    #[error("field {name:?} of type {semantic_type:?} must declare rustType")]
    MissingRustType {
        name: String,
        semantic_type: SemanticType,
    },

    #[error("field {name:?} cannot use rejectEmpty with type {semantic_type:?}")]
    RejectEmptyUnsupported {
        name: String,
        semantic_type: SemanticType,
    },
}

impl Schema {
    /// Load a schema from disk. `.yml`/`.yaml` files are parsed as YAML,
    /// everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        );
        if is_yaml {
            Self::from_yaml(&src)
        } else {
            Self::from_json(src.as_bytes())
        }
    }

    pub fn from_yaml(src: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(src)?)
    }

    pub fn from_json(src: &[u8]) -> Result<Self, SchemaError> {
        Ok(serde_json::from_slice(src)?)
    }

    /// Stable ordering: fields sorted by name.
    pub fn organize(&mut self) {
        self.fields.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if !is_type_identifier(&self.name) {
            return Err(SchemaError::InvalidIdentifier {
                name: self.name.clone(),
            });
        }
        if self.fields.is_empty() {
            return Err(SchemaError::Empty {
                name: self.name.clone(),
            });
        }

        let mut names = BTreeSet::new();
        let mut keys = BTreeSet::new();
        for field in &self.fields {
            if !is_field_identifier(&field.name) {
                return Err(SchemaError::InvalidIdentifier {
                    name: field.name.clone(),
                });
            }
            if RESERVED_NAMES.contains(&field.name.as_str()) {
                return Err(SchemaError::ReservedName {
                    name: field.name.clone(),
                });
            }
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    name: field.name.clone(),
                });
            }
            if field.json.is_empty() {
                return Err(SchemaError::EmptyWireKey {
                    name: field.name.clone(),
                });
            }
            if !keys.insert(field.json.as_str()) {
                return Err(SchemaError::DuplicateWireKey {
                    key: field.json.clone(),
                });
            }
            if field.rust_type.is_none() && field.semantic_type.default_rust_type().is_none() {
                return Err(SchemaError::MissingRustType {
                    name: field.name.clone(),
                    semantic_type: field.semantic_type,
                });
            }
            if field.reject_empty && !field.semantic_type.supports_reject_empty() {
                return Err(SchemaError::RejectEmptyUnsupported {
                    name: field.name.clone(),
                    semantic_type: field.semantic_type,
                });
            }
        }
        Ok(())
    }

    /// Name of the generated storage struct, e.g. `StdHeaders`.
    pub fn storage_name(&self) -> String {
        format!("Std{}", self.name)
    }
}

fn is_field_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    starts_ok
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name != "_"
        && !RUST_KEYWORDS.contains(&name)
}

fn is_type_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}
