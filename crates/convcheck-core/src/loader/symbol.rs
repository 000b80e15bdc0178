//! Symbol descriptors: the on-disk shape of a type inside project artifacts.
//!
//! A symbol `org.acme.Color` lives at `org/acme/Color.type` in a directory
//! root or inside an archive, serialized as JSON:
//!
//! ```json
//! { "name": "org.acme.Color", "kind": "enum", "constants": ["RED", "GREEN"] }
//! ```
//!
//! Converter symbols additionally carry a `converter` declaration:
//!
//! ```json
//! { "name": "org.acme.PortConverter", "kind": "class",
//!   "converter": { "target": "org.acme.Port", "rule": "int_range", "min": 1, "max": 65535 } }
//! ```

use serde::{Deserialize, Serialize};

/// File extension of serialized symbol descriptors.
pub const SYMBOL_EXTENSION: &str = "type";

/// What kind of type a symbol describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Interface,
    Enum,
    Primitive,
}

/// A resolvable type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolDescriptor {
    /// Fully qualified name (`$` separates nested types).
    pub name: String,

    pub kind: SymbolKind,

    /// Enum constants in declaration order (empty for non-enums).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<String>,

    /// Present when the symbol is a converter implementation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<ConverterDeclaration>,
}

impl SymbolDescriptor {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            constants: Vec::new(),
            converter: None,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, SymbolKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, SymbolKind::Interface)
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(name, SymbolKind::Primitive)
    }

    pub fn enumeration<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut symbol = Self::new(name, SymbolKind::Enum);
        symbol.constants = constants.into_iter().map(Into::into).collect();
        symbol
    }

    /// Attach a converter declaration.
    pub fn with_converter(mut self, declaration: ConverterDeclaration) -> Self {
        self.converter = Some(declaration);
        self
    }

    pub fn is_enum(&self) -> bool {
        self.kind == SymbolKind::Enum
    }

    /// Serialized form, as stored in artifacts.
    pub fn to_json(&self) -> String {
        // A descriptor is plain strings and enums; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Whether `name` is a dotted name whose [`symbol_path`] stays inside a root.
///
/// Segments are non-empty runs of alphanumerics, `_` and `$`.
pub fn is_symbol_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

/// Relative artifact path of a symbol: `a.b.C` -> `a/b/C.type`.
pub fn symbol_path(name: &str) -> String {
    format!("{}.{SYMBOL_EXTENSION}", name.replace('.', "/"))
}

/// Conversion rule implemented by a project converter symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ConverterRule {
    /// The trimmed value must fully match `regex`.
    Pattern { regex: String },
    /// The trimmed value must be one of `values` (exact match).
    OneOf { values: Vec<String> },
    /// The trimmed value must be an integer in `[min, max]`.
    IntRange { min: i64, max: i64 },
}

/// Declares that a symbol converts strings into `target`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConverterDeclaration {
    /// Qualified name of the type this converter produces.
    pub target: String,

    #[serde(flatten)]
    pub rule: ConverterRule,

    /// Failure message; `{value}` is replaced by the rejected value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
