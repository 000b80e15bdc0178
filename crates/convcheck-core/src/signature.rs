//! Type signatures and their recursive-descent parser.
//!
//! ```text
//! java.lang.String
//! int[]
//! java.util.Map<java.lang.String, java.util.List<java.lang.Integer>>
//! ```

use std::fmt;

use crate::enums::EnumConstantsProvider;
use crate::error::TypeSignatureError;
use crate::loader::{SymbolKind, SymbolSource};

/// Deepest nesting of type arguments and array dimensions accepted on a
/// single path through a signature.
pub const MAX_NESTING: usize = 64;

/// How a leaf name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafOrigin {
    /// Found in the symbol source with this kind.
    Resolved(SymbolKind),
    /// Not loadable (unknown, or loading not allowed); only the name is known.
    Emulated,
}

/// A non-composite type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafType {
    pub name: String,
    pub origin: LeafOrigin,
}

impl LeafType {
    pub fn is_emulated(&self) -> bool {
        self.origin == LeafOrigin::Emulated
    }
}

/// An enum reference with its constant names, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub constants: Vec<String>,
}

/// A parsed type signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Leaf(LeafType),
    Enum(EnumType),
    /// `raw<args...>`. The raw name is matched by name at validator
    /// resolution time, never loaded.
    Parameterized {
        raw: String,
        arguments: Vec<TypeDescriptor>,
    },
    /// `element[]`
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Qualified name of the outermost type (raw name for parameterized types).
    pub fn type_name(&self) -> String {
        match self {
            TypeDescriptor::Leaf(leaf) => leaf.name.clone(),
            TypeDescriptor::Enum(e) => e.name.clone(),
            TypeDescriptor::Parameterized { raw, .. } => raw.clone(),
            TypeDescriptor::Array(element) => format!("{}[]", element.type_name()),
        }
    }

    /// Whether this descriptor or anything it wraps is an enum.
    pub fn contains_enum(&self) -> bool {
        match self {
            TypeDescriptor::Enum(_) => true,
            TypeDescriptor::Leaf(_) => false,
            TypeDescriptor::Parameterized { arguments, .. } => {
                arguments.iter().any(TypeDescriptor::contains_enum)
            }
            TypeDescriptor::Array(element) => element.contains_enum(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Leaf(leaf) => f.write_str(&leaf.name),
            TypeDescriptor::Enum(e) => f.write_str(&e.name),
            TypeDescriptor::Parameterized { raw, arguments } => {
                write!(f, "{raw}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")
            }
            TypeDescriptor::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// Parses signatures against a symbol source.
///
/// Leaves are looked up in `source` without any side effect on the symbol
/// itself. An unknown leaf is not an error: it becomes an emulated leaf, or
/// an enum if the fallback provider knows constants for it.
pub struct TypeSignatureParser<'a> {
    chars: Vec<char>,
    signature: &'a str,
    pos: usize,
    depth: usize,
    provider: Option<&'a dyn EnumConstantsProvider>,
    source: &'a dyn SymbolSource,
}

impl<'a> TypeSignatureParser<'a> {
    /// Parse a complete signature.
    pub fn parse(
        signature: &'a str,
        provider: Option<&'a dyn EnumConstantsProvider>,
        source: &'a dyn SymbolSource,
    ) -> Result<TypeDescriptor, TypeSignatureError> {
        if signature.trim().is_empty() {
            return Err(TypeSignatureError::Empty);
        }
        let mut parser = Self {
            chars: signature.chars().collect(),
            signature,
            pos: 0,
            depth: 0,
            provider,
            source,
        };
        parser.skip_spaces();
        let descriptor = parser.parse_type()?;
        parser.skip_spaces();
        if let Some(found) = parser.peek() {
            return Err(TypeSignatureError::Unexpected {
                found,
                position: parser.pos,
                signature: signature.to_string(),
            });
        }
        Ok(descriptor)
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, TypeSignatureError> {
        let start = self.pos;
        let raw = self.read_identifier();
        if raw.is_empty() {
            return Err(TypeSignatureError::MissingName {
                position: start,
                signature: self.signature.to_string(),
            });
        }
        self.skip_spaces();

        if self.peek() != Some('<') {
            return self.load_leaf(&raw);
        }

        self.enter(1)?;
        self.pos += 1;
        let mut arguments = Vec::new();
        loop {
            self.skip_spaces();
            arguments.push(self.parse_type()?);
            self.skip_spaces();
            if self.peek() == Some(',') {
                self.pos += 1;
                continue;
            }
            break;
        }
        self.expect('>')?;
        self.depth -= 1;

        let mut descriptor = TypeDescriptor::Parameterized { raw, arguments };
        let mut dimensions = 0;
        while self.consume_array_suffix() {
            dimensions += 1;
            descriptor = TypeDescriptor::Array(Box::new(descriptor));
        }
        self.enter(dimensions)?;
        self.depth -= dimensions;
        Ok(descriptor)
    }

    /// Account for `levels` more nesting on the current path.
    fn enter(&mut self, levels: usize) -> Result<(), TypeSignatureError> {
        self.depth += levels;
        if self.depth > MAX_NESTING {
            return Err(TypeSignatureError::TooDeep {
                limit: MAX_NESTING,
                signature: self.signature.to_string(),
            });
        }
        Ok(())
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| !is_boundary(c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn consume_array_suffix(&mut self) -> bool {
        if self.chars.get(self.pos) == Some(&'[') && self.chars.get(self.pos + 1) == Some(&']') {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeSignatureError> {
        if self.peek() != Some(expected) {
            return Err(TypeSignatureError::Expected {
                expected,
                position: self.pos,
                signature: self.signature.to_string(),
            });
        }
        self.pos += 1;
        Ok(())
    }

    fn load_leaf(&mut self, raw: &str) -> Result<TypeDescriptor, TypeSignatureError> {
        let mut name = raw;
        let mut dimensions = 0;
        while let Some(element) = name.strip_suffix("[]") {
            name = element;
            dimensions += 1;
        }
        self.enter(dimensions)?;
        self.depth -= dimensions;

        let mut descriptor = self.resolve_leaf(name);
        for _ in 0..dimensions {
            descriptor = TypeDescriptor::Array(Box::new(descriptor));
        }
        Ok(descriptor)
    }

    fn resolve_leaf(&self, name: &str) -> TypeDescriptor {
        let symbol = self.source.lookup(name);
        let may_be_enum = symbol.as_ref().map_or(true, |s| s.is_enum());
        if may_be_enum {
            let fallback = self.provider.and_then(|p| p.constants(name));
            let constants = fallback.or_else(|| symbol.as_ref().map(|s| s.constants.clone()));
            if let Some(constants) = constants {
                return TypeDescriptor::Enum(EnumType {
                    name: name.to_string(),
                    constants,
                });
            }
        }

        TypeDescriptor::Leaf(LeafType {
            name: name.to_string(),
            origin: symbol.map_or(LeafOrigin::Emulated, |s| LeafOrigin::Resolved(s.kind)),
        })
    }
}

fn is_boundary(c: char) -> bool {
    matches!(c, '<' | '>' | ',') || c.is_whitespace()
}
