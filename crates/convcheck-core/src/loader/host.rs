//! The enclosing host tier: platform types that exist regardless of project.

use std::collections::HashMap;
use std::sync::Arc;

use super::symbol::SymbolDescriptor;
use super::SymbolSource;

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

const CLASSES: &[&str] = &[
    "java.lang.Object",
    "java.lang.String",
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Character",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Float",
    "java.lang.Double",
    "java.lang.Class",
    "java.math.BigDecimal",
    "java.math.BigInteger",
    "java.util.Optional",
    "java.util.OptionalInt",
    "java.util.OptionalLong",
    "java.util.OptionalDouble",
    "java.util.UUID",
    "java.util.regex.Pattern",
];

const INTERFACES: &[&str] = &[
    "java.lang.CharSequence",
    "java.util.Collection",
    "java.util.List",
    "java.util.Set",
    "java.util.Map",
    "java.util.function.Supplier",
    "jakarta.inject.Provider",
];

/// Fixed catalog of host-environment symbols and resources.
///
/// This is the "parent" of every [`super::ArtifactLoader`] and the only
/// symbol source SAFE mode ever consults. It never touches disk.
#[derive(Debug, Clone, Default)]
pub struct HostSymbols {
    symbols: HashMap<String, Arc<SymbolDescriptor>>,
    resources: HashMap<String, Vec<Vec<u8>>>,
}

impl HostSymbols {
    /// An empty host (tests and embedding only).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard platform catalog.
    pub fn platform() -> Self {
        let mut host = Self::empty();
        for name in PRIMITIVES {
            host.add_symbol(SymbolDescriptor::primitive(*name));
        }
        for name in CLASSES {
            host.add_symbol(SymbolDescriptor::class(*name));
        }
        for name in INTERFACES {
            host.add_symbol(SymbolDescriptor::interface(*name));
        }
        host
    }

    pub fn add_symbol(&mut self, symbol: SymbolDescriptor) {
        self.symbols.insert(symbol.name.clone(), Arc::new(symbol));
    }

    pub fn with_symbol(mut self, symbol: SymbolDescriptor) -> Self {
        self.add_symbol(symbol);
        self
    }

    /// Add a host resource. Several resources may share a name.
    pub fn with_resource(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.resources
            .entry(name.into())
            .or_default()
            .push(contents.into());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Number of copies of resource `name`.
    pub fn resource_count(&self, name: &str) -> usize {
        self.resources.get(name).map_or(0, Vec::len)
    }

    /// Contents of the `index`-th copy of resource `name`.
    pub fn resource(&self, name: &str, index: usize) -> Option<&[u8]> {
        self.resources
            .get(name)
            .and_then(|copies| copies.get(index))
            .map(Vec::as_slice)
    }
}

impl SymbolSource for HostSymbols {
    fn lookup(&self, name: &str) -> Option<Arc<SymbolDescriptor>> {
        self.symbols.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::symbol::SymbolKind;

    #[test]
    fn test_platform_knows_primitives_and_wrappers() {
        let host = HostSymbols::platform();
        assert_eq!(host.lookup("int").unwrap().kind, SymbolKind::Primitive);
        assert_eq!(host.lookup("java.lang.Integer").unwrap().kind, SymbolKind::Class);
        assert_eq!(host.lookup("java.util.List").unwrap().kind, SymbolKind::Interface);
        assert!(host.lookup("org.acme.Color").is_none());
    }

    #[test]
    fn test_resources_accumulate() {
        let host = HostSymbols::empty()
            .with_resource("META-INF/x", "a")
            .with_resource("META-INF/x", "b");
        assert_eq!(host.resource_count("META-INF/x"), 2);
        assert_eq!(host.resource("META-INF/x", 1), Some(&b"b"[..]));
        assert_eq!(host.resource("META-INF/y", 0), None);
    }
}
