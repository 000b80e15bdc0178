//! Enum constant sources that work without loading the enum's artifact.

use std::collections::HashMap;

/// Supplies the constant names of an enum type, by qualified name.
///
/// Used when trusted loading is unavailable (SAFE mode) or the enum's
/// artifact cannot be read. `None` means "unknown type", not "no constants".
pub trait EnumConstantsProvider: Send + Sync {
    fn constants(&self, type_name: &str) -> Option<Vec<String>>;
}

impl<F> EnumConstantsProvider for F
where
    F: Fn(&str) -> Option<Vec<String>> + Send + Sync,
{
    fn constants(&self, type_name: &str) -> Option<Vec<String>> {
        self(type_name)
    }
}

/// Map-backed provider, typically filled from editor-side type metadata.
#[derive(Debug, Clone, Default)]
pub struct SimpleEnumConstantsProvider {
    constants: HashMap<String, Vec<String>>,
}

impl SimpleEnumConstantsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constants of `type_name`.
    pub fn add_enum_constants<I, S>(&mut self, type_name: impl Into<String>, constants: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constants.insert(
            type_name.into(),
            constants.into_iter().map(Into::into).collect(),
        );
    }

    /// Builder-style variant of [`Self::add_enum_constants`].
    pub fn with_enum<I, S>(mut self, type_name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_enum_constants(type_name, constants);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

impl EnumConstantsProvider for SimpleEnumConstantsProvider {
    fn constants(&self, type_name: &str) -> Option<Vec<String>> {
        self.constants.get(type_name).cloned()
    }
}
