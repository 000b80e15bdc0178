//! Converters and the validators built on top of them.
//!
//! - [`baseline`] - embedded converters for platform types
//! - [`collection`] - comma-separated list/set/array values
//! - [`declared`] - converters declared by project symbols
//! - [`enum_type`] - hyphenation-insensitive enum matching
//! - [`safe`] - leaf validators backed by the embedded baseline
//! - [`full`] - leaf validators backed by the project's own config provider
//! - [`support`] - per-mode orchestration and caching

pub mod baseline;
pub mod collection;
pub mod declared;
pub mod enum_type;
pub mod full;
pub mod safe;
pub mod support;

use std::fmt;
use std::sync::Arc;

use crate::diagnostic::{report, DiagnosticsCollector};
use crate::enums::EnumConstantsProvider;

pub use baseline::Baseline;
pub use collection::CollectionValidator;
pub use declared::DeclaredConverter;
pub use enum_type::{hyphenate, EnumValidator};
pub use full::{
    CallShape, ConfigProviderResolver, ConverterLookup, DiscoveredConfig, FullBacking,
    FullValidator, HostConfig, ResolverCatalog, SmallRyeResolver,
};
pub use safe::{SafeBacking, SafeValidator};
pub use support::{BackingConfiguration, ConverterRuntimeSupport};

/// A conversion rejected by a converter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("{0}")]
    Rejected(String),

    /// Failure raised from inside a dynamically invoked converter.
    #[error("converter invocation failed: {0}")]
    Invocation(Box<ConversionError>),
}

impl ConversionError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ConversionError::Rejected(message.into())
    }

    pub fn invocation(cause: ConversionError) -> Self {
        ConversionError::Invocation(Box::new(cause))
    }

    /// The message to show the user, with invocation wrappers peeled off.
    pub fn message(&self) -> &str {
        match self {
            ConversionError::Rejected(message) => message,
            ConversionError::Invocation(cause) => cause.message(),
        }
    }
}

/// Turns a string into a value of one target type, or rejects it.
///
/// Only the pass/fail outcome matters here; the converted value is dropped.
pub trait Converter: Send + Sync + fmt::Debug {
    /// Qualified name of the converter implementation.
    fn name(&self) -> &str;

    fn convert(&self, value: &str) -> Result<(), ConversionError>;
}

/// Checks property values against one resolved type.
pub trait ConverterValidator: Send + Sync + fmt::Debug {
    /// Whether a converter was found. Fixed at construction.
    fn can_validate(&self) -> bool;

    /// Report zero or more diagnostics for `value`, which starts at `start`
    /// in the caller's text. Never panics on bad input.
    fn validate(&self, value: &str, start: usize, collector: &mut dyn DiagnosticsCollector);

    /// Re-read enum constants from `provider`. No-op for non-enum validators.
    fn refresh_enum_type(&self, _provider: &dyn EnumConstantsProvider) {}

    /// Qualified converter name, when there is one.
    fn converter_name(&self) -> Option<String> {
        None
    }

    /// Unqualified converter name, used in editor descriptions.
    fn converter_simple_name(&self) -> Option<String> {
        self.converter_name().map(|name| simple_name(&name).to_string())
    }
}

/// Shared handle to a cached validator.
pub type SharedValidator = Arc<dyn ConverterValidator>;

/// Validator for types that have no converter. Never reports anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullValidator;

impl NullValidator {
    pub fn shared() -> SharedValidator {
        Arc::new(NullValidator)
    }
}

impl ConverterValidator for NullValidator {
    fn can_validate(&self) -> bool {
        false
    }

    fn validate(&self, _value: &str, _start: usize, _collector: &mut dyn DiagnosticsCollector) {}
}

/// Run `converter` on `value` and report its failure, if any.
pub(crate) fn run_converter(
    converter: &dyn Converter,
    value: &str,
    start: usize,
    collector: &mut dyn DiagnosticsCollector,
) {
    if let Err(e) = converter.convert(value) {
        report(collector, e.message(), value, start);
    }
}

/// `a.b.Outer$Inner` -> `Inner`
pub fn simple_name(name: &str) -> &str {
    name.rsplit(|c: char| c == '.' || c == '$').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Diagnostic;

    #[test]
    fn test_message_unwraps_invocation_layers() {
        let err = ConversionError::invocation(ConversionError::invocation(
            ConversionError::rejected("bad value"),
        ));
        assert_eq!(err.message(), "bad value");
        assert!(err.to_string().starts_with("converter invocation failed"));
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("org.acme.PortConverter"), "PortConverter");
        assert_eq!(simple_name("org.acme.Converters$Port"), "Port");
        assert_eq!(simple_name("IntegerConverter"), "IntegerConverter");
    }

    #[test]
    fn test_null_validator_reports_nothing() {
        let validator = NullValidator::shared();
        let mut diags: Vec<Diagnostic> = Vec::new();
        validator.validate("anything", 0, &mut diags);
        assert!(!validator.can_validate());
        assert!(diags.is_empty());
        assert!(validator.converter_simple_name().is_none());
    }
}
