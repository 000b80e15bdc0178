//! Per-mode converter orchestration: type resolution, validator caching and dispatch.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use super::collection::CollectionValidator;
use super::enum_type::EnumValidator;
use super::{NullValidator, SharedValidator};
use crate::diagnostic::DiagnosticsCollector;
use crate::enums::EnumConstantsProvider;
use crate::loader::ArtifactLoader;
use crate::metrics::METRICS;
use crate::mode::ExecutionMode;
use crate::obs;
use crate::provider::{Capability, ConverterSupport, RuntimeSupport};
use crate::runtime::TypeResolver;
use crate::signature::TypeDescriptor;

const LIST: &str = "java.util.List";
const SET: &str = "java.util.Set";
const MAP: &str = "java.util.Map";
const OPTIONAL: &str = "java.util.Optional";
const SUPPLIER: &str = "java.util.function.Supplier";
const INJECT_PROVIDER: &str = "jakarta.inject.Provider";

/// The configuration instance a mode validates leaves against.
pub trait BackingConfiguration: Send + Sync + 'static {
    type Config: ?Sized + Send + Sync;

    fn mode(&self) -> ExecutionMode;

    /// Construct the configuration instance, or `None` when this mode has
    /// nothing usable for the current artifacts.
    fn load(&self, loader: &ArtifactLoader) -> Option<Arc<Self::Config>>;

    /// Validator for a single resolved leaf type.
    fn leaf_validator(&self, config: &Self::Config, type_name: &str) -> SharedValidator;
}

enum BackingState<C: ?Sized> {
    Uninitialized,
    Ready(Arc<C>),
    Unavailable,
}

/// Resolves signatures to validators for one trust mode.
///
/// Validators are cached by raw signature string. [`RuntimeSupport::reset`]
/// drops the configuration instance and the whole cache; it takes the
/// state lock exclusively, so no validator resolved against the old
/// configuration can be inserted after it returns.
pub struct ConverterRuntimeSupport<B: BackingConfiguration> {
    backing: B,
    types: TypeResolver,
    state: RwLock<BackingState<B::Config>>,
    cache: DashMap<String, SharedValidator>,
}

impl<B: BackingConfiguration> ConverterRuntimeSupport<B> {
    pub fn new(backing: B, types: TypeResolver) -> Self {
        Self {
            backing,
            types,
            state: RwLock::new(BackingState::Uninitialized),
            cache: DashMap::new(),
        }
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    /// Number of cached validators.
    pub fn cached_validators(&self) -> usize {
        self.cache.len()
    }

    fn ensure_loaded(&self) {
        if !matches!(*self.state.read(), BackingState::Uninitialized) {
            return;
        }
        let mut state = self.state.write();
        if matches!(*state, BackingState::Uninitialized) {
            let loader = self.types.loader();
            *state = match self.backing.load(&loader) {
                Some(config) => BackingState::Ready(config),
                None => BackingState::Unavailable,
            };
        }
    }

    fn build_validator(
        &self,
        config: &B::Config,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
    ) -> SharedValidator {
        let mode = self.backing.mode();
        match self.types.find_type(signature, provider, mode) {
            Ok(descriptor) => {
                let validator = self.resolve(config, &descriptor);
                METRICS.inc_validators_resolved();
                obs::emit_validator_resolved(mode, signature, validator.can_validate());
                validator
            }
            Err(e) => {
                obs::emit_signature_rejected(mode, signature, &e);
                NullValidator::shared()
            }
        }
    }

    fn resolve(&self, config: &B::Config, descriptor: &TypeDescriptor) -> SharedValidator {
        match descriptor {
            TypeDescriptor::Enum(enum_type) => Arc::new(EnumValidator::new(enum_type)),
            TypeDescriptor::Array(element) => {
                Arc::new(CollectionValidator::new(self.resolve(config, element)))
            }
            TypeDescriptor::Parameterized { raw, arguments } => {
                match (raw.as_str(), arguments.as_slice()) {
                    (LIST | SET, [element, ..]) => {
                        Arc::new(CollectionValidator::new(self.resolve(config, element)))
                    }
                    // Keys are not validated.
                    (MAP, [_, value, ..]) => self.resolve(config, value),
                    // Presence is not validated.
                    (OPTIONAL | SUPPLIER | INJECT_PROVIDER, [inner, ..]) => {
                        self.resolve(config, inner)
                    }
                    _ => NullValidator::shared(),
                }
            }
            TypeDescriptor::Leaf(leaf) if leaf.is_emulated() => NullValidator::shared(),
            TypeDescriptor::Leaf(leaf) => self.backing.leaf_validator(config, &leaf.name),
        }
    }
}

impl<B: BackingConfiguration> ConverterSupport for ConverterRuntimeSupport<B> {
    fn validate(
        &self,
        value: &str,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
        collector: &mut dyn DiagnosticsCollector,
    ) {
        let Some(validator) = self.find_validator(signature, provider) else {
            return;
        };
        if !validator.can_validate() {
            return;
        }
        if let Some(provider) = provider {
            validator.refresh_enum_type(provider);
        }
        validator.validate(value, 0, collector);
    }

    fn find_validator(
        &self,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
    ) -> Option<SharedValidator> {
        loop {
            self.ensure_loaded();
            let state = self.state.read();
            match &*state {
                BackingState::Ready(config) => {
                    let validator = self
                        .cache
                        .entry(signature.to_string())
                        .or_insert_with(|| self.build_validator(config, signature, provider))
                        .value()
                        .clone();
                    return Some(validator);
                }
                BackingState::Unavailable => return None,
                // A reset slipped in between loading and reading.
                BackingState::Uninitialized => continue,
            }
        }
    }

    fn has_usable_backing_configuration(&self) -> bool {
        self.ensure_loaded();
        matches!(*self.state.read(), BackingState::Ready(_))
    }
}

impl<B: BackingConfiguration> RuntimeSupport for ConverterRuntimeSupport<B> {
    fn capability(&self) -> Capability {
        Capability::ConverterValidation
    }

    fn mode(&self) -> ExecutionMode {
        self.backing.mode()
    }

    fn reset(&self) {
        let mut state = self.state.write();
        *state = BackingState::Uninitialized;
        self.cache.clear();
    }

    fn as_converter_support(&self) -> Option<&dyn ConverterSupport> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::safe::SafeBacking;
    use crate::diagnostic::Diagnostic;
    use crate::enums::SimpleEnumConstantsProvider;
    use crate::loader::HostSymbols;

    fn safe_support() -> ConverterRuntimeSupport<SafeBacking> {
        let types = TypeResolver::new(Arc::new(HostSymbols::platform()), std::iter::empty::<&str>());
        ConverterRuntimeSupport::new(SafeBacking, types)
    }

    fn validate(support: &dyn ConverterSupport, value: &str, signature: &str) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        support.validate(value, signature, None, &mut diags);
        diags
    }

    #[test]
    fn test_resolution_is_cached_per_signature() {
        let support = safe_support();
        let first = support.find_validator("int", None).unwrap();
        let second = support.find_validator("int", None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(support.cached_validators(), 1);
    }

    #[test]
    fn test_reset_clears_cache() {
        let support = safe_support();
        support.find_validator("int", None).unwrap();
        support.find_validator("long", None).unwrap();
        support.reset();
        assert_eq!(support.cached_validators(), 0);
        assert!(support.has_usable_backing_configuration());
    }

    #[test]
    fn test_validation_is_stable_across_reset() {
        let support = safe_support();
        let kinds = SimpleEnumConstantsProvider::new().with_enum("org.acme.Kind", ["A", "B"]);
        let run = |support: &ConverterRuntimeSupport<SafeBacking>| {
            let mut diags: Vec<Diagnostic> = Vec::new();
            support.validate("1,2X,3x,4", "int[]", None, &mut diags);
            support.validate("A,c", "java.util.Set<org.acme.Kind>", Some(&kinds), &mut diags);
            support.validate("1X", "java.util.Optional<java.lang.Integer>", None, &mut diags);
            diags
        };

        let first = run(&support);
        assert_eq!(first.len(), 4);

        support.reset();
        assert_eq!(run(&support), first);
        support.reset();
        support.reset();
        assert_eq!(run(&support), first);
        assert_eq!(support.cached_validators(), 3);
    }

    #[test]
    fn test_wrappers_unwrap_to_inner_validator() {
        let support = safe_support();
        for signature in [
            "java.util.Optional<java.lang.Integer>",
            "java.util.function.Supplier<java.lang.Integer>",
            "jakarta.inject.Provider<java.lang.Integer>",
        ] {
            let diags = validate(&support, "1X", signature);
            assert_eq!(diags.len(), 1, "{signature}");
            assert_eq!(
                diags[0].message,
                "SRCFG00029: Expected an integer value, got \"1X\""
            );
        }
    }

    #[test]
    fn test_map_validates_value_type_only() {
        let support = safe_support();
        assert!(validate(&support, "abc", "java.util.Map<java.lang.Integer, java.lang.String>").is_empty());
        assert_eq!(
            validate(&support, "abc", "java.util.Map<java.lang.String, java.lang.Integer>").len(),
            1
        );
    }

    #[test]
    fn test_unknown_parameterized_types_are_unusable() {
        let support = safe_support();
        for signature in ["java.lang.Class<java.lang.Object>", "java.lang.WrongClass<int>"] {
            let validator = support.find_validator(signature, None).unwrap();
            assert!(!validator.can_validate(), "{signature}");
        }
    }

    #[test]
    fn test_malformed_signature_yields_no_diagnostics() {
        let support = safe_support();
        assert!(validate(&support, "1X", "java.util.List<int").is_empty());
    }

    #[test]
    fn test_enum_is_refreshed_before_validation() {
        let support = safe_support();
        let before = SimpleEnumConstantsProvider::new().with_enum("org.acme.Kind", ["A"]);
        let after = SimpleEnumConstantsProvider::new().with_enum("org.acme.Kind", ["A", "B"]);

        let mut diags: Vec<Diagnostic> = Vec::new();
        support.validate("b", "org.acme.Kind", Some(&before), &mut diags);
        assert_eq!(diags.len(), 1);

        diags.clear();
        support.validate("b", "org.acme.Kind", Some(&after), &mut diags);
        assert!(diags.is_empty());
    }
}
