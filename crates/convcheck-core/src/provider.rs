//! Capability-keyed registry of runtime supports.
//!
//! Each support serves one [`Capability`] for one [`ExecutionMode`]. The
//! runtime registers injected providers first and its built-in supports
//! last, so a built-in always wins its `(capability, mode)` slot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::converter::SharedValidator;
use crate::diagnostic::DiagnosticsCollector;
use crate::enums::EnumConstantsProvider;
use crate::mode::ExecutionMode;
use crate::runtime::TypeResolver;

/// What a runtime support does for the project.
///
/// `Custom(String)` is an escape hatch for supports outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ConverterValidation,
    Custom(String),
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ConverterValidation => write!(f, "converter_validation"),
            Capability::Custom(s) => write!(f, "custom({s})"),
        }
    }
}

/// A per-mode, per-capability service owned by the project runtime.
pub trait RuntimeSupport: Send + Sync {
    fn capability(&self) -> Capability;

    fn mode(&self) -> ExecutionMode;

    /// Forget everything derived from the previous artifact set.
    fn reset(&self);

    /// The converter-validation view of this support, if it has one.
    fn as_converter_support(&self) -> Option<&dyn ConverterSupport> {
        None
    }
}

/// Converter validation entry points of a support.
pub trait ConverterSupport: Send + Sync {
    /// Validate `value` against `signature`. Never fails; problems with the
    /// signature or the configuration degrade to "no diagnostics".
    fn validate(
        &self,
        value: &str,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
        collector: &mut dyn DiagnosticsCollector,
    );

    /// Resolved (possibly cached) validator for `signature`, or `None` when
    /// this mode has no usable backing configuration.
    fn find_validator(
        &self,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
    ) -> Option<SharedValidator>;

    /// Lazily construct the backing configuration and report success.
    fn has_usable_backing_configuration(&self) -> bool;
}

/// Source of additional supports, injected when the runtime is built.
pub trait RuntimeSupportProvider: Send + Sync {
    fn capability(&self) -> Capability;

    fn create(&self, types: &TypeResolver) -> Vec<Arc<dyn RuntimeSupport>>;
}

/// `(capability, mode) -> support`.
#[derive(Default)]
pub struct SupportRegistry {
    supports: HashMap<(Capability, ExecutionMode), Arc<dyn RuntimeSupport>>,
}

impl SupportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `support` under its own capability and mode, returning the
    /// support it replaced.
    pub fn register(&mut self, support: Arc<dyn RuntimeSupport>) -> Option<Arc<dyn RuntimeSupport>> {
        let key = (support.capability(), support.mode());
        self.supports.insert(key, support)
    }

    /// Register every support `provider` creates whose capability matches
    /// the provider's declared one. Returns how many were registered.
    pub fn register_provider(&mut self, provider: &dyn RuntimeSupportProvider, types: &TypeResolver) -> usize {
        let declared = provider.capability();
        let mut registered = 0;
        for support in provider.create(types) {
            if support.capability() != declared {
                tracing::debug!(
                    declared = %declared,
                    actual = %support.capability(),
                    "ignoring support with undeclared capability"
                );
                continue;
            }
            self.register(support);
            registered += 1;
        }
        registered
    }

    pub fn get(&self, capability: &Capability, mode: ExecutionMode) -> Option<Arc<dyn RuntimeSupport>> {
        self.supports.get(&(capability.clone(), mode)).cloned()
    }

    /// Reset every registered support, in every mode.
    pub fn reset_all(&self) {
        for support in self.supports.values() {
            support.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.supports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supports.is_empty()
    }
}

impl fmt::Debug for SupportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .supports
            .keys()
            .map(|(capability, mode)| format!("{capability}/{mode}"))
            .collect();
        keys.sort();
        f.debug_struct("SupportRegistry").field("supports", &keys).finish()
    }
}
