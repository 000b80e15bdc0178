//! SAFE mode: leaf validation against the embedded baseline only.

use std::sync::Arc;

use super::baseline::Baseline;
use super::support::BackingConfiguration;
use super::{run_converter, Converter, ConverterValidator, SharedValidator};
use crate::diagnostic::DiagnosticsCollector;
use crate::loader::ArtifactLoader;
use crate::mode::ExecutionMode;

/// Leaf validator over a baseline converter.
#[derive(Debug)]
pub struct SafeValidator {
    type_name: String,
    converter: Option<Arc<dyn Converter>>,
}

impl SafeValidator {
    pub fn new(type_name: impl Into<String>, converter: Option<Arc<dyn Converter>>) -> Self {
        Self {
            type_name: type_name.into(),
            converter,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl ConverterValidator for SafeValidator {
    fn can_validate(&self) -> bool {
        self.converter.is_some()
    }

    fn validate(&self, value: &str, start: usize, collector: &mut dyn DiagnosticsCollector) {
        if let Some(converter) = &self.converter {
            run_converter(converter.as_ref(), value, start, collector);
        }
    }

    fn converter_name(&self) -> Option<String> {
        self.converter.as_ref().map(|c| c.name().to_string())
    }
}

/// Backing configuration for SAFE mode. Never reads project artifacts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SafeBacking;

impl BackingConfiguration for SafeBacking {
    type Config = Baseline;

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Safe
    }

    fn load(&self, _loader: &ArtifactLoader) -> Option<Arc<Baseline>> {
        Some(Arc::new(Baseline::standard()))
    }

    fn leaf_validator(&self, config: &Baseline, type_name: &str) -> SharedValidator {
        Arc::new(SafeValidator::new(type_name, config.get(type_name)))
    }
}
