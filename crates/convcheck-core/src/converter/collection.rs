//! Comma-separated values for lists, sets and arrays.

use super::{ConverterValidator, SharedValidator};
use crate::diagnostic::DiagnosticsCollector;
use crate::enums::EnumConstantsProvider;

const DELIMITER: char = ',';

/// Splits a value on `,` and validates every segment with the element validator.
///
/// Segments are trimmed and their offsets shifted past the leading
/// whitespace, so a diagnostic points at the offending text itself.
/// An empty segment after the final delimiter is skipped.
#[derive(Debug)]
pub struct CollectionValidator {
    element: SharedValidator,
}

impl CollectionValidator {
    pub fn new(element: SharedValidator) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &SharedValidator {
        &self.element
    }
}

impl ConverterValidator for CollectionValidator {
    fn can_validate(&self) -> bool {
        self.element.can_validate()
    }

    fn validate(&self, value: &str, start: usize, collector: &mut dyn DiagnosticsCollector) {
        let mut offset = start;
        let mut segments = value.split(DELIMITER).peekable();
        while let Some(segment) = segments.next() {
            let is_last = segments.peek().is_none();
            if !(is_last && segment.is_empty()) {
                let leading = segment.len() - segment.trim_start().len();
                let skipped = segment[..leading].chars().count();
                self.element
                    .validate(segment.trim(), offset + skipped, collector);
            }
            offset += segment.chars().count() + 1;
        }
    }

    fn refresh_enum_type(&self, provider: &dyn EnumConstantsProvider) {
        self.element.refresh_enum_type(provider);
    }

    fn converter_name(&self) -> Option<String> {
        self.element.converter_name()
    }

    fn converter_simple_name(&self) -> Option<String> {
        self.element.converter_simple_name()
    }
}
