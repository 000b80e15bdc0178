//! Value diagnostics and the collector seam callers plug into.

use serde::{Deserialize, Serialize};

/// Source tag attached to every value diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "microprofile-config";

/// Error code attached to every value diagnostic.
pub const VALUE_ERROR_CODE: &str = "value";

/// A single conversion failure inside a property value.
///
/// Offsets count characters from the start of the full value handed to
/// `validate_value`, so a failing segment of a list points at the segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable converter message.
    pub message: String,

    /// Producer tag (always [`DIAGNOSTIC_SOURCE`] for engine diagnostics).
    pub source: String,

    /// Error code (always [`VALUE_ERROR_CODE`] for engine diagnostics).
    pub code: String,

    /// First character of the offending value.
    pub start: usize,

    /// Length of the offending value, in characters.
    pub length: usize,
}

impl Diagnostic {
    /// Create a value diagnostic with the standard source and code.
    pub fn new(message: impl Into<String>, start: usize, length: usize) -> Self {
        Self {
            message: message.into(),
            source: DIAGNOSTIC_SOURCE.to_string(),
            code: VALUE_ERROR_CODE.to_string(),
            start,
            length,
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Receives diagnostics as validators produce them.
///
/// `end` is exclusive: a diagnostic covering `"1X"` at offset 0 arrives as
/// `start = 0, end = 2`.
pub trait DiagnosticsCollector {
    fn collect(&mut self, message: &str, source: &str, code: &str, start: usize, end: usize);
}

impl DiagnosticsCollector for Vec<Diagnostic> {
    fn collect(&mut self, message: &str, source: &str, code: &str, start: usize, end: usize) {
        self.push(Diagnostic {
            message: message.to_string(),
            source: source.to_string(),
            code: code.to_string(),
            start,
            length: end.saturating_sub(start),
        });
    }
}

/// Adapts a closure into a [`DiagnosticsCollector`].
pub struct CallbackCollector<F>(pub F);

impl<F> DiagnosticsCollector for CallbackCollector<F>
where
    F: FnMut(&str, &str, &str, usize, usize),
{
    fn collect(&mut self, message: &str, source: &str, code: &str, start: usize, end: usize) {
        (self.0)(message, source, code, start, end)
    }
}

/// Report a value diagnostic covering `value` at `start`.
pub(crate) fn report(collector: &mut dyn DiagnosticsCollector, message: &str, value: &str, start: usize) {
    let end = start + value.chars().count();
    collector.collect(message, DIAGNOSTIC_SOURCE, VALUE_ERROR_CODE, start, end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_collector_converts_end_to_length() {
        let mut diags: Vec<Diagnostic> = Vec::new();
        diags.collect("bad", DIAGNOSTIC_SOURCE, VALUE_ERROR_CODE, 2, 4);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].start, 2);
        assert_eq!(diags[0].length, 2);
        assert_eq!(diags[0].end(), 4);
    }

    #[test]
    fn test_report_counts_characters() {
        let mut diags: Vec<Diagnostic> = Vec::new();
        report(&mut diags, "bad", "ñé", 3);
        assert_eq!(diags[0], Diagnostic::new("bad", 3, 2));
    }

    #[test]
    fn test_callback_collector_forwards_all_fields() {
        let mut seen = Vec::new();
        {
            let mut collector = CallbackCollector(|m: &str, s: &str, c: &str, start: usize, end: usize| {
                seen.push((m.to_string(), s.to_string(), c.to_string(), start, end));
            });
            report(&mut collector, "boom", "1X", 0);
        }
        assert_eq!(
            seen,
            vec![(
                "boom".to_string(),
                "microprofile-config".to_string(),
                "value".to_string(),
                0,
                2
            )]
        );
    }
}
