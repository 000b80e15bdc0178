//! Enum validation with hyphenation-insensitive matching.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::ConverterValidator;
use crate::diagnostic::{report, DiagnosticsCollector};
use crate::enums::EnumConstantsProvider;
use crate::signature::EnumType;

/// Canonical hyphenated form: `WEB_APP`, `webApp` and `web-app` all become `web-app`.
///
/// Words break on `_` and `-`, on a lower-to-upper case change, and before
/// the last capital of an acronym followed by lowercase (`HTTPServer`).
pub fn hyphenate(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len() + 4);
    let mut pending_break = false;

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            pending_break = true;
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                pending_break = true;
            }
        }
        if pending_break && !out.is_empty() {
            out.push('-');
        }
        pending_break = false;
        out.extend(c.to_lowercase());
    }
    out
}

#[derive(Debug)]
struct ConstantTable {
    /// Constants as last fetched, for change detection.
    constants: Vec<String>,
    /// Hyphenated constants, first occurrence order, deduplicated.
    allowed: Vec<String>,
    lookup: HashMap<String, String>,
}

impl ConstantTable {
    fn build(constants: Vec<String>) -> Self {
        let mut allowed = Vec::with_capacity(constants.len());
        let mut lookup = HashMap::with_capacity(constants.len());
        for constant in &constants {
            let key = hyphenate(constant);
            if !lookup.contains_key(&key) {
                allowed.push(key.clone());
                lookup.insert(key, constant.clone());
            }
        }
        Self {
            constants,
            allowed,
            lookup,
        }
    }
}

/// Validates values against an enum's constants.
///
/// The constant table is the one piece of validator state that can change
/// after construction, through [`ConverterValidator::refresh_enum_type`].
#[derive(Debug)]
pub struct EnumValidator {
    type_name: String,
    table: RwLock<ConstantTable>,
}

impl EnumValidator {
    pub fn new(enum_type: &EnumType) -> Self {
        Self {
            type_name: enum_type.name.clone(),
            table: RwLock::new(ConstantTable::build(enum_type.constants.clone())),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Hyphenated constants, in the order they are listed in diagnostics.
    pub fn allowed_values(&self) -> Vec<String> {
        self.table.read().allowed.clone()
    }

    /// Original constant matching `value`, if any.
    pub fn matching_constant(&self, value: &str) -> Option<String> {
        self.table.read().lookup.get(&hyphenate(value.trim())).cloned()
    }
}

impl ConverterValidator for EnumValidator {
    fn can_validate(&self) -> bool {
        true
    }

    fn validate(&self, value: &str, start: usize, collector: &mut dyn DiagnosticsCollector) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        let table = self.table.read();
        if table.lookup.contains_key(&hyphenate(trimmed)) {
            return;
        }
        let message = format!(
            "SRCFG00049: Cannot convert {value} to enum class {}, allowed values: {}",
            self.type_name,
            table.allowed.join(",")
        );
        drop(table);
        report(collector, &message, value, start);
    }

    fn refresh_enum_type(&self, provider: &dyn EnumConstantsProvider) {
        // An unknown type keeps the current constants.
        let Some(constants) = provider.constants(&self.type_name) else {
            return;
        };
        if self.table.read().constants == constants {
            return;
        }
        let mut table = self.table.write();
        if table.constants != constants {
            *table = ConstantTable::build(constants);
        }
    }

    fn converter_simple_name(&self) -> Option<String> {
        Some("EnumConverter".to_string())
    }
}
