//! Project converters declared by converter symbols.

use regex::Regex;

use super::{ConversionError, Converter};
use crate::error::RuntimeError;
use crate::loader::{ConverterDeclaration, ConverterRule};

#[derive(Debug)]
enum CompiledRule {
    Pattern { source: String, regex: Regex },
    OneOf(Vec<String>),
    IntRange { min: i64, max: i64 },
}

/// A converter implemented by a project symbol's declaration.
#[derive(Debug)]
pub struct DeclaredConverter {
    name: String,
    target: String,
    rule: CompiledRule,
    message: Option<String>,
}

impl DeclaredConverter {
    /// Validate and compile the declaration carried by `symbol`.
    pub fn compile(symbol: &str, declaration: &ConverterDeclaration) -> Result<Self, RuntimeError> {
        let invalid = |reason: String| RuntimeError::ConverterDeclaration {
            symbol: symbol.to_string(),
            reason,
        };
        if declaration.target.trim().is_empty() {
            return Err(invalid("target type must not be empty".to_string()));
        }

        let rule = match &declaration.rule {
            ConverterRule::Pattern { regex } => CompiledRule::Pattern {
                source: regex.clone(),
                regex: Regex::new(&format!("^(?:{regex})$"))
                    .map_err(|e| invalid(format!("invalid pattern: {e}")))?,
            },
            ConverterRule::OneOf { values } if values.is_empty() => {
                return Err(invalid("one_of needs at least one value".to_string()))
            }
            ConverterRule::OneOf { values } => CompiledRule::OneOf(values.clone()),
            ConverterRule::IntRange { min, max } if min > max => {
                return Err(invalid(format!("empty range [{min}, {max}]")))
            }
            ConverterRule::IntRange { min, max } => CompiledRule::IntRange {
                min: *min,
                max: *max,
            },
        };

        Ok(Self {
            name: symbol.to_string(),
            target: declaration.target.clone(),
            rule,
            message: declaration.message.clone(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn reject(&self, value: &str, default: String) -> ConversionError {
        let message = match &self.message {
            Some(template) => template.replace("{value}", value),
            None => default,
        };
        ConversionError::rejected(message)
    }
}

impl Converter for DeclaredConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&self, value: &str) -> Result<(), ConversionError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        match &self.rule {
            CompiledRule::Pattern { source, regex } => {
                if regex.is_match(value) {
                    Ok(())
                } else {
                    Err(self.reject(
                        value,
                        format!("Value \"{value}\" does not match pattern {source}"),
                    ))
                }
            }
            CompiledRule::OneOf(values) => {
                if values.iter().any(|v| v == value) {
                    Ok(())
                } else {
                    Err(self.reject(
                        value,
                        format!("Value \"{value}\" is not one of: {}", values.join(",")),
                    ))
                }
            }
            CompiledRule::IntRange { min, max } => match value.parse::<i64>() {
                Err(_) => Err(self.reject(value, format!("For input string: \"{value}\""))),
                Ok(n) if n < *min || n > *max => Err(self.reject(
                    value,
                    format!("Value {value} is out of range [{min}, {max}]"),
                )),
                Ok(_) => Ok(()),
            },
        }
    }
}
