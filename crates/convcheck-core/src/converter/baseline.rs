//! Embedded baseline converters for platform types.
//!
//! Messages follow SmallRye Config (`SRCFG000xx`) and the JDK number
//! parsers, so diagnostics read the same as the runtime failure would.
//! Every converter trims its input and accepts the empty string.

use std::collections::HashMap;
use std::sync::Arc;

use super::{ConversionError, Converter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuiltinKind {
    Integer,
    Long,
    Double,
    Float,
    Character,
    Byte,
    Short,
    Boolean,
    Text,
    BigInteger,
    BigDecimal,
    Uuid,
    Pattern,
}

impl BuiltinKind {
    fn converter_name(self) -> &'static str {
        match self {
            BuiltinKind::Integer => "baseline.IntegerConverter",
            BuiltinKind::Long => "baseline.LongConverter",
            BuiltinKind::Double => "baseline.DoubleConverter",
            BuiltinKind::Float => "baseline.FloatConverter",
            BuiltinKind::Character => "baseline.CharacterConverter",
            BuiltinKind::Byte => "baseline.ByteConverter",
            BuiltinKind::Short => "baseline.ShortConverter",
            BuiltinKind::Boolean => "baseline.BooleanConverter",
            BuiltinKind::Text => "baseline.StringConverter",
            BuiltinKind::BigInteger => "baseline.BigIntegerConverter",
            BuiltinKind::BigDecimal => "baseline.BigDecimalConverter",
            BuiltinKind::Uuid => "baseline.UuidConverter",
            BuiltinKind::Pattern => "baseline.PatternConverter",
        }
    }
}

const TABLE: &[(&str, BuiltinKind)] = &[
    ("int", BuiltinKind::Integer),
    ("java.lang.Integer", BuiltinKind::Integer),
    ("java.util.OptionalInt", BuiltinKind::Integer),
    ("long", BuiltinKind::Long),
    ("java.lang.Long", BuiltinKind::Long),
    ("java.util.OptionalLong", BuiltinKind::Long),
    ("double", BuiltinKind::Double),
    ("java.lang.Double", BuiltinKind::Double),
    ("java.util.OptionalDouble", BuiltinKind::Double),
    ("float", BuiltinKind::Float),
    ("java.lang.Float", BuiltinKind::Float),
    ("char", BuiltinKind::Character),
    ("java.lang.Character", BuiltinKind::Character),
    ("byte", BuiltinKind::Byte),
    ("java.lang.Byte", BuiltinKind::Byte),
    ("short", BuiltinKind::Short),
    ("java.lang.Short", BuiltinKind::Short),
    ("boolean", BuiltinKind::Boolean),
    ("java.lang.Boolean", BuiltinKind::Boolean),
    ("java.lang.String", BuiltinKind::Text),
    ("java.lang.CharSequence", BuiltinKind::Text),
    ("java.math.BigInteger", BuiltinKind::BigInteger),
    ("java.math.BigDecimal", BuiltinKind::BigDecimal),
    ("java.util.UUID", BuiltinKind::Uuid),
    ("java.util.regex.Pattern", BuiltinKind::Pattern),
];

/// One embedded converter.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinConverter {
    kind: BuiltinKind,
}

impl Converter for BuiltinConverter {
    fn name(&self) -> &str {
        self.kind.converter_name()
    }

    fn convert(&self, value: &str) -> Result<(), ConversionError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        match self.kind {
            BuiltinKind::Integer => value.parse::<i32>().map(drop).map_err(|_| {
                ConversionError::rejected(format!(
                    "SRCFG00029: Expected an integer value, got \"{value}\""
                ))
            }),
            BuiltinKind::Long => value.parse::<i64>().map(drop).map_err(|_| {
                ConversionError::rejected(format!(
                    "SRCFG00030: Expected a long value, got \"{value}\""
                ))
            }),
            BuiltinKind::Double => check(
                is_java_floating(value),
                || format!("SRCFG00031: Expected a double value, got \"{value}\""),
            ),
            BuiltinKind::Float => check(
                is_java_floating(value),
                || format!("SRCFG00032: Expected a float value, got \"{value}\""),
            ),
            BuiltinKind::Character => check(
                value.chars().count() == 1,
                || format!("SRCFG00033: Expected a char value, got \"{value}\""),
            ),
            BuiltinKind::Byte => parse_bounded(value, i8::MIN.into(), i8::MAX.into()),
            BuiltinKind::Short => parse_bounded(value, i16::MIN.into(), i16::MAX.into()),
            BuiltinKind::Boolean | BuiltinKind::Text => Ok(()),
            BuiltinKind::BigInteger => check(
                is_integer_literal(value),
                || format!("For input string: \"{value}\""),
            ),
            BuiltinKind::BigDecimal => check_big_decimal(value).map_err(ConversionError::rejected),
            BuiltinKind::Uuid => check(
                uuid::Uuid::parse_str(value).is_ok(),
                || format!("SRCFG00026: {value} cannot be converted into a UUID"),
            ),
            BuiltinKind::Pattern => check_pattern(value),
        }
    }
}

/// The embedded baseline configuration: converters keyed by type name.
#[derive(Debug, Clone)]
pub struct Baseline {
    converters: HashMap<&'static str, Arc<dyn Converter>>,
}

impl Baseline {
    pub fn standard() -> Self {
        let converters = TABLE
            .iter()
            .map(|(name, kind)| {
                let converter: Arc<dyn Converter> = Arc::new(BuiltinConverter { kind: *kind });
                (*name, converter)
            })
            .collect();
        Self { converters }
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<dyn Converter>> {
        self.converters.get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.converters.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.converters.keys().copied()
    }
}

fn check(ok: bool, message: impl FnOnce() -> String) -> Result<(), ConversionError> {
    if ok {
        Ok(())
    } else {
        Err(ConversionError::rejected(message()))
    }
}

/// Backreferences and lookaround compile. Variable-width lookbehind is
/// accepted without a bound check.
fn check_pattern(value: &str) -> Result<(), ConversionError> {
    use fancy_regex::{CompileError, Error};

    match fancy_regex::Regex::new(value) {
        Ok(_) | Err(Error::CompileError(CompileError::LookBehindNotConst)) => Ok(()),
        Err(e) => Err(ConversionError::rejected(e.to_string())),
    }
}

fn strip_sign(value: &str) -> &str {
    value
        .strip_prefix('+')
        .or_else(|| value.strip_prefix('-'))
        .unwrap_or(value)
}

/// Accepts what `Double.valueOf` accepts, minus hexadecimal literals.
fn is_java_floating(value: &str) -> bool {
    let unsigned = strip_sign(value);
    if unsigned == "NaN" || unsigned == "Infinity" {
        return true;
    }
    let body = unsigned
        .strip_suffix(|c: char| matches!(c, 'd' | 'D' | 'f' | 'F'))
        .unwrap_or(unsigned);
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && body.parse::<f64>().is_ok()
}

fn is_integer_literal(value: &str) -> bool {
    let digits = strip_sign(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// `Byte.parseByte` / `Short.parseShort` semantics.
fn parse_bounded(value: &str, min: i32, max: i32) -> Result<(), ConversionError> {
    match value.parse::<i32>() {
        Err(_) => Err(ConversionError::rejected(format!(
            "For input string: \"{value}\""
        ))),
        Ok(n) if n < min || n > max => Err(ConversionError::rejected(format!(
            "Value out of range. Value:\"{value}\" Radix:10"
        ))),
        Ok(_) => Ok(()),
    }
}

/// `new BigDecimal(String)` grammar.
fn check_big_decimal(value: &str) -> Result<(), String> {
    let body = strip_sign(value);
    let mut digits = 0usize;
    let mut seen_point = false;
    let mut exponent = None;

    for (i, c) in body.char_indices() {
        match c {
            '0'..='9' => digits += 1,
            '.' if seen_point => {
                return Err("Character array contains more than one decimal point.".to_string())
            }
            '.' => seen_point = true,
            'e' | 'E' => {
                exponent = Some(&body[i + 1..]);
                break;
            }
            other => {
                return Err(format!(
                    "Character {other} is neither a decimal digit number, decimal point, nor \"e\" notation exponential mark."
                ))
            }
        }
    }

    if digits == 0 {
        return Err("No digits found.".to_string());
    }
    if let Some(exponent) = exponent {
        let exponent_digits = strip_sign(exponent);
        if exponent_digits.is_empty() {
            return Err("No exponent digits.".to_string());
        }
        if let Some(bad) = exponent_digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(format!(
                "Character {bad} is neither a decimal digit number, decimal point, nor \"e\" notation exponential mark."
            ));
        }
    }
    Ok(())
}
