//! Trust modes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RuntimeError;

/// How much of the host project the engine is allowed to touch.
///
/// `Safe` never reads project artifacts and only runs the embedded baseline
/// converters. `Full` may load project artifacts and use the project's own
/// configuration provider. `Safe` is the default everywhere a mode is
/// missing or unrecognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExecutionMode {
    #[default]
    Safe,
    Full,
}

impl ExecutionMode {
    /// Both modes, in registration order.
    pub const ALL: [ExecutionMode; 2] = [ExecutionMode::Safe, ExecutionMode::Full];

    /// Numeric value used by editor clients (1 = safe, 2 = full).
    pub fn value(self) -> i64 {
        match self {
            ExecutionMode::Safe => 1,
            ExecutionMode::Full => 2,
        }
    }

    /// Strict numeric lookup.
    pub fn for_value(value: i64) -> Result<Self, RuntimeError> {
        match value {
            1 => Ok(ExecutionMode::Safe),
            2 => Ok(ExecutionMode::Full),
            other => Err(RuntimeError::InvalidExecutionMode(other)),
        }
    }

    /// Lenient name lookup: case-insensitive, `Safe` when absent or unknown.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(n) if n.eq_ignore_ascii_case("full") => ExecutionMode::Full,
            _ => ExecutionMode::Safe,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Safe => "safe",
            ExecutionMode::Full => "full",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExecutionMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Accepts either a name (lenient) or a number (strict).
impl<'de> Deserialize<'de> for ExecutionMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => ExecutionMode::for_value(n).map_err(serde::de::Error::custom),
            Raw::Name(s) => Ok(ExecutionMode::from_name(Some(&s))),
        }
    }
}
