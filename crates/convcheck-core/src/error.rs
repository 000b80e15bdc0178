//! Error taxonomy for the conversion engine.
//!
//! None of these ever reach a caller of `validate_value`: the runtime logs
//! them and degrades to "no diagnostics". They surface from lower-level
//! entry points (parsing, artifact access, settings) where callers want them.

use std::path::PathBuf;

/// Structural failures while parsing a type signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeSignatureError {
    #[error("type signature must not be empty")]
    Empty,

    #[error("expected a type name at position {position} in: {signature}")]
    MissingName { position: usize, signature: String },

    #[error("expected '{expected}' at position {position} in: {signature}")]
    Expected {
        expected: char,
        position: usize,
        signature: String,
    },

    #[error("unexpected character '{found}' at position {position} in: {signature}")]
    Unexpected {
        found: char,
        position: usize,
        signature: String,
    },

    #[error("type signature nests deeper than {limit} levels: {signature}")]
    TooDeep { limit: usize, signature: String },
}

/// Failures reading project artifacts.
///
/// A symbol that simply is not there is not an error; lookups return `None`.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed symbol descriptor {path}: {source}")]
    MalformedSymbol {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("symbol descriptor {path} declares {found}, expected {expected}")]
    NameMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("malformed archive {path}: {reason}")]
    MalformedArchive { path: PathBuf, reason: String },

    #[error("resource {0} is no longer available")]
    ResourceGone(String),
}

/// Engine-level errors.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("invalid type signature: {0}")]
    Signature(#[from] TypeSignatureError),

    #[error("artifact error: {0}")]
    Loader(#[from] LoaderError),

    #[error("invalid execution mode value: {0}")]
    InvalidExecutionMode(i64),

    #[error("config provider resolver {name} failed: {reason}")]
    Resolver { name: String, reason: String },

    #[error("invalid converter declaration on {symbol}: {reason}")]
    ConverterDeclaration { symbol: String, reason: String },

    #[error("cannot load settings from {path}: {reason}")]
    Settings { path: PathBuf, reason: String },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_error_display() {
        let err = TypeSignatureError::Expected {
            expected: '>',
            position: 14,
            signature: "java.util.List<int".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "expected '>' at position 14 in: java.util.List<int"
        );
    }

    #[test]
    fn test_runtime_error_wraps_signature_error() {
        let err: RuntimeError = TypeSignatureError::Empty.into();
        assert!(err.to_string().contains("invalid type signature"));
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_invalid_mode_error() {
        let err = RuntimeError::InvalidExecutionMode(7);
        assert_eq!(err.to_string(), "invalid execution mode value: 7");
    }
}
