//! Evaluation errors for the reference substrate.

use std::fmt;

/// Error raised while evaluating an emitted expression
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Identifier not bound in any enclosing scope
    UnboundIdentifier(String),
    /// Attempted to call a value that is not a function
    NotCallable(&'static str),
    /// Wrong number of arguments
    ArityMismatch {
        callee: String,
        expected: usize,
        got: usize,
    },
    /// Value of the wrong kind
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },
    /// Vector access past the end
    IndexOutOfBounds { index: usize, len: usize },
    /// Store has no value for the parameter
    MissingParam { store: String, param: String },
    /// Error reported by a host callable
    Host(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundIdentifier(name) => write!(f, "Unbound identifier: {}", name),
            Self::NotCallable(kind) => write!(f, "Value of type {} is not callable", kind),
            Self::ArityMismatch {
                callee,
                expected,
                got,
            } => write!(
                f,
                "Invalid arity for {}: expected {}, got {}",
                callee, expected, got
            ),
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "Index {} out of bounds for vector of length {}", index, len)
            }
            Self::MissingParam { store, param } => {
                write!(f, "Store {} has no value for parameter {}", store, param)
            }
            Self::Host(msg) => write!(f, "Host error: {}", msg),
        }
    }
}

impl std::error::Error for EvalError {}

/// Result type for evaluation
pub type EvalResult<T> = Result<T, EvalError>;
