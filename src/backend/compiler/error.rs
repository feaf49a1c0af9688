//! Compiler error types for the function compiler.
//!
//! Every error here is raised while the pipeline is being constructed.
//! Failures while a compiled artifact runs belong to the rendering substrate.

/// Compiler error types
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Descriptor is shaped like a parametrized descriptor but its fields do not fit
    MalformedDescriptor { key: String, reason: String },
    /// Callable arity does not match the requested compilation arity
    ArityMismatch {
        callable: String,
        expected: usize,
        got: usize,
    },
    /// Two bindings in one pass received the same identifier.
    /// This is an internal invariant violation, not a user error.
    NameCollision(String),
    /// Key not present in the options map
    UnknownKey(String),
    /// An options map still holds an uncompiled function at this path
    Uncompiled(String),
    /// Dimension other than 1 or 2
    InvalidDimension(usize),
    /// Name prefix that does not start a valid identifier
    InvalidPrefix(String),
    /// Options manifest could not be read
    Manifest(String),
}

impl CompileError {
    /// True for errors that indicate a bug in the compiler itself
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::NameCollision(_))
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedDescriptor { key, reason } => {
                write!(f, "Malformed descriptor at {}: {}", key, reason)
            }
            Self::ArityMismatch {
                callable,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Invalid arity for {}: expected {}, got {}",
                    callable, expected, got
                )
            }
            Self::NameCollision(name) => {
                write!(f, "Internal error: identifier {} issued twice", name)
            }
            Self::UnknownKey(key) => write!(f, "Unknown options key: {}", key),
            Self::Uncompiled(path) => write!(f, "Uncompiled function at {}", path),
            Self::InvalidDimension(d) => write!(f, "Invalid dimension {} (expected 1 or 2)", d),
            Self::InvalidPrefix(prefix) => write!(f, "Invalid identifier prefix {:?}", prefix),
            Self::Manifest(msg) => write!(f, "Invalid options manifest: {}", msg),
        }
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;
