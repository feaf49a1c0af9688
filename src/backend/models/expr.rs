//! Target-independent expression tree.
//!
//! Every compiler phase produces and consumes `Expr` values. Nothing in this
//! module knows the concrete syntax of the rendering target; text is produced
//! only by `backend::render` at the final emission step.

use std::fmt;

use super::descriptor::{Callable, ParamRef};
use super::store::ReactiveStore;

/// An identifier in the emitted scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Ident(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new(name)
    }
}

/// A literal constant
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Bool(bool),
    Str(String),
    Null,
}

/// Parameter pattern of a function literal
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Binds the whole argument
    Ident(Ident),
    /// Destructures a vector argument positionally
    Vector(Vec<Ident>),
}

impl Pattern {
    /// Identifiers introduced by this pattern
    pub fn idents(&self) -> impl Iterator<Item = &Ident> {
        match self {
            Pattern::Ident(id) => std::slice::from_ref(id).iter(),
            Pattern::Vector(ids) => ids.iter(),
        }
    }
}

/// A compiled binding: `(identifier, compiled expression)`
pub type Binding = (Ident, Expr);

/// Expression tree emitted by the compiler
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Scoped binding form. Bindings are evaluated left to right; each is
    /// visible to the bindings after it and to `body`.
    Let {
        bindings: Vec<Binding>,
        body: Box<Expr>,
    },
    /// Function literal
    Lambda {
        params: Vec<Pattern>,
        body: Box<Expr>,
    },
    /// Function application
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Reference to a name in scope (or to target-native code)
    Ident(Ident),
    Literal(Literal),
    Array(Vec<Expr>),
    /// Record literal with ordered keys
    Object(Vec<(String, Expr)>),
    /// Positional element access
    Index {
        target: Box<Expr>,
        index: usize,
    },
    /// Reads the current value of `param` from `store` each time it is evaluated
    StoreRead {
        store: ReactiveStore,
        param: ParamRef,
    },
    /// Reference to a host callable exposed to the rendering substrate by name
    Host(Callable),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Ident::new(name))
    }

    pub fn number(n: f64) -> Self {
        Expr::Literal(Literal::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::Str(s.into()))
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn lambda(params: Vec<Pattern>, body: Expr) -> Self {
        Expr::Lambda {
            params,
            body: Box::new(body),
        }
    }

    pub fn index(target: Expr, index: usize) -> Self {
        Expr::Index {
            target: Box::new(target),
            index,
        }
    }

    /// Number of declared parameters if this is a function literal
    pub fn lambda_arity(&self) -> Option<usize> {
        match self {
            Expr::Lambda { params, .. } => Some(params.len()),
            _ => None,
        }
    }

    /// Returns true for a scoped binding form
    pub fn is_let(&self) -> bool {
        matches!(self, Expr::Let { .. })
    }
}

impl From<Ident> for Expr {
    fn from(id: Ident) -> Self {
        Expr::Ident(id)
    }
}
