//! Runtime values of the reference substrate.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::backend::models::{Callable, Expr, Ident, Pattern};

use super::error::{EvalError, EvalResult};

/// Lexical scope. Each `Let` binding and each call pushes a new frame.
#[derive(Debug, Default)]
pub struct Scope {
    pub(super) vars: HashMap<Ident, Value>,
    pub(super) parent: Option<Arc<Scope>>,
}

impl Scope {
    pub(super) fn child(parent: Arc<Scope>) -> Self {
        Scope {
            vars: HashMap::new(),
            parent: Some(parent),
        }
    }

    pub(super) fn lookup(&self, name: &Ident) -> Option<&Value> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.vars.get(name) {
                return Some(value);
            }
            scope = scope.parent.as_deref()?;
        }
    }
}

/// A function literal closed over its defining scope
#[derive(Debug)]
pub struct Closure {
    pub params: Vec<Pattern>,
    pub body: Expr,
    pub(super) scope: Arc<Scope>,
}

/// A callable runtime value
#[derive(Debug, Clone)]
pub enum Function {
    Closure(Arc<Closure>),
    Host(Callable),
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Function::Closure(a), Function::Closure(b)) => Arc::ptr_eq(a, b),
            (Function::Host(a), Function::Host(b)) => a == b,
            _ => false,
        }
    }
}

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    Null,
    Vector(Vec<Value>),
    Object(Vec<(String, Value)>),
    Function(Function),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Null => "null",
            Value::Vector(_) => "vector",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn as_number(&self) -> EvalResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(EvalError::TypeMismatch {
                expected: "number",
                got: other.kind(),
            }),
        }
    }

    pub fn as_vector(&self) -> EvalResult<&[Value]> {
        match self {
            Value::Vector(items) => Ok(items),
            other => Err(EvalError::TypeMismatch {
                expected: "vector",
                got: other.kind(),
            }),
        }
    }

    /// Look up a field of an object value
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn point(coords: &[f64]) -> Value {
        Value::Vector(coords.iter().copied().map(Value::Number).collect())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Null => write!(f, "null"),
            Value::Vector(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Function(Function::Host(c)) => write!(f, "<host {}>", c.name()),
            Value::Function(Function::Closure(_)) => write!(f, "<closure>"),
        }
    }
}
