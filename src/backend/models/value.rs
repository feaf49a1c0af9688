//! Options structures handed to the compiler by plotting components.

use indexmap::IndexMap;

use super::descriptor::FunctionDescriptor;
use super::expr::{Expr, Ident, Literal};

/// Ordered key → value mapping. Iteration order is insertion order and
/// determines binding emission order.
pub type OptionsMap = IndexMap<String, OptionValue>;

/// A value in an options structure
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Number(f64),
    Bool(bool),
    Str(String),
    List(Vec<OptionValue>),
    /// Nested options structure
    Map(OptionsMap),
    /// Code already native to the rendering target, including bare names
    /// and compiled replacement references
    Code(Expr),
    /// A function awaiting compilation
    Function(FunctionDescriptor),
}

impl OptionValue {
    /// A bare name referring to target-native code
    pub fn native(name: impl Into<String>) -> Self {
        OptionValue::Code(Expr::Ident(Ident::new(name)))
    }

    /// Short type name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            OptionValue::Number(_) => "number",
            OptionValue::Bool(_) => "bool",
            OptionValue::Str(_) => "string",
            OptionValue::List(_) => "list",
            OptionValue::Map(_) => "map",
            OptionValue::Code(_) => "code",
            OptionValue::Function(_) => "function",
        }
    }

    /// Convert to an expression. Returns the path of the first uncompiled
    /// function found, if any.
    pub fn to_expr(&self) -> Result<Expr, String> {
        match self {
            OptionValue::Number(n) => Ok(Expr::Literal(Literal::Number(*n))),
            OptionValue::Bool(b) => Ok(Expr::Literal(Literal::Bool(*b))),
            OptionValue::Str(s) => Ok(Expr::Literal(Literal::Str(s.clone()))),
            OptionValue::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| item.to_expr().map_err(|path| format!("[{}]{}", i, path)))
                .collect::<Result<Vec<_>, _>>()
                .map(Expr::Array),
            OptionValue::Map(map) => options_to_expr(map),
            OptionValue::Code(expr) => Ok(expr.clone()),
            OptionValue::Function(_) => Err(String::new()),
        }
    }
}

/// Convert an options map into an `Expr::Object`, keys in map order
pub fn options_to_expr(map: &OptionsMap) -> Result<Expr, String> {
    map.iter()
        .map(|(key, value)| {
            value
                .to_expr()
                .map(|expr| (key.clone(), expr))
                .map_err(|path| format!(".{}{}", key, path))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Expr::Object)
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Number(n)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<OptionsMap> for OptionValue {
    fn from(map: OptionsMap) -> Self {
        OptionValue::Map(map)
    }
}

impl From<FunctionDescriptor> for OptionValue {
    fn from(descriptor: FunctionDescriptor) -> Self {
        OptionValue::Function(descriptor)
    }
}
