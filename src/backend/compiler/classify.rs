//! Decides which option values need compilation.
//!
//! Names and other code already native to the rendering target pass through
//! untouched, as does plain data. Only function descriptors are compiled.

use crate::backend::models::{Callable, Expr, FunctionDescriptor, OptionValue, ParametrizedDescriptor};

use super::error::{CompileError, CompileResult};

/// How the compiler treats an option value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification<'a> {
    /// Target-native code, e.g. a bare name
    Native(&'a Expr),
    Plain(&'a Callable),
    Parametrized(&'a ParametrizedDescriptor),
    /// Numbers, strings, lists, maps
    Data,
}

impl Classification<'_> {
    pub fn is_compilable(&self) -> bool {
        matches!(self, Classification::Plain(_) | Classification::Parametrized(_))
    }
}

pub fn classify(value: &OptionValue) -> Classification<'_> {
    match value {
        OptionValue::Function(FunctionDescriptor::Plain(callable)) => Classification::Plain(callable),
        OptionValue::Function(FunctionDescriptor::Parametrized(descriptor)) => {
            Classification::Parametrized(descriptor)
        }
        OptionValue::Code(expr) => Classification::Native(expr),
        OptionValue::Number(_)
        | OptionValue::Bool(_)
        | OptionValue::Str(_)
        | OptionValue::List(_)
        | OptionValue::Map(_) => Classification::Data,
    }
}

/// True for plain callables and parametrized descriptors
pub fn is_compilable(value: &OptionValue) -> bool {
    classify(value).is_compilable()
}

/// True for a nested options structure
pub fn is_options_map(value: &OptionValue) -> bool {
    matches!(value, OptionValue::Map(_))
}

/// Reject parametrized descriptors whose fields cannot fit together
pub fn check_descriptor(key: &str, descriptor: &ParametrizedDescriptor) -> CompileResult<()> {
    let malformed = |reason: String| CompileError::MalformedDescriptor {
        key: key.to_string(),
        reason,
    };

    if descriptor.point_arity().is_none() {
        return Err(malformed(format!(
            "base {} takes {} arguments but {} params are declared",
            descriptor.base().name(),
            descriptor.base().arity(),
            descriptor.params().len()
        )));
    }
    if let Some(empty) = descriptor.params().iter().position(|p| p.name().is_empty()) {
        return Err(malformed(format!("param {} has an empty name", empty)));
    }
    if descriptor.store().name().is_empty() {
        return Err(malformed("store has an empty name".to_string()));
    }
    Ok(())
}
