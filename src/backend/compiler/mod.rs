//! Function compiler for plot options.
//!
//! This module rewrites options structures whose values include function
//! descriptors. Each compilable value becomes one binding
//! `(fresh identifier, compiled body)` and the value in the map is replaced
//! by a reference to that binding. The compiler handles:
//! - Classification of option values (`classify`)
//! - Scalar/point shape adaptation (`shape`)
//! - Parametrized descriptors that read a reactive store per call (`param`)
//! - Fresh identifier generation (`names`)
//! - Wrapping bindings around a body (`scope`)

pub mod classify;
mod error;
pub mod expression;
pub mod names;
pub mod param;
pub mod scope;
pub mod shape;


use serde::Deserialize;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::backend::models::{Binding, Expr, FunctionDescriptor, OptionValue, OptionsMap};

pub use classify::{check_descriptor, classify, is_compilable, is_options_map, Classification};
pub use error::{CompileError, CompileResult};
pub use expression::{CompileRequest, ExpressionCompiler, HostCompiler, Locals, OutputMode};
pub use names::{ambient_names, NameSupply};
pub use scope::wrap;
pub use shape::{vectorize, vectorize_callable};

/// Bindings produced for one key (zero or one) and the updated map
pub type KeyOutput = (SmallVec<[Binding; 1]>, OptionsMap);

/// Per-key compile step: `FunctionCompiler::compile_1d` or `FunctionCompiler::compile_2d`
pub type CompileFn<C> = fn(&mut FunctionCompiler<C>, OptionsMap, &str) -> CompileResult<KeyOutput>;

/// Point dimensionality of the functions in an options map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum Dimension {
    #[default]
    One,
    Two,
}

impl Dimension {
    pub fn arity(self) -> usize {
        match self {
            Dimension::One => 1,
            Dimension::Two => 2,
        }
    }

    /// The per-key compile step for this dimensionality
    pub fn compile_fn<C: ExpressionCompiler>(self) -> CompileFn<C> {
        match self {
            Dimension::One => FunctionCompiler::compile_1d,
            Dimension::Two => FunctionCompiler::compile_2d,
        }
    }
}

impl TryFrom<u8> for Dimension {
    type Error = CompileError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Dimension::One),
            2 => Ok(Dimension::Two),
            other => Err(CompileError::InvalidDimension(other as usize)),
        }
    }
}

/// Function compiler
pub struct FunctionCompiler<C = HostCompiler> {
    /// Lowers callables into compiled bodies
    expressions: C,
    /// Fresh identifiers for this pass
    names: NameSupply,
    mode: OutputMode,
}

impl FunctionCompiler<HostCompiler> {
    /// Create a compiler using the reference expression compiler
    pub fn new() -> Self {
        Self::with_names(NameSupply::default())
    }

    pub fn with_names(names: NameSupply) -> Self {
        Self::with_expression_compiler(HostCompiler, names)
    }
}

impl Default for FunctionCompiler<HostCompiler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ExpressionCompiler> FunctionCompiler<C> {
    /// Create a compiler with a custom expression compiler
    pub fn with_expression_compiler(expressions: C, mut names: NameSupply) -> Self {
        names.reserve(expression::LOCAL_NAMES);
        Self {
            expressions,
            names,
            mode: OutputMode::default(),
        }
    }

    /// Set the output mode requested from the expression compiler
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn names(&self) -> &NameSupply {
        &self.names
    }

    /// Mark names visible around the emitted snippet as unavailable
    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.reserve(names);
    }

    /// Compile the value at `key` as a function of a scalar
    pub fn compile_1d(&mut self, options: OptionsMap, key: &str) -> CompileResult<KeyOutput> {
        self.compile_key(options, key, Dimension::One)
    }

    /// Compile the value at `key` as a function of a two-element point
    pub fn compile_2d(&mut self, options: OptionsMap, key: &str) -> CompileResult<KeyOutput> {
        self.compile_key(options, key, Dimension::Two)
    }

    fn compile_key(
        &mut self,
        mut options: OptionsMap,
        key: &str,
        dimension: Dimension,
    ) -> CompileResult<KeyOutput> {
        let value = options
            .get(key)
            .ok_or_else(|| CompileError::UnknownKey(key.to_string()))?;

        let descriptor = match classify(value) {
            Classification::Plain(callable) => FunctionDescriptor::Plain(callable.clone()),
            Classification::Parametrized(descriptor) => {
                check_descriptor(key, descriptor)?;
                FunctionDescriptor::Parametrized(descriptor.clone())
            }
            Classification::Native(_) | Classification::Data => {
                trace!(target: "plotfn::compile", key, kind = value.kind(), "Pass through");
                return Ok((SmallVec::new(), options));
            }
        };

        self.names.reserve(ambient_names(&options));
        let sym = self.names.fresh();
        let (body, replacement) = match (&descriptor, dimension) {
            (FunctionDescriptor::Plain(callable), _) => {
                let request = CompileRequest::plain(callable, dimension.arity()).with_mode(self.mode);
                let body = self.expressions.compile_expression(request)?;
                (body, Expr::Ident(sym.clone()))
            }
            (FunctionDescriptor::Parametrized(d), Dimension::One) => {
                param::compile_param_1d(&self.expressions, &sym, d, self.mode)?
            }
            (FunctionDescriptor::Parametrized(d), Dimension::Two) => {
                param::compile_param_2d(&self.expressions, &sym, d, self.mode)?
            }
        };

        debug!(
            target: "plotfn::compile",
            key,
            %sym,
            function = descriptor.name(),
            arity = dimension.arity(),
            "Compiled binding"
        );
        options.insert(key.to_string(), OptionValue::Code(replacement));
        let mut bindings = SmallVec::new();
        bindings.push((sym, body));
        Ok((bindings, options))
    }

    /// Apply `compile_fn` to every key in map order.
    ///
    /// Returns all bindings, concatenated in key order, and the rewritten map.
    /// The rewritten map has the same keys as the input; only compiled values
    /// change.
    pub fn compile_all(
        &mut self,
        options: OptionsMap,
        compile_fn: CompileFn<C>,
    ) -> CompileResult<(Vec<Binding>, OptionsMap)> {
        let keys: Vec<String> = options.keys().cloned().collect();
        let mut bindings = Vec::new();
        let mut options = options;
        for key in &keys {
            let (key_bindings, next) = compile_fn(self, options, key)?;
            bindings.extend(key_bindings);
            options = next;
        }
        names::check_distinct(&bindings)?;
        debug!(target: "plotfn::compile", keys = keys.len(), bindings = bindings.len(), "Compiled options");
        Ok((bindings, options))
    }

    /// Like `compile_all`, but also descends into nested options maps.
    ///
    /// Bindings are emitted depth-first in map order.
    pub fn compile_tree(
        &mut self,
        options: OptionsMap,
        compile_fn: CompileFn<C>,
    ) -> CompileResult<(Vec<Binding>, OptionsMap)> {
        // Nested compile steps only see their own map
        self.names.reserve(ambient_names(&options));
        let mut bindings = Vec::new();
        let options = self.compile_tree_into(options, compile_fn, &mut bindings)?;
        names::check_distinct(&bindings)?;
        Ok((bindings, options))
    }

    fn compile_tree_into(
        &mut self,
        mut options: OptionsMap,
        compile_fn: CompileFn<C>,
        bindings: &mut Vec<Binding>,
    ) -> CompileResult<OptionsMap> {
        let keys: Vec<String> = options.keys().cloned().collect();
        for key in &keys {
            let nested = match options.get_mut(key.as_str()) {
                Some(value) if is_options_map(value) => match value {
                    OptionValue::Map(map) => Some(std::mem::take(map)),
                    _ => None,
                },
                _ => None,
            };
            if let Some(map) = nested {
                let map = self.compile_tree_into(map, compile_fn, bindings)?;
                options.insert(key.clone(), OptionValue::Map(map));
                continue;
            }
            let (key_bindings, next) = compile_fn(self, options, key)?;
            bindings.extend(key_bindings);
            options = next;
        }
        Ok(options)
    }
}

/// Compile every function in `options` with a fresh deterministic name supply
pub fn compile(
    options: OptionsMap,
    dimension: Dimension,
) -> CompileResult<(Vec<Binding>, OptionsMap)> {
    let mut compiler = FunctionCompiler::new();
    compiler.compile_all(options, dimension.compile_fn())
}
