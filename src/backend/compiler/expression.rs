//! Seam to the expression compiler that lowers a function into a code body
//! the rendering substrate can run.
//!
//! The function compiler never inspects the body it gets back; it only binds
//! it to a fresh identifier and re-embeds it. `HostCompiler` is the reference
//! lowering: it emits a function literal that forwards to the host callable.

use std::collections::HashSet;

use serde::Deserialize;

use crate::backend::models::{Callable, Convention, Expr, Ident, Pattern};

use super::error::{CompileError, CompileResult};
use super::names::root_name;

/// Parameter names used inside compiled bodies and replacement references.
/// Generated binding names must avoid these.
pub const LOCAL_NAMES: [&str; 4] = ["x", "y", "p", "ps"];

/// Parameter names of one compiled body and its replacement reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locals {
    /// First coordinate
    pub x: Ident,
    /// Second coordinate
    pub y: Ident,
    /// Whole point
    pub p: Ident,
    /// Param vector
    pub ps: Ident,
}

impl Default for Locals {
    fn default() -> Self {
        let [x, y, p, ps] = LOCAL_NAMES.map(Ident::new);
        Self { x, y, p, ps }
    }
}

impl Locals {
    /// Locals that shadow none of the `referenced` names. A clashing local
    /// takes the first free numeric suffix: `x` becomes `x_1`.
    pub fn avoiding<'n>(referenced: impl IntoIterator<Item = &'n str>) -> Self {
        let mut taken: HashSet<String> = referenced
            .into_iter()
            .map(|name| root_name(name).to_string())
            .collect();
        let mut pick = |base: &str| {
            let mut name = base.to_string();
            let mut suffix = 0;
            while taken.contains(&name) {
                suffix += 1;
                name = format!("{}_{}", base, suffix);
            }
            taken.insert(name.clone());
            Ident::new(name)
        };
        Self {
            x: pick("x"),
            y: pick("y"),
            p: pick("p"),
            ps: pick("ps"),
        }
    }
}

/// Output representation requested from the expression compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Code the rendering substrate evaluates directly
    #[default]
    Native,
}

/// What to compile and in which shape
#[derive(Debug, Clone)]
pub struct CompileRequest<'a> {
    pub function: &'a Callable,
    /// Point dimensionality (1 or 2)
    pub arity: usize,
    /// `None` for a plain function of the point. `Some(n)` for a function of
    /// `(point, params)` where `params` is a vector of `n` values.
    pub param_count: Option<usize>,
    pub mode: OutputMode,
    /// Parameter names for the emitted function literal
    pub locals: Locals,
}

impl<'a> CompileRequest<'a> {
    pub fn plain(function: &'a Callable, arity: usize) -> Self {
        Self {
            function,
            arity,
            param_count: None,
            mode: OutputMode::Native,
            locals: Locals::avoiding([function.name()]),
        }
    }

    pub fn parametrized(function: &'a Callable, arity: usize, param_count: usize) -> Self {
        Self {
            function,
            arity,
            param_count: Some(param_count),
            mode: OutputMode::Native,
            locals: Locals::avoiding([function.name()]),
        }
    }

    /// Number of positional arguments the function must accept
    pub fn expected_arity(&self) -> usize {
        let point_args = match self.function.convention() {
            Convention::Point { .. } => 1,
            Convention::Spread => self.arity,
        };
        point_args + self.param_count.unwrap_or(0)
    }

    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_locals(mut self, locals: Locals) -> Self {
        self.locals = locals;
        self
    }
}

/// Lowers a function into a compiled body
pub trait ExpressionCompiler {
    /// Compile `request.function`. Arity mismatches are reported here and
    /// propagated unchanged by the caller.
    fn compile_expression(&self, request: CompileRequest<'_>) -> CompileResult<Expr>;
}

impl<T: ExpressionCompiler + ?Sized> ExpressionCompiler for &T {
    fn compile_expression(&self, request: CompileRequest<'_>) -> CompileResult<Expr> {
        (**self).compile_expression(request)
    }
}

/// Reference expression compiler.
///
/// | request | body |
/// |---|---|
/// | plain, arity 1 | `(x) => f(x)` |
/// | plain, arity 2 | `([x, y]) => f(x, y)` |
/// | parametrized | `(p, ps) => f(…point args, ps[0], …)` |
///
/// A callable with the point convention receives the point as one argument.
/// Parameter names come from `request.locals`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostCompiler;

impl ExpressionCompiler for HostCompiler {
    fn compile_expression(&self, request: CompileRequest<'_>) -> CompileResult<Expr> {
        let f = request.function;
        if !(1..=2).contains(&request.arity) {
            return Err(CompileError::InvalidDimension(request.arity));
        }
        if let Convention::Point { dims } = f.convention() {
            if dims != request.arity {
                return Err(CompileError::ArityMismatch {
                    callable: format!("{} point", f.name()),
                    expected: request.arity,
                    got: dims,
                });
            }
        }
        let expected = request.expected_arity();
        if f.arity() != expected {
            return Err(CompileError::ArityMismatch {
                callable: f.name().to_string(),
                expected,
                got: f.arity(),
            });
        }

        let Locals { x, y, p, ps } = &request.locals;
        let coords: Vec<Ident> = match request.arity {
            1 => vec![x.clone()],
            _ => vec![x.clone(), y.clone()],
        };
        let point_as_vector = matches!(f.convention(), Convention::Point { .. });

        let body = match request.param_count {
            None => {
                let (pattern, mut args) = if request.arity == 1 {
                    (Pattern::Ident(coords[0].clone()), vec![Expr::Ident(coords[0].clone())])
                } else {
                    let args = coords.iter().cloned().map(Expr::Ident).collect();
                    (Pattern::Vector(coords.clone()), args)
                };
                if point_as_vector {
                    args = vec![Expr::Array(args)];
                }
                Expr::lambda(vec![pattern], Expr::call(Expr::Host(f.clone()), args))
            }
            Some(n) => {
                let (point, mut args) = if point_as_vector {
                    (Pattern::Ident(p.clone()), vec![Expr::Ident(p.clone())])
                } else {
                    let args = coords.iter().cloned().map(Expr::Ident).collect();
                    (Pattern::Vector(coords.clone()), args)
                };
                args.extend((0..n).map(|i| Expr::index(Expr::Ident(ps.clone()), i)));
                Expr::lambda(
                    vec![point, Pattern::Ident(ps.clone())],
                    Expr::call(Expr::Host(f.clone()), args),
                )
            }
        };
        Ok(body)
    }
}
