//! End-to-end snippet construction.
//!
//! A plotting component hands over its options map and a builder for the
//! expression that consumes the rewritten options. The result is a single
//! expression with every compiled function bound once in an enclosing scope.

use tracing::debug;

use crate::backend::compiler::{
    wrap, CompileError, CompileFn, CompileResult, ExpressionCompiler, FunctionCompiler,
};
use crate::backend::models::{options_to_expr, Expr, OptionsMap};
use crate::backend::render;

/// A compiled snippet ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub expr: Expr,
    /// Number of compiled bindings in the enclosing scope
    pub binding_count: usize,
}

impl Snippet {
    pub fn to_js(&self) -> String {
        render::to_js(&self.expr)
    }
}

/// Compile `options`, build the consuming expression from the rewritten map,
/// and wrap it with the resulting bindings.
///
/// `body` receives the rewritten options as an object expression.
pub fn compile_snippet<C, B>(
    compiler: &mut FunctionCompiler<C>,
    options: OptionsMap,
    compile_fn: CompileFn<C>,
    body: B,
) -> CompileResult<Snippet>
where
    C: ExpressionCompiler,
    B: FnOnce(Expr) -> Expr,
{
    let (bindings, options) = compiler.compile_all(options, compile_fn)?;
    let options = options_to_expr(&options).map_err(CompileError::Uncompiled)?;
    let binding_count = bindings.len();
    let expr = wrap(bindings, body(options));
    debug!(target: "plotfn::compile", bindings = binding_count, "Built snippet");
    Ok(Snippet {
        expr,
        binding_count,
    })
}
