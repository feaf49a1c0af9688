//! Compilation of parametrized descriptors.
//!
//! The compiled body is a function of `(point, params)`. The replacement
//! reference placed in the options map is a small function of the point that
//! reads every param from the store and forwards both to the compiled body:
//!
//! ```text
//! 1-D:  (x) => sym([x], [store.current("a"), ...])
//! 2-D:  (p) => sym(p, [store.current("a"), ...])
//! ```
//!
//! The reads sit inside the replacement function, so they happen on every
//! invocation and never at compile time. `x`, `p` and `ps` are renamed when
//! the base callable, the store or `sym` would otherwise be shadowed.

use crate::backend::models::{Expr, Ident, ParametrizedDescriptor, Pattern};

use super::error::CompileResult;
use super::expression::{CompileRequest, ExpressionCompiler, Locals, OutputMode};
use super::shape::vectorize_callable;

/// Compile a 1-D parametrized descriptor bound to `sym`.
/// Returns `(compiled body, replacement reference)`.
pub fn compile_param_1d<C: ExpressionCompiler + ?Sized>(
    expressions: &C,
    sym: &Ident,
    descriptor: &ParametrizedDescriptor,
    mode: OutputMode,
) -> CompileResult<(Expr, Expr)> {
    let base = vectorize_callable(descriptor.base());
    let locals = locals_for(sym, descriptor);
    let request = CompileRequest::parametrized(&base, 1, descriptor.params().len())
        .with_mode(mode)
        .with_locals(locals.clone());
    let body = expressions.compile_expression(request)?;
    let replacement = Expr::lambda(
        vec![Pattern::Ident(locals.x.clone())],
        Expr::call(
            Expr::Ident(sym.clone()),
            vec![Expr::Array(vec![Expr::Ident(locals.x)]), param_reads(descriptor)],
        ),
    );
    Ok((body, replacement))
}

/// Compile a 2-D parametrized descriptor bound to `sym`.
/// Returns `(compiled body, replacement reference)`.
pub fn compile_param_2d<C: ExpressionCompiler + ?Sized>(
    expressions: &C,
    sym: &Ident,
    descriptor: &ParametrizedDescriptor,
    mode: OutputMode,
) -> CompileResult<(Expr, Expr)> {
    let locals = locals_for(sym, descriptor);
    let request = CompileRequest::parametrized(descriptor.base(), 2, descriptor.params().len())
        .with_mode(mode)
        .with_locals(locals.clone());
    let body = expressions.compile_expression(request)?;
    let replacement = Expr::lambda(
        vec![Pattern::Ident(locals.p.clone())],
        Expr::call(
            Expr::Ident(sym.clone()),
            vec![Expr::Ident(locals.p), param_reads(descriptor)],
        ),
    );
    Ok((body, replacement))
}

fn locals_for(sym: &Ident, descriptor: &ParametrizedDescriptor) -> Locals {
    Locals::avoiding([
        sym.as_str(),
        descriptor.base().name(),
        descriptor.store().name(),
    ])
}

/// `[store.current(p1), ...]` in param order. Empty params give `[]`.
fn param_reads(descriptor: &ParametrizedDescriptor) -> Expr {
    Expr::Array(
        descriptor
            .params()
            .iter()
            .map(|param| Expr::StoreRead {
                store: descriptor.store().clone(),
                param: param.clone(),
            })
            .collect(),
    )
}
