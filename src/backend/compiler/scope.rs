//! Wraps compiled bindings around a body expression.

use crate::backend::models::{Binding, Expr};

/// Introduce `bindings` around `body` in a single scoped binding form.
///
/// With no bindings the body is returned unchanged. A body that is itself a
/// binding form is merged into the new one, so the result never nests.
pub fn wrap<I>(bindings: I, body: Expr) -> Expr
where
    I: IntoIterator<Item = Binding>,
{
    let mut bindings: Vec<Binding> = bindings.into_iter().collect();
    if bindings.is_empty() {
        return body;
    }
    match body {
        Expr::Let {
            bindings: inner,
            body,
        } => {
            bindings.extend(inner);
            Expr::Let { bindings, body }
        }
        body => Expr::Let {
            bindings,
            body: Box::new(body),
        },
    }
}
