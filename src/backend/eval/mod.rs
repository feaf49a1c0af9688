//! Reference substrate: evaluates emitted expression trees in process.
//!
//! The real rendering substrate runs the rendered JavaScript in a browser.
//! This evaluator gives the same trees the same meaning so that compiled
//! snippets can be exercised without one:
//!
//! - `Let` binds left to right, each binding visible to the next and to the body
//! - `Lambda` captures its defining scope
//! - `StoreRead` reads the store on every evaluation, never cached
//! - `Host` evaluates to the host callable itself

mod error;
mod value;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::backend::models::{Expr, Ident, Literal, Pattern};

pub use error::{EvalError, EvalResult};
pub use value::{Closure, Function, Scope, Value};

/// Expression evaluator with a table of globally visible names
#[derive(Debug, Default)]
pub struct Evaluator {
    globals: Arc<Scope>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator that resolves free identifiers against `globals`,
    /// e.g. target-native names such as `Math.sin`.
    pub fn with_globals(globals: HashMap<Ident, Value>) -> Self {
        Evaluator {
            globals: Arc::new(Scope {
                vars: globals,
                parent: None,
            }),
        }
    }

    /// Evaluate a closed expression
    pub fn eval(&self, expr: &Expr) -> EvalResult<Value> {
        self.eval_in(expr, &self.globals)
    }

    fn eval_in(&self, expr: &Expr, scope: &Arc<Scope>) -> EvalResult<Value> {
        match expr {
            Expr::Literal(lit) => Ok(match lit {
                Literal::Number(n) => Value::Number(*n),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Null => Value::Null,
            }),

            Expr::Ident(name) => scope
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundIdentifier(name.to_string())),

            Expr::Let { bindings, body } => {
                let mut current = Arc::clone(scope);
                for (name, bound) in bindings {
                    let value = self.eval_in(bound, &current)?;
                    let mut frame = Scope::child(current);
                    frame.vars.insert(name.clone(), value);
                    current = Arc::new(frame);
                }
                self.eval_in(body, &current)
            }

            Expr::Lambda { params, body } => Ok(Value::Function(Function::Closure(Arc::new(
                Closure {
                    params: params.clone(),
                    body: (**body).clone(),
                    scope: Arc::clone(scope),
                },
            )))),

            Expr::Call { callee, args } => {
                let callee = self.eval_in(callee, scope)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval_in(arg, scope))
                    .collect::<EvalResult<Vec<_>>>()?;
                self.apply(&callee, &args)
            }

            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval_in(item, scope))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::Vector),

            Expr::Object(fields) => fields
                .iter()
                .map(|(k, v)| self.eval_in(v, scope).map(|value| (k.clone(), value)))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::Object),

            Expr::Index { target, index } => {
                let target = self.eval_in(target, scope)?;
                let items = target.as_vector()?;
                items
                    .get(*index)
                    .cloned()
                    .ok_or(EvalError::IndexOutOfBounds {
                        index: *index,
                        len: items.len(),
                    })
            }

            Expr::StoreRead { store, param } => store.current_value(param),

            Expr::Host(callable) => Ok(Value::Function(Function::Host(callable.clone()))),
        }
    }

    /// Apply a function value to arguments
    pub fn apply(&self, callee: &Value, args: &[Value]) -> EvalResult<Value> {
        match callee {
            Value::Function(Function::Host(callable)) => {
                trace!(target: "plotfn::eval", callee = callable.name(), argc = args.len(), "Host call");
                callable.call(args)
            }
            Value::Function(Function::Closure(closure)) => {
                if closure.params.len() != args.len() {
                    return Err(EvalError::ArityMismatch {
                        callee: "<closure>".to_string(),
                        expected: closure.params.len(),
                        got: args.len(),
                    });
                }
                let mut frame = Scope::child(Arc::clone(&closure.scope));
                for (pattern, arg) in closure.params.iter().zip(args) {
                    bind_pattern(&mut frame, pattern, arg)?;
                }
                self.eval_in(&closure.body, &Arc::new(frame))
            }
            other => Err(EvalError::NotCallable(other.kind())),
        }
    }
}

fn bind_pattern(frame: &mut Scope, pattern: &Pattern, arg: &Value) -> EvalResult<()> {
    match pattern {
        Pattern::Ident(name) => {
            frame.vars.insert(name.clone(), arg.clone());
        }
        Pattern::Vector(names) => {
            let items = arg.as_vector()?;
            for (index, name) in names.iter().enumerate() {
                let item = items.get(index).ok_or(EvalError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                })?;
                frame.vars.insert(name.clone(), item.clone());
            }
        }
    }
    Ok(())
}
