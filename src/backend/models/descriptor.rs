//! Function descriptors: the compile-time form of values destined to become
//! compiled artifacts.

use std::fmt;
use std::sync::Arc;

use crate::backend::eval::{EvalError, Value};

use super::store::ReactiveStore;

/// Host implementation of a callable
pub type HostFn = dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync;

/// How a callable expects its point argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// Point coordinates are passed as separate scalar arguments
    Spread,
    /// The first argument is the whole point as a vector of `dims` coordinates
    Point { dims: usize },
}

/// A plain callable: a named host function with a declared arity.
///
/// Arity counts positional arguments as the callable receives them, so a
/// `Point` callable over a 1-D point with two trailing params has arity 3
/// (`[x]`, `p1`, `p2`).
#[derive(Clone)]
pub struct Callable {
    name: String,
    arity: usize,
    convention: Convention,
    func: Arc<HostFn>,
}

impl Callable {
    /// Create a callable over raw runtime values
    pub fn new<F>(name: impl Into<String>, arity: usize, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Callable {
            name: name.into(),
            arity,
            convention: Convention::Spread,
            func: Arc::new(func),
        }
    }

    /// Create a callable over numeric scalar arguments
    pub fn numeric<F>(name: impl Into<String>, arity: usize, func: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        Callable::new(name, arity, move |args: &[Value]| {
            let xs = args
                .iter()
                .map(|v| v.as_number())
                .collect::<Result<Vec<f64>, EvalError>>()
                .map_err(|e| EvalError::Host(format!("{}: {}", label, e)))?;
            Ok(Value::Number(func(&xs)))
        })
    }

    /// Wrap the implementation, keeping the name
    pub(crate) fn map_fn<F>(&self, arity: usize, convention: Convention, func: F) -> Self
    where
        F: Fn(&HostFn, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.func);
        Callable {
            name: self.name.clone(),
            arity,
            convention,
            func: Arc::new(move |args: &[Value]| func(inner.as_ref(), args)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn convention(&self) -> Convention {
        self.convention
    }

    /// Invoke with positional arguments, checking arity
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        if args.len() != self.arity {
            return Err(EvalError::ArityMismatch {
                callee: self.name.clone(),
                expected: self.arity,
                got: args.len(),
            });
        }
        (self.func)(args)
    }

    /// Partially apply trailing arguments.
    ///
    /// The returned callable takes the leading `arity - trailing.len()`
    /// arguments and forwards them followed by `trailing`.
    pub fn partial(&self, trailing: Vec<Value>) -> Result<Callable, EvalError> {
        if trailing.len() > self.arity {
            return Err(EvalError::ArityMismatch {
                callee: self.name.clone(),
                expected: self.arity,
                got: trailing.len(),
            });
        }
        let remaining = self.arity - trailing.len();
        let trailing = Arc::new(trailing);
        Ok(self.map_fn(remaining, self.convention, move |f, args| {
            let mut full = Vec::with_capacity(args.len() + trailing.len());
            full.extend_from_slice(args);
            full.extend(trailing.iter().cloned());
            f(&full)
        }))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("convention", &self.convention)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.arity == other.arity
            && self.convention == other.convention
            && Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Reference to a named parameter slot in a reactive store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamRef(String);

impl ParamRef {
    pub fn new(name: impl Into<String>) -> Self {
        ParamRef(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A function whose trailing arguments are read from a reactive store at
/// invocation time.
///
/// `base` takes the point coordinates followed by one argument per entry of
/// `params`, in order. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametrizedDescriptor {
    base: Callable,
    params: Vec<ParamRef>,
    store: ReactiveStore,
}

impl ParametrizedDescriptor {
    pub fn new(base: Callable, params: Vec<ParamRef>, store: ReactiveStore) -> Self {
        ParametrizedDescriptor { base, params, store }
    }

    /// Same params and store over a different base
    pub(crate) fn with_base(&self, base: Callable) -> Self {
        ParametrizedDescriptor {
            base,
            params: self.params.clone(),
            store: self.store.clone(),
        }
    }

    pub fn base(&self) -> &Callable {
        &self.base
    }

    pub fn params(&self) -> &[ParamRef] {
        &self.params
    }

    pub fn store(&self) -> &ReactiveStore {
        &self.store
    }

    /// Number of point arguments `base` takes once params are applied
    pub fn point_arity(&self) -> Option<usize> {
        self.base.arity().checked_sub(self.params.len())
    }

    /// Read current param values and partially apply `base` to them
    pub fn resolve(&self) -> Result<Callable, EvalError> {
        let values = self
            .params
            .iter()
            .map(|p| self.store.current_value(p))
            .collect::<Result<Vec<_>, _>>()?;
        self.base.partial(values)
    }
}

/// A value destined for compilation
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionDescriptor {
    Plain(Callable),
    Parametrized(ParametrizedDescriptor),
}

impl FunctionDescriptor {
    pub fn plain(callable: Callable) -> Self {
        FunctionDescriptor::Plain(callable)
    }

    pub fn parametrized(base: Callable, params: Vec<ParamRef>, store: ReactiveStore) -> Self {
        FunctionDescriptor::Parametrized(ParametrizedDescriptor::new(base, params, store))
    }

    pub fn name(&self) -> &str {
        match self {
            FunctionDescriptor::Plain(c) => c.name(),
            FunctionDescriptor::Parametrized(d) => d.base().name(),
        }
    }
}

impl From<Callable> for FunctionDescriptor {
    fn from(callable: Callable) -> Self {
        FunctionDescriptor::Plain(callable)
    }
}

impl From<ParametrizedDescriptor> for FunctionDescriptor {
    fn from(descriptor: ParametrizedDescriptor) -> Self {
        FunctionDescriptor::Parametrized(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::models::store::ReactiveStore;

    fn mul() -> Callable {
        Callable::numeric("mul", 2, |xs| xs[0] * xs[1])
    }

    #[test]
    fn test_call_checks_arity() {
        let err = mul().call(&[Value::Number(1.0)]).unwrap_err();
        assert!(matches!(
            err,
            EvalError::ArityMismatch { expected: 2, got: 1, .. }
        ));
    }

    #[test]
    fn test_partial_appends_trailing_args() {
        let sub = Callable::numeric("sub", 2, |xs| xs[0] - xs[1]);
        let minus_one = sub.partial(vec![Value::Number(1.0)]).unwrap();
        assert_eq!(minus_one.arity(), 1);
        assert_eq!(
            minus_one.call(&[Value::Number(10.0)]).unwrap(),
            Value::Number(9.0)
        );
    }

    #[test]
    fn test_partial_rejects_too_many_args() {
        let result = mul().partial(vec![Value::Number(1.0); 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_numeric_rejects_non_numbers() {
        let err = mul()
            .call(&[Value::Number(1.0), Value::Str("x".into())])
            .unwrap_err();
        assert!(matches!(err, EvalError::Host(msg) if msg.starts_with("mul:")));
    }

    #[test]
    fn test_resolve_reads_store_each_time() {
        let store = ReactiveStore::new("sliders");
        store.set("k", Value::Number(2.0));
        let desc = ParametrizedDescriptor::new(mul(), vec![ParamRef::new("k")], store.clone());

        let first = desc.resolve().unwrap();
        assert_eq!(first.call(&[Value::Number(3.0)]).unwrap(), Value::Number(6.0));

        store.set("k", Value::Number(5.0));
        let second = desc.resolve().unwrap();
        assert_eq!(second.call(&[Value::Number(3.0)]).unwrap(), Value::Number(15.0));
    }

    #[test]
    fn test_with_base_keeps_params_and_store() {
        let store = ReactiveStore::new("sliders");
        let params = vec![ParamRef::new("m"), ParamRef::new("c")];
        let base = mul();
        let desc = ParametrizedDescriptor::new(base.clone(), params.clone(), store.clone());
        assert_eq!(desc.base(), &base);
        assert_eq!(desc.params(), params.as_slice());
        assert!(desc.store().same_store(&store));

        let id = Callable::numeric("id", 3, |xs| xs[0]);
        let swapped = desc.with_base(id.clone());
        assert_eq!(swapped.base(), &id);
        assert_eq!(swapped.params(), desc.params());
        assert!(swapped.store().same_store(&store));
    }

    #[test]
    fn test_point_arity() {
        let store = ReactiveStore::new("s");
        let desc = ParametrizedDescriptor::new(mul(), vec![ParamRef::new("k")], store.clone());
        assert_eq!(desc.point_arity(), Some(1));

        let bad = ParametrizedDescriptor::new(
            Callable::numeric("id", 1, |xs| xs[0]),
            vec![ParamRef::new("a"), ParamRef::new("b")],
            store,
        );
        assert_eq!(bad.point_arity(), None);
    }
}
