//! Shape adapters between scalar and point calling conventions.
//!
//! 2-D functions take a two-element point natively. A 1-D function is
//! adapted to take a one-element point `[x]` so that both dimensionalities
//! are invoked the same way at the call site.

use crate::backend::eval::EvalError;
use crate::backend::models::{Callable, Convention, FunctionDescriptor};

/// Adapt a callable whose first argument is a scalar to take `[x]` instead.
///
/// Trailing arguments (params) are forwarded unchanged. A callable that
/// already takes a point, or takes no arguments at all, is returned as is.
pub fn vectorize_callable(f: &Callable) -> Callable {
    if f.arity() == 0 || matches!(f.convention(), Convention::Point { .. }) {
        return f.clone();
    }
    let name = f.name().to_string();
    f.map_fn(f.arity(), Convention::Point { dims: 1 }, move |inner, args| {
        let (point, rest) = args.split_first().ok_or_else(|| EvalError::ArityMismatch {
            callee: name.clone(),
            expected: 1,
            got: 0,
        })?;
        let coords = point.as_vector()?;
        if coords.len() != 1 {
            return Err(EvalError::ArityMismatch {
                callee: format!("{} point", name),
                expected: 1,
                got: coords.len(),
            });
        }
        let mut unwrapped = Vec::with_capacity(args.len());
        unwrapped.push(coords[0].clone());
        unwrapped.extend_from_slice(rest);
        inner(&unwrapped)
    })
}

/// Adapt a descriptor to the one-element point convention.
///
/// For a parametrized descriptor only `base` changes, so partially applying
/// current param values still yields a callable over `[x]`.
pub fn vectorize(descriptor: &FunctionDescriptor) -> FunctionDescriptor {
    match descriptor {
        FunctionDescriptor::Plain(f) => FunctionDescriptor::Plain(vectorize_callable(f)),
        FunctionDescriptor::Parametrized(d) => {
            FunctionDescriptor::Parametrized(d.with_base(vectorize_callable(d.base())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::eval::Value;
    use crate::backend::models::{ParamRef, ReactiveStore};

    fn cube() -> Callable {
        Callable::numeric("cube", 1, |xs| xs[0] * xs[0] * xs[0])
    }

    #[test]
    fn test_vectorized_plain_matches_scalar_call() {
        let f = cube();
        let FunctionDescriptor::Plain(v) = vectorize(&FunctionDescriptor::plain(f.clone())) else {
            panic!("expected plain");
        };
        for x in [-2.0, 0.0, 1.5, 3.0] {
            assert_eq!(
                v.call(&[Value::point(&[x])]).unwrap(),
                f.call(&[Value::Number(x)]).unwrap()
            );
        }
        assert_eq!(v.convention(), Convention::Point { dims: 1 });
    }

    #[test]
    fn test_vectorized_parametrized_matches_after_resolution() {
        let store = ReactiveStore::new("sliders");
        store.set("a", Value::Number(2.0));
        store.set("b", Value::Number(-1.0));
        let line = Callable::numeric("line", 3, |xs| xs[1] * xs[0] + xs[2]);
        let desc = FunctionDescriptor::parametrized(
            line,
            vec![ParamRef::new("a"), ParamRef::new("b")],
            store.clone(),
        );

        let (FunctionDescriptor::Parametrized(orig), FunctionDescriptor::Parametrized(vect)) =
            (desc.clone(), vectorize(&desc))
        else {
            panic!("expected parametrized");
        };
        assert_eq!(vect.params(), orig.params());
        assert!(vect.store().same_store(orig.store()));

        let direct = orig.resolve().unwrap();
        let wrapped = vect.resolve().unwrap();
        assert_eq!(
            wrapped.call(&[Value::point(&[4.0])]).unwrap(),
            direct.call(&[Value::Number(4.0)]).unwrap()
        );

        store.set("a", Value::Number(10.0));
        let wrapped = vect.resolve().unwrap();
        assert_eq!(wrapped.call(&[Value::point(&[4.0])]).unwrap(), Value::Number(39.0));
    }

    #[test]
    fn test_wrong_point_length_is_rejected() {
        let v = vectorize_callable(&cube());
        assert!(matches!(
            v.call(&[Value::point(&[1.0, 2.0])]),
            Err(EvalError::ArityMismatch { expected: 1, got: 2, .. })
        ));
        assert!(matches!(
            v.call(&[Value::Number(1.0)]),
            Err(EvalError::TypeMismatch { expected: "vector", .. })
        ));
    }

    #[test]
    fn test_point_callables_are_left_alone() {
        let v = vectorize_callable(&cube());
        let again = vectorize_callable(&v);
        assert_eq!(again, v);
    }
}
