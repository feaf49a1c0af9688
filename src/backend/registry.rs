//! Named host callables available to options manifests.

use std::collections::HashMap;

use crate::backend::models::Callable;

/// Registry of host callables by name
#[derive(Debug, Clone, Default)]
pub struct CallableRegistry {
    callables: HashMap<String, Callable>,
}

impl CallableRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        CallableRegistry {
            callables: HashMap::new(),
        }
    }

    /// Create a registry with common scalar math functions
    pub fn with_math() -> Self {
        let mut registry = Self::new();

        // Unary
        registry.register(Callable::numeric("sin", 1, |xs| xs[0].sin()));
        registry.register(Callable::numeric("cos", 1, |xs| xs[0].cos()));
        registry.register(Callable::numeric("tan", 1, |xs| xs[0].tan()));
        registry.register(Callable::numeric("exp", 1, |xs| xs[0].exp()));
        registry.register(Callable::numeric("ln", 1, |xs| xs[0].ln()));
        registry.register(Callable::numeric("sqrt", 1, |xs| xs[0].sqrt()));
        registry.register(Callable::numeric("abs", 1, |xs| xs[0].abs()));
        registry.register(Callable::numeric("square", 1, |xs| xs[0] * xs[0]));

        // Binary
        registry.register(Callable::numeric("add", 2, |xs| xs[0] + xs[1]));
        registry.register(Callable::numeric("mul", 2, |xs| xs[0] * xs[1]));
        registry.register(Callable::numeric("pow", 2, |xs| xs[0].powf(xs[1])));
        registry.register(Callable::numeric("hypot", 2, |xs| xs[0].hypot(xs[1])));

        // Ternary
        registry.register(Callable::numeric("affine", 3, |xs| xs[0] * xs[1] + xs[2]));

        registry
    }

    /// Register a callable under its own name, replacing any previous entry
    pub fn register(&mut self, callable: Callable) {
        self.callables.insert(callable.name().to_string(), callable);
    }

    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.callables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.callables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::eval::Value;

    #[test]
    fn test_math_registry_lookup() {
        let registry = CallableRegistry::with_math();
        let square = registry.get("square").unwrap();
        assert_eq!(square.arity(), 1);
        assert_eq!(
            square.call(&[Value::Number(3.0)]).unwrap(),
            Value::Number(9.0)
        );
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = CallableRegistry::new();
        assert!(registry.is_empty());
        registry.register(Callable::numeric("f", 1, |xs| xs[0]));
        registry.register(Callable::numeric("f", 2, |xs| xs[0] + xs[1]));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("f").unwrap().arity(), 2);
    }
}
