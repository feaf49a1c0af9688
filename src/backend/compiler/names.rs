//! Fresh identifier supply for compiled bindings.
//!
//! A `NameSupply` is threaded through one compile pass. Names it issues are
//! pairwise distinct and never equal to a name reserved from the ambient
//! scope. `NameSupply::unique` additionally draws a process-wide namespace so
//! passes running concurrently cannot produce the same identifier.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::models::{
    Binding, Expr, FunctionDescriptor, Ident, OptionValue, OptionsMap, Pattern,
};

use super::error::{CompileError, CompileResult};

/// Default prefix for generated identifiers
pub const DEFAULT_PREFIX: &str = "f";

static NEXT_NAMESPACE: AtomicU64 = AtomicU64::new(1);

/// Issues fresh identifiers
#[derive(Debug, Clone)]
pub struct NameSupply {
    prefix: String,
    /// Last issued counter value
    counter: u64,
    /// Reserved ambient names and every name issued so far
    taken: HashSet<String>,
}

impl Default for NameSupply {
    fn default() -> Self {
        Self::with_checked_prefix(DEFAULT_PREFIX.to_string())
    }
}

impl NameSupply {
    /// Deterministic supply: `prefix1`, `prefix2`, ...
    pub fn new(prefix: impl Into<String>) -> CompileResult<Self> {
        let prefix = prefix.into();
        check_prefix(&prefix)?;
        Ok(Self::with_checked_prefix(prefix))
    }

    /// Supply in a namespace no other `unique` supply in this process shares
    pub fn unique(prefix: impl AsRef<str>) -> CompileResult<Self> {
        check_prefix(prefix.as_ref())?;
        let namespace = NEXT_NAMESPACE.fetch_add(1, Ordering::Relaxed);
        Ok(Self::with_checked_prefix(format!("{}{}_", prefix.as_ref(), namespace)))
    }

    fn with_checked_prefix(prefix: String) -> Self {
        Self {
            prefix,
            counter: 0,
            taken: HashSet::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Mark names visible in the surrounding scope as unavailable
    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taken.extend(names.into_iter().map(Into::into));
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Issue the next free identifier
    pub fn fresh(&mut self) -> Ident {
        loop {
            self.counter += 1;
            let candidate = format!("{}{}", self.prefix, self.counter);
            if self.taken.insert(candidate.clone()) {
                return Ident::new(candidate);
            }
        }
    }
}

/// A prefix must start a valid identifier on its own, since issued names
/// append only digits to it.
pub fn check_prefix(prefix: &str) -> CompileResult<()> {
    let mut chars = prefix.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CompileError::InvalidPrefix(prefix.to_string()))
    }
}

/// The binding a possibly dotted name resolves through: `Theme` for
/// `Theme.accent`
pub fn root_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Root names an options map refers to or binds anywhere: identifiers in
/// native code, host callables and stores, nested maps included.
///
/// Generated bindings must not reuse any of them, or a reference in the map
/// would resolve to the generated function instead.
pub fn ambient_names(options: &OptionsMap) -> HashSet<String> {
    let mut names = HashSet::new();
    for value in options.values() {
        collect_value(value, &mut names);
    }
    names
}

fn collect_value(value: &OptionValue, names: &mut HashSet<String>) {
    match value {
        OptionValue::Number(_) | OptionValue::Bool(_) | OptionValue::Str(_) => {}
        OptionValue::List(items) => items.iter().for_each(|item| collect_value(item, names)),
        OptionValue::Map(map) => map.values().for_each(|item| collect_value(item, names)),
        OptionValue::Code(expr) => collect_expr(expr, names),
        OptionValue::Function(FunctionDescriptor::Plain(callable)) => {
            insert_root(names, callable.name());
        }
        OptionValue::Function(FunctionDescriptor::Parametrized(descriptor)) => {
            insert_root(names, descriptor.base().name());
            insert_root(names, descriptor.store().name());
        }
    }
}

fn collect_expr(expr: &Expr, names: &mut HashSet<String>) {
    match expr {
        Expr::Let { bindings, body } => {
            for (name, bound) in bindings {
                insert_root(names, name.as_str());
                collect_expr(bound, names);
            }
            collect_expr(body, names);
        }
        Expr::Lambda { params, body } => {
            for id in params.iter().flat_map(Pattern::idents) {
                insert_root(names, id.as_str());
            }
            collect_expr(body, names);
        }
        Expr::Call { callee, args } => {
            collect_expr(callee, names);
            args.iter().for_each(|arg| collect_expr(arg, names));
        }
        Expr::Ident(id) => insert_root(names, id.as_str()),
        Expr::Literal(_) => {}
        Expr::Array(items) => items.iter().for_each(|item| collect_expr(item, names)),
        Expr::Object(fields) => fields.iter().for_each(|(_, value)| collect_expr(value, names)),
        Expr::Index { target, .. } => collect_expr(target, names),
        Expr::StoreRead { store, .. } => insert_root(names, store.name()),
        Expr::Host(callable) => insert_root(names, callable.name()),
    }
}

fn insert_root(names: &mut HashSet<String>, name: &str) {
    let root = root_name(name);
    if !names.contains(root) {
        names.insert(root.to_string());
    }
}

/// Verify that no identifier is bound twice
pub fn check_distinct(bindings: &[Binding]) -> CompileResult<()> {
    let mut seen = HashSet::with_capacity(bindings.len());
    for (name, _) in bindings {
        if !seen.insert(name.as_str()) {
            return Err(CompileError::NameCollision(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::models::{Callable, ParamRef, ReactiveStore};

    #[test]
    fn test_deterministic_sequence() {
        let mut names = NameSupply::new("g").unwrap();
        assert_eq!(names.fresh().as_str(), "g1");
        assert_eq!(names.fresh().as_str(), "g2");
        assert_eq!(names.fresh().as_str(), "g3");
    }

    #[test]
    fn test_reserved_names_are_skipped() {
        let mut names = NameSupply::new("f").unwrap();
        names.reserve(["f1", "f3"]);
        assert_eq!(names.fresh().as_str(), "f2");
        assert_eq!(names.fresh().as_str(), "f4");
        assert!(names.is_taken("f4"));
    }

    #[test]
    fn test_unique_supplies_do_not_overlap() {
        let mut a = NameSupply::unique("f").unwrap();
        let mut b = NameSupply::unique("f").unwrap();
        assert_ne!(a.prefix(), b.prefix());
        let from_a: HashSet<_> = (0..50).map(|_| a.fresh()).collect();
        let from_b: HashSet<_> = (0..50).map(|_| b.fresh()).collect();
        assert!(from_a.is_disjoint(&from_b));
    }

    #[test]
    fn test_prefix_must_start_an_identifier() {
        for bad in ["", "1f", "f.g", "f-", "a b"] {
            assert_eq!(
                NameSupply::new(bad).unwrap_err(),
                CompileError::InvalidPrefix(bad.to_string())
            );
        }
        assert!(NameSupply::unique("").is_err());
        for good in ["f", "_tmp", "$f", "plot_fn2"] {
            assert!(NameSupply::new(good).is_ok());
        }
    }

    #[test]
    fn test_ambient_names_cover_code_callables_and_stores() {
        let store = ReactiveStore::new("knobs.left");
        let square = Callable::numeric("square", 1, |xs| xs[0] * xs[0]);
        let scale = Callable::numeric("Lib.scale", 2, |xs| xs[0] * xs[1]);
        let mut style = OptionsMap::new();
        style.insert("fill".into(), OptionValue::native("Theme.fill"));
        let mut options = OptionsMap::new();
        options.insert("width".into(), 640.0.into());
        options.insert("color".into(), OptionValue::native("f1"));
        options.insert("y".into(), FunctionDescriptor::plain(square).into());
        options.insert(
            "z".into(),
            FunctionDescriptor::parametrized(scale, vec![ParamRef::new("k")], store).into(),
        );
        options.insert("style".into(), style.into());
        options.insert(
            "ticks".into(),
            OptionValue::List(vec![OptionValue::Code(Expr::call(
                Expr::ident("d3.ticks"),
                vec![Expr::number(5.0)],
            ))]),
        );

        let names = ambient_names(&options);
        let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        assert_eq!(sorted, vec!["Lib", "Theme", "d3", "f1", "knobs", "square"]);
    }

    #[test]
    fn test_root_name() {
        assert_eq!(root_name("Theme.accent"), "Theme");
        assert_eq!(root_name("square"), "square");
    }

    #[test]
    fn test_check_distinct() {
        let ok = vec![
            (Ident::new("a"), Expr::number(1.0)),
            (Ident::new("b"), Expr::number(2.0)),
        ];
        assert!(check_distinct(&ok).is_ok());

        let dup = vec![
            (Ident::new("a"), Expr::number(1.0)),
            (Ident::new("a"), Expr::number(2.0)),
        ];
        let err = check_distinct(&dup).unwrap_err();
        assert_eq!(err, CompileError::NameCollision("a".to_string()));
        assert!(err.is_internal());
    }
}
