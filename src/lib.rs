/// plotfn - Function compiler for embeddable plot snippets
///
/// Plotting components describe what to draw with an options map. Some of
/// its values are functions: plain host callables, or parametrized functions
/// whose trailing arguments come from a reactive parameter store that the UI
/// mutates (sliders, drag handles). This library rewrites such a map so that
/// every function is compiled exactly once, bound to a fresh identifier in an
/// enclosing scope, and referenced by that identifier from the map.
///
/// # Architecture
///
/// 1. **Classification** (`backend::compiler::classify`)
///    - Target-native code, plain callables, parametrized descriptors, data
///
/// 2. **Binding generation** (`backend::compiler`)
///    - `compile_1d` / `compile_2d` compile one key into `(sym, body)`
///    - `compile_all` threads a map through every key in insertion order
///    - Parametrized replacements read the store on every invocation
///
/// 3. **Scoping and rendering** (`backend::pipeline`, `backend::render`)
///    - `wrap` encloses a body in one scoped binding form
///    - `to_js` renders the tree as JavaScript
///
/// # Example
///
/// ```rust
/// use plotfn::backend::*;
///
/// let square = Callable::numeric("square", 1, |xs| xs[0] * xs[0]);
/// let mut options = OptionsMap::new();
/// options.insert("y".into(), FunctionDescriptor::plain(square).into());
///
/// let mut compiler = FunctionCompiler::new();
/// let snippet = compile_snippet(&mut compiler, options, FunctionCompiler::compile_1d, |opts| {
///     Expr::call(Expr::ident("Plot.OfX"), vec![opts])
/// })
/// .unwrap();
///
/// assert_eq!(
///     snippet.to_js(),
///     r#"(() => { const f1 = (x) => square(x); return Plot.OfX({"y": f1}); })()"#
/// );
/// ```
pub mod backend;

pub use backend::{
    compile, compile_snippet, wrap, CompileError, Dimension, FunctionCompiler, OptionValue,
    OptionsMap, Snippet,
};
