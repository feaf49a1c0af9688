//! End-to-end tests: options map → compiled snippet → JavaScript text and
//! reference evaluation.

mod common;

use std::collections::{HashMap, HashSet};

use plotfn::backend::*;
use rayon::prelude::*;

use common::{affine, init_tracing, line_options, options, square};

fn theme_globals() -> HashMap<Ident, Value> {
    let mut globals = HashMap::new();
    globals.insert(Ident::new("Theme.accent"), Value::Str("#f80".to_string()));
    globals
}

#[test]
fn test_line_snippet_renders_one_binding() {
    init_tracing();
    let store = ReactiveStore::new("sliders");
    let mut compiler = FunctionCompiler::new();
    let snippet = compile_snippet(
        &mut compiler,
        line_options(&store),
        FunctionCompiler::compile_1d,
        |opts| Expr::call(Expr::ident("Plot.line"), vec![opts]),
    )
    .unwrap();

    assert_eq!(snippet.binding_count, 1);
    assert_eq!(
        snippet.to_js(),
        concat!(
            r#"(() => { const f1 = (p, ps) => affine(p, ps[0], ps[1]); "#,
            r#"return Plot.line({"width": 640, "y": (x) => f1([x], "#,
            r#"[sliders.current("m"), sliders.current("c")]), "color": Theme.accent}); })()"#,
        )
    );
}

#[test]
fn test_snippet_reads_store_on_every_call() {
    init_tracing();
    let store = ReactiveStore::new("sliders");
    store.set("m", Value::Number(2.0));
    store.set("c", Value::Number(1.0));

    let mut compiler = FunctionCompiler::new();
    let snippet = compile_snippet(
        &mut compiler,
        line_options(&store),
        FunctionCompiler::compile_1d,
        |opts| opts,
    )
    .unwrap();

    let ev = Evaluator::with_globals(theme_globals());
    let rendered = ev.eval(&snippet.expr).unwrap();
    let y = rendered.field("y").unwrap().clone();
    assert_eq!(rendered.field("color"), Some(&Value::Str("#f80".to_string())));

    assert_eq!(ev.apply(&y, &[Value::Number(3.0)]).unwrap(), Value::Number(7.0));

    // A slider moves; no recompilation.
    store.set("m", Value::Number(-1.0));
    assert_eq!(ev.apply(&y, &[Value::Number(3.0)]).unwrap(), Value::Number(-2.0));
}

#[test]
fn test_missing_param_surfaces_at_invocation() {
    let store = ReactiveStore::new("sliders");
    store.set("m", Value::Number(2.0));

    let (bindings, rewritten) = compile(line_options(&store), Dimension::One).unwrap();
    let OptionValue::Code(y) = &rewritten["y"] else {
        panic!("y was not compiled");
    };
    let ev = Evaluator::new();
    let y = ev.eval(&wrap(bindings, y.clone())).unwrap();
    let err = ev.apply(&y, &[Value::Number(1.0)]).unwrap_err();
    assert_eq!(
        err,
        EvalError::MissingParam {
            store: "sliders".to_string(),
            param: "c".to_string(),
        }
    );
}

#[test]
fn test_surface_snippet_in_two_dimensions() {
    let store = ReactiveStore::new("knobs");
    store.set("k", Value::Number(0.5));
    let plane = Callable::numeric("plane", 3, |xs| xs[2] * (xs[0] + xs[1]));
    let dist = Callable::numeric("dist", 2, |xs| xs[0].hypot(xs[1]));
    let z = FunctionDescriptor::parametrized(plane, vec![ParamRef::new("k")], store.clone());
    let input = options(vec![
        ("z", z.into()),
        ("fill", FunctionDescriptor::plain(dist).into()),
    ]);

    let mut compiler = FunctionCompiler::new();
    let snippet =
        compile_snippet(&mut compiler, input, FunctionCompiler::compile_2d, |opts| opts).unwrap();
    assert_eq!(snippet.binding_count, 2);

    let ev = Evaluator::new();
    let rendered = ev.eval(&snippet.expr).unwrap();
    let z = rendered.field("z").unwrap();
    let fill = rendered.field("fill").unwrap();
    let point = Value::point(&[3.0, 4.0]);

    assert_eq!(ev.apply(z, &[point.clone()]).unwrap(), Value::Number(3.5));
    assert_eq!(ev.apply(fill, &[point.clone()]).unwrap(), Value::Number(5.0));
    store.set("k", Value::Number(2.0));
    assert_eq!(ev.apply(z, &[point]).unwrap(), Value::Number(14.0));
}

#[test]
fn test_plain_function_used_in_two_keys_gets_two_bindings() {
    let f = square();
    let input = options(vec![
        ("x", FunctionDescriptor::plain(f.clone()).into()),
        ("y", FunctionDescriptor::plain(f).into()),
    ]);
    let (bindings, rewritten) = compile(input, Dimension::One).unwrap();
    let names: Vec<&str> = bindings.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["f1", "f2"]);
    assert_eq!(rewritten["x"], OptionValue::Code(Expr::ident("f1")));
    assert_eq!(rewritten["y"], OptionValue::Code(Expr::ident("f2")));
}

#[test]
fn test_concurrent_unique_passes_never_collide() {
    let stores: Vec<ReactiveStore> = (0..16)
        .map(|i| ReactiveStore::new(format!("s{}", i)))
        .collect();

    let names: Vec<Vec<String>> = stores
        .par_iter()
        .map(|store| {
            let mut compiler = FunctionCompiler::with_names(NameSupply::unique("f").unwrap());
            let input = options(vec![
                ("a", FunctionDescriptor::plain(square()).into()),
                (
                    "b",
                    FunctionDescriptor::parametrized(
                        affine(),
                        vec![ParamRef::new("m"), ParamRef::new("c")],
                        store.clone(),
                    )
                    .into(),
                ),
            ]);
            let (bindings, _) = compiler
                .compile_all(input, FunctionCompiler::compile_1d)
                .unwrap();
            bindings.into_iter().map(|(n, _)| n.to_string()).collect::<Vec<String>>()
        })
        .collect();

    let all: Vec<&String> = names.iter().flatten().collect();
    let distinct: HashSet<&String> = all.iter().copied().collect();
    assert_eq!(all.len(), 32);
    assert_eq!(distinct.len(), all.len());
}

#[test]
fn test_malformed_descriptor_aborts_snippet() {
    let store = ReactiveStore::new("sliders");
    // two params but the base only takes one argument
    let desc = FunctionDescriptor::parametrized(
        square(),
        vec![ParamRef::new("m"), ParamRef::new("c")],
        store,
    );
    let input = options(vec![("y", desc.into())]);
    let mut compiler = FunctionCompiler::new();
    let err = compile_snippet(&mut compiler, input, FunctionCompiler::compile_1d, |opts| opts)
        .unwrap_err();
    assert!(matches!(err, CompileError::MalformedDescriptor { ref key, .. } if key == "y"));
}

#[test]
fn test_native_and_callable_names_survive_rendering() {
    let f1 = Callable::numeric("f1", 1, |xs| xs[0] + 1.0);
    let input = options(vec![
        ("g", OptionValue::native("f1")),
        ("h", FunctionDescriptor::plain(square()).into()),
        ("k", FunctionDescriptor::plain(f1).into()),
    ]);
    let mut compiler = FunctionCompiler::new();
    let snippet =
        compile_snippet(&mut compiler, input, FunctionCompiler::compile_1d, |opts| opts).unwrap();

    assert_eq!(
        snippet.to_js(),
        concat!(
            r#"(() => { const f2 = (x) => square(x); const f3 = (x) => f1(x); "#,
            r#"return {"g": f1, "h": f2, "k": f3}; })()"#,
        )
    );
}

#[test]
fn test_locals_do_not_shadow_store_or_callable() {
    let store = ReactiveStore::new("x");
    store.set("P", Value::Number(2.0));
    let p = Callable::numeric("p", 2, |xs| xs[0] * xs[1]);
    let input = options(vec![(
        "y",
        FunctionDescriptor::parametrized(p, vec![ParamRef::new("P")], store.clone()).into(),
    )]);
    let mut compiler = FunctionCompiler::new();
    let snippet =
        compile_snippet(&mut compiler, input, FunctionCompiler::compile_1d, |opts| opts).unwrap();

    assert_eq!(
        snippet.to_js(),
        concat!(
            r#"(() => { const f1 = (p_1, ps) => p(p_1, ps[0]); "#,
            r#"return {"y": (x_1) => f1([x_1], [x.current("P")])}; })()"#,
        )
    );

    let ev = Evaluator::new();
    let rendered = ev.eval(&snippet.expr).unwrap();
    let y = rendered.field("y").unwrap();
    assert_eq!(ev.apply(y, &[Value::Number(4.0)]).unwrap(), Value::Number(8.0));
}
