//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use plotfn::backend::{
    Callable, FunctionDescriptor, OptionValue, OptionsMap, ParamRef, ReactiveStore,
};

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn square() -> Callable {
    Callable::numeric("square", 1, |xs| xs[0] * xs[0])
}

/// `m * x + c`, taking `(x, m, c)`
pub fn affine() -> Callable {
    Callable::numeric("affine", 3, |xs| xs[1] * xs[0] + xs[2])
}

pub fn options(entries: Vec<(&str, OptionValue)>) -> OptionsMap {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Options for a slider-driven line plot: `y = m * x + c`
pub fn line_options(store: &ReactiveStore) -> OptionsMap {
    options(vec![
        ("width", 640.0.into()),
        (
            "y",
            FunctionDescriptor::parametrized(
                affine(),
                vec![ParamRef::new("m"), ParamRef::new("c")],
                store.clone(),
            )
            .into(),
        ),
        ("color", OptionValue::native("Theme.accent")),
    ])
}
