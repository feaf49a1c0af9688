// Backend for compiling plot option functions
//
// - `models`: options maps, function descriptors, expression trees, reactive stores
// - `compiler`: classification, shape adaptation, binding generation, scoping
// - `pipeline`: options map + body builder → wrapped snippet
// - `render`: expression tree → JavaScript text
// - `eval`: reference evaluator for emitted trees
// - `manifest`: TOML options manifests resolved through a `registry`

pub mod compiler;
pub mod eval;
pub mod manifest;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod render;

pub use compiler::{
    compile, wrap, CompileError, CompileResult, Dimension, FunctionCompiler, NameSupply,
};
pub use eval::{EvalError, Evaluator, Value};
pub use manifest::{CompileConfig, OptionsManifest};
pub use models::*;
pub use pipeline::{compile_snippet, Snippet};
pub use registry::CallableRegistry;
pub use render::to_js;
