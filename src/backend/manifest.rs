//! Options manifests: plot options and compile settings in TOML.
//!
//! ```toml
//! [compile]
//! prefix = "f"
//! dimension = 1
//! mode = "native"
//! reserved = ["Plot"]
//!
//! [options]
//! a = 3
//! y = { fn = "square" }
//! f = { fn = "affine", params = ["m", "c"], store = "sliders" }
//! color = { native = "Theme.accent" }
//!
//! [options.style]
//! width = 2
//! ```
//!
//! Tables with a `fn` key become function descriptors, resolved against a
//! `CallableRegistry` and the named reactive stores supplied by the caller.
//! A `native` table is a reference to code the rendering target already
//! knows. Every other table is a nested options map.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::backend::compiler::names::{check_prefix, DEFAULT_PREFIX};
use crate::backend::compiler::{
    CompileError, CompileResult, Dimension, FunctionCompiler, NameSupply, OutputMode,
};
use crate::backend::models::{
    Binding, FunctionDescriptor, OptionValue, OptionsMap, ParamRef, ReactiveStore,
};
use crate::backend::registry::CallableRegistry;

/// The `[compile]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Prefix for generated binding identifiers
    pub prefix: String,
    pub dimension: Dimension,
    pub mode: OutputMode,
    /// Names visible around the emitted snippet
    pub reserved: Vec<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            dimension: Dimension::One,
            mode: OutputMode::Native,
            reserved: Vec::new(),
        }
    }
}

impl CompileConfig {
    /// A compiler configured with this section's prefix, mode and reserved names
    pub fn compiler(&self) -> CompileResult<FunctionCompiler> {
        let names = NameSupply::new(self.prefix.as_str())?;
        let mut compiler = FunctionCompiler::with_names(names).with_mode(self.mode);
        compiler.reserve(self.reserved.iter().cloned());
        Ok(compiler)
    }
}

/// A parsed options manifest
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsManifest {
    pub compile: CompileConfig,
    pub options: OptionsMap,
}

impl OptionsManifest {
    /// Parse a manifest from TOML text
    pub fn parse_toml(
        content: &str,
        registry: &CallableRegistry,
        stores: &[ReactiveStore],
    ) -> CompileResult<Self> {
        let mut table: toml::Table = content
            .parse()
            .map_err(|e: toml::de::Error| CompileError::Manifest(e.to_string()))?;

        let compile = match table.remove("compile") {
            Some(section) => section
                .try_into::<CompileConfig>()
                .map_err(|e| CompileError::Manifest(format!("[compile]: {}", e)))?,
            None => CompileConfig::default(),
        };
        check_prefix(&compile.prefix)?;

        let options = match table.remove("options") {
            Some(toml::Value::Table(options)) => {
                let resolver = Resolver { registry, stores };
                resolver.table(options, "")?
            }
            Some(other) => {
                return Err(CompileError::Manifest(format!(
                    "[options] must be a table, found {}",
                    other.type_str()
                )))
            }
            None => OptionsMap::new(),
        };

        if let Some(section) = table.keys().next() {
            return Err(CompileError::Manifest(format!("unexpected section `{}`", section)));
        }

        debug!(
            target: "plotfn::manifest",
            keys = options.len(),
            prefix = %compile.prefix,
            dimension = compile.dimension.arity(),
            "Parsed options manifest"
        );
        Ok(OptionsManifest { compile, options })
    }

    /// Read and parse a manifest file
    pub fn load_from_path(
        path: &Path,
        registry: &CallableRegistry,
        stores: &[ReactiveStore],
    ) -> CompileResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CompileError::Manifest(format!("{}: {}", path.display(), e)))?;
        debug!(target: "plotfn::manifest", path = %path.display(), "Loading options manifest");
        Self::parse_toml(&content, registry, stores)
    }

    /// Compile every function in the manifest, nested maps included
    pub fn compile(self) -> CompileResult<(Vec<Binding>, OptionsMap)> {
        let mut compiler = self.compile.compiler()?;
        compiler.compile_tree(self.options, self.compile.dimension.compile_fn())
    }
}

/// Resolves manifest tables into option values
struct Resolver<'a> {
    registry: &'a CallableRegistry,
    stores: &'a [ReactiveStore],
}

impl Resolver<'_> {
    fn table(&self, table: toml::Table, path: &str) -> CompileResult<OptionsMap> {
        table
            .into_iter()
            .map(|(key, value)| {
                let key_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                self.value(value, &key_path).map(|value| (key, value))
            })
            .collect()
    }

    fn value(&self, value: toml::Value, path: &str) -> CompileResult<OptionValue> {
        Ok(match value {
            toml::Value::String(s) => OptionValue::Str(s),
            toml::Value::Integer(i) => OptionValue::Number(i as f64),
            toml::Value::Float(f) => OptionValue::Number(f),
            toml::Value::Boolean(b) => OptionValue::Bool(b),
            toml::Value::Datetime(d) => OptionValue::Str(d.to_string()),
            toml::Value::Array(items) => OptionValue::List(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| self.value(item, &format!("{}[{}]", path, i)))
                    .collect::<CompileResult<_>>()?,
            ),
            toml::Value::Table(table) if table.contains_key("fn") => {
                OptionValue::Function(self.descriptor(table, path)?)
            }
            toml::Value::Table(table)
                if table.contains_key("params") || table.contains_key("store") =>
            {
                return Err(malformed(path, "`params`/`store` without `fn`"));
            }
            toml::Value::Table(table) if table.contains_key("native") => {
                if table.len() != 1 {
                    return Err(malformed(path, "`native` table takes no other fields"));
                }
                match table.get("native") {
                    Some(toml::Value::String(name)) => OptionValue::native(name.as_str()),
                    _ => return Err(malformed(path, "`native` must be a string")),
                }
            }
            toml::Value::Table(table) => OptionValue::Map(self.table(table, path)?),
        })
    }

    fn descriptor(&self, table: toml::Table, path: &str) -> CompileResult<FunctionDescriptor> {
        let mut name = None;
        let mut params = None;
        let mut store = None;
        for (field, value) in table {
            match (field.as_str(), value) {
                ("fn", toml::Value::String(s)) => name = Some(s),
                ("params", toml::Value::Array(items)) => {
                    let refs = items
                        .into_iter()
                        .map(|item| match item {
                            toml::Value::String(p) => Ok(ParamRef::new(p)),
                            other => Err(malformed(
                                path,
                                &format!("param must be a string, found {}", other.type_str()),
                            )),
                        })
                        .collect::<CompileResult<Vec<_>>>()?;
                    params = Some(refs);
                }
                ("store", toml::Value::String(s)) => store = Some(s),
                ("fn" | "params" | "store", other) => {
                    return Err(malformed(
                        path,
                        &format!("`{}` has the wrong type ({})", field, other.type_str()),
                    ))
                }
                (unexpected, _) => {
                    return Err(malformed(path, &format!("unexpected field `{}`", unexpected)))
                }
            }
        }

        let name = name.ok_or_else(|| malformed(path, "missing `fn`"))?;
        let callable = self
            .registry
            .get(&name)
            .cloned()
            .ok_or_else(|| malformed(path, &format!("unknown callable `{}`", name)))?;

        match (params, store) {
            (None, None) => Ok(FunctionDescriptor::plain(callable)),
            (Some(_), None) => Err(malformed(path, "`params` require a `store`")),
            (params, Some(store_name)) => {
                let store = self
                    .stores
                    .iter()
                    .find(|s| s.name() == store_name)
                    .cloned()
                    .ok_or_else(|| malformed(path, &format!("unknown store `{}`", store_name)))?;
                Ok(FunctionDescriptor::parametrized(
                    callable,
                    params.unwrap_or_default(),
                    store,
                ))
            }
        }
    }
}

fn malformed(path: &str, reason: &str) -> CompileError {
    CompileError::MalformedDescriptor {
        key: path.to_string(),
        reason: reason.to_string(),
    }
}
