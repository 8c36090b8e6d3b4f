//! Library side of the `dials` command: schema loading, `--set` parsing and
//! report rendering.

use std::{fmt::Write, fs, path::Path as FilePath};

use dials_schema::{Path, Schema, SchemaInput, Value, schema_data};
use dials_store::{Binding, SchemaId, ScopedLifecycle, Store, StoreConfig, Values};
use tracing::{debug, info};

pub mod error;

pub use error::{Error, Result};

/// Read a RON schema from `file`, optionally wrapped in a folder `name`.
pub fn load_schema(file: &FilePath, name: Option<&str>) -> Result<SchemaInput> {
    let source = fs::read_to_string(file).map_err(|e| Error::read(file, e))?;
    let schema = Schema::from_ron(&source)?;
    debug!(file = %file.display(), entries = schema.len(), "schema loaded");
    Ok(match name {
        Some(name) => SchemaInput::named(name, schema),
        None => SchemaInput::root(schema),
    })
}

/// Read a store configuration, or the defaults when no file is given.
pub fn load_store_config(file: Option<&FilePath>) -> Result<StoreConfig> {
    let Some(file) = file else {
        return Ok(StoreConfig::default());
    };
    let source = fs::read_to_string(file).map_err(|e| Error::read(file, e))?;
    Ok(StoreConfig::from_ron(&source)?)
}

/// Parse a command-line value. RON literals keep their type; anything else is
/// text.
pub fn parse_value(raw: &str) -> Value {
    ron::from_str::<Value>(raw).unwrap_or_else(|_| Value::Text(raw.to_string()))
}

/// Split `PATH=VALUE`.
pub fn parse_assignment(raw: &str) -> Result<(Path, Value)> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::Assignment(raw.to_string()))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(Error::Assignment(raw.to_string()));
    }
    Ok((Path::from(path), parse_value(value.trim())))
}

/// One line per input: path, kind and declared value, in display order.
pub fn render_paths(input: &SchemaInput) -> Result<String> {
    let data = schema_data(input)?;
    let width = data
        .inputs()
        .map(|(p, _)| p.as_str().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (path, leaf) in data.inputs() {
        let kind = leaf.kind.name();
        if leaf.has_value() {
            writeln!(out, "{:width$}  {:8}  {}", path.as_str(), kind, leaf.value, width = width).ok();
        } else {
            writeln!(out, "{:width$}  {}", path.as_str(), kind, width = width).ok();
        }
    }
    Ok(out)
}

/// Mount `input` in `store`, apply `sets` atomically and return the consumer
/// values. Assignment paths may be full paths or leaf names.
pub fn mount_values(store: &Store, input: &SchemaInput, sets: &[(Path, Value)]) -> Result<Values> {
    let scope = ScopedLifecycle::new();
    let binding = Binding::bind(store, SchemaId::unique(), input, &scope)?;
    scope.commit();
    if let Some(err) = binding.mount_error() {
        return Err(err.into());
    }
    info!(paths = binding.paths().len(), "schema mounted");

    let writes = sets
        .iter()
        .map(|(path, value)| (resolve(&binding, path), value.clone()))
        .collect::<Vec<_>>();
    let applied = store.set_values(writes);
    let values = binding.values();
    scope.teardown();
    applied?;
    Ok(values)
}

/// Map a leaf name to the binding's full path when it is not a path itself.
fn resolve(binding: &Binding, path: &Path) -> Path {
    if binding.paths().contains(path) {
        return path.clone();
    }
    binding
        .paths()
        .iter()
        .find(|p| p.leaf_name() == path.as_str())
        .cloned()
        .unwrap_or_else(|| path.clone())
}

/// Render values as `name = value` lines, or as a JSON object.
pub fn render_values(values: &Values, json: bool) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(values)?;
        out.push('\n');
        return Ok(out);
    }
    let mut out = String::new();
    for (name, value) in values {
        writeln!(out, "{} = {}", name, value).ok();
    }
    Ok(out)
}
