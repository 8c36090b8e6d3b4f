//! Flattening a normalized tree into ordered dotted paths.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::warn;

use crate::{
    FolderSettings, Input, Path, Value,
    tree::{NodeKind, SchemaTree},
};

/// Flat view of a schema: inputs and folders keyed by path in display order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaData {
    /// Inputs in depth-first declaration order.
    inputs: IndexMap<Path, Input>,
    /// Folders in depth-first declaration order.
    folders: IndexMap<Path, FolderSettings>,
}

impl SchemaData {
    /// Declared initial value of every input, keyed by path, in order.
    pub fn initial_values(&self) -> IndexMap<Path, Value> {
        self.inputs
            .iter()
            .map(|(p, i)| (p.clone(), i.value.clone()))
            .collect()
    }

    /// Input paths in display order.
    pub fn ordered_paths(&self) -> Vec<Path> {
        self.inputs.keys().cloned().collect()
    }

    /// Folder paths in display order.
    pub fn folder_paths(&self) -> Vec<Path> {
        self.folders.keys().cloned().collect()
    }

    /// Descriptor of the input at `path`.
    pub fn input(&self, path: &str) -> Option<&Input> {
        self.inputs.get(path)
    }

    /// Declared value of the input at `path`.
    pub fn initial_value(&self, path: &str) -> Option<&Value> {
        self.inputs.get(path).map(|i| &i.value)
    }

    /// Inputs with their paths, in order.
    pub fn inputs(&self) -> impl Iterator<Item = (&Path, &Input)> {
        self.inputs.iter()
    }

    /// Folders with their paths, in order.
    pub fn folders(&self) -> impl Iterator<Item = (&Path, &FolderSettings)> {
        self.folders.iter()
    }

    /// Number of inputs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// True when there are no inputs.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Walk the tree depth-first, pre-order, and collect every input and folder.
///
/// Folders expand fully before their next sibling. The result depends only on
/// the tree's structure.
pub fn flatten(tree: &SchemaTree) -> SchemaData {
    let mut data = SchemaData::default();
    let mut by_leaf: HashMap<&str, &Path> = HashMap::new();
    for (_, node) in tree.preorder() {
        match &node.kind {
            NodeKind::Folder { settings, .. } => {
                data.folders.insert(node.path.clone(), settings.clone());
            }
            NodeKind::Input(input) => {
                if let Some(first) = by_leaf.insert(node.name.as_str(), &node.path) {
                    warn!(
                        leaf = %node.name,
                        first = %first,
                        second = %node.path,
                        "leaf name used in more than one folder; values will collide"
                    );
                }
                data.inputs.insert(node.path.clone(), input.clone());
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Schema, SchemaInput, normalize};

    fn flat(input: SchemaInput) -> SchemaData {
        flatten(&normalize(&input).unwrap())
    }

    #[test]
    fn folder_paths_are_prefixed() {
        let data = flat(SchemaInput::root(
            Schema::new().folder("f", Schema::new().value("x", 1.0)),
        ));
        assert_eq!(data.ordered_paths(), vec![Path::from("f.x")]);
        let values = data.initial_values();
        assert_eq!(values.get("f.x"), Some(&Value::Number(1.0)));
        assert_eq!(data.folder_paths(), vec![Path::from("f")]);
    }

    #[test]
    fn empty_schema_yields_nothing() {
        let data = flat(SchemaInput::root(Schema::new()));
        assert!(data.is_empty());
        assert!(data.ordered_paths().is_empty());
        assert!(data.folder_paths().is_empty());
    }

    #[test]
    fn empty_folder_contributes_no_paths() {
        let data = flat(SchemaInput::root(
            Schema::new().folder("empty", Schema::new()).value("x", true),
        ));
        assert_eq!(data.ordered_paths(), vec![Path::from("x")]);
        assert_eq!(data.folder_paths(), vec![Path::from("empty")]);
    }

    #[test]
    fn nested_order_is_depth_first() {
        let data = flat(SchemaInput::named(
            "panel",
            Schema::new()
                .value("a", 1.0)
                .folder(
                    "f",
                    Schema::new()
                        .value("b", 2.0)
                        .folder("g", Schema::new().value("c", 3.0)),
                )
                .value("d", 4.0),
        ));
        let paths: Vec<String> = data.ordered_paths().iter().map(ToString::to_string).collect();
        assert_eq!(
            paths,
            vec!["panel.a", "panel.f.b", "panel.f.g.c", "panel.d"]
        );
    }
}
