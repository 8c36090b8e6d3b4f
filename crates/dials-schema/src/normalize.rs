//! Schema normalization: two call shapes in, one canonical tree out.

use std::collections::HashSet;

use crate::{
    FolderSettings, Input, Path, Schema, SchemaItem,
    error::SchemaError,
    path::SEPARATOR,
    tree::{NodeId, NodeKind, SchemaTree},
};

/// The two accepted ways of handing a schema to the store.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaInput {
    /// Use the schema as the root; settings apply to the implicit root folder.
    Root {
        /// Root entries.
        schema: Schema,
        /// Settings for the root folder.
        settings: Option<FolderSettings>,
    },
    /// Wrap the schema in a synthetic folder named `name`.
    Named {
        /// Name of the synthetic folder.
        name: String,
        /// Folder contents.
        schema: Schema,
        /// Settings for the synthetic folder.
        settings: Option<FolderSettings>,
    },
}

impl SchemaInput {
    /// Root form.
    pub fn root(schema: Schema) -> Self {
        Self::Root {
            schema,
            settings: None,
        }
    }

    /// Named form: `schema` is wrapped in a folder called `name`.
    pub fn named(name: impl Into<String>, schema: Schema) -> Self {
        Self::Named {
            name: name.into(),
            schema,
            settings: None,
        }
    }

    /// Attach folder settings (to the root or the synthetic folder).
    #[must_use]
    pub fn with_settings(mut self, folder: FolderSettings) -> Self {
        match &mut self {
            Self::Root { settings, .. } | Self::Named { settings, .. } => *settings = Some(folder),
        }
        self
    }
}

impl From<Schema> for SchemaInput {
    fn from(schema: Schema) -> Self {
        Self::root(schema)
    }
}

/// Normalize either call shape into a validated [`SchemaTree`].
///
/// Names are checked for emptiness, the separator and duplicates; inferred
/// values get a concrete kind; every input's constraints and declared value
/// are validated. Siblings are stably sorted by their `order` setting.
pub fn normalize(input: &SchemaInput) -> Result<SchemaTree, SchemaError> {
    match input {
        SchemaInput::Root { schema, settings } => {
            let mut tree = SchemaTree::with_root(settings.clone().unwrap_or_default());
            build(&mut tree, NodeId::ROOT, schema)?;
            Ok(tree)
        }
        SchemaInput::Named {
            name,
            schema,
            settings,
        } => {
            check_name(name, &Path::root())?;
            let mut tree = SchemaTree::with_root(FolderSettings::default());
            let folder = tree.attach(
                NodeId::ROOT,
                name,
                NodeKind::Folder {
                    settings: settings.clone().unwrap_or_default(),
                    children: Vec::new(),
                },
            );
            build(&mut tree, folder, schema)?;
            Ok(tree)
        }
    }
}

/// Attach the entries of `schema` beneath `parent`, recursing into folders.
fn build(tree: &mut SchemaTree, parent: NodeId, schema: &Schema) -> Result<(), SchemaError> {
    let folder_path = tree.node(parent).path.clone();
    let mut seen = HashSet::new();
    for (name, _) in schema.entries() {
        check_name(name, &folder_path)?;
        if !seen.insert(name.as_str()) {
            return Err(SchemaError::DuplicateName {
                folder: folder_path.to_string(),
                name: name.clone(),
            });
        }
    }

    let mut entries: Vec<&(String, SchemaItem)> = schema.entries().iter().collect();
    entries.sort_by_key(|(_, item)| item_order(item));

    for (name, item) in entries {
        match item {
            SchemaItem::Input(input) => {
                let input = checked(input.clone(), &folder_path.join(name))?;
                tree.attach(parent, name, NodeKind::Input(input));
            }
            SchemaItem::Value(value) => {
                let input =
                    Input::infer(value.clone()).map_err(|reason| SchemaError::Unrecognized {
                        name: name.clone(),
                        reason,
                    })?;
                let input = checked(input, &folder_path.join(name))?;
                tree.attach(parent, name, NodeKind::Input(input));
            }
            SchemaItem::Folder(folder) => {
                let id = tree.attach(
                    parent,
                    name,
                    NodeKind::Folder {
                        settings: folder.settings.clone(),
                        children: Vec::new(),
                    },
                );
                build(tree, id, &folder.schema)?;
            }
        }
    }
    Ok(())
}

/// Reject empty names and names containing the separator.
fn check_name(name: &str, folder: &Path) -> Result<(), SchemaError> {
    if name.is_empty() {
        return Err(SchemaError::EmptyName {
            folder: folder.to_string(),
        });
    }
    if name.contains(SEPARATOR) {
        return Err(SchemaError::SeparatorInName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Validate constraints and coerce the declared value.
fn checked(mut input: Input, path: &Path) -> Result<Input, SchemaError> {
    if let Some(reason) = input.kind.constraint_problem() {
        return Err(SchemaError::InvalidConstraint {
            path: path.to_string(),
            reason,
        });
    }
    input.value = input
        .validate(input.value.clone())
        .map_err(|source| SchemaError::InvalidInitial {
            path: path.to_string(),
            source,
        })?;
    Ok(input)
}

/// Sort key of an entry among its siblings.
fn item_order(item: &SchemaItem) -> i32 {
    match item {
        SchemaItem::Input(input) => input.settings.order,
        SchemaItem::Value(_) => 0,
        SchemaItem::Folder(folder) => folder.settings.order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Value, error::ValidationError};

    #[test]
    fn named_form_wraps_in_folder() {
        let settings = FolderSettings {
            collapsed: true,
            ..FolderSettings::default()
        };
        let input = SchemaInput::named("panel", Schema::new().value("x", 1.0))
            .with_settings(settings.clone());
        let tree = normalize(&input).unwrap();
        let panel = tree.children(tree.root())[0];
        let node = tree.node(panel);
        assert_eq!(node.name, "panel");
        match &node.kind {
            NodeKind::Folder { settings: s, children } => {
                assert_eq!(s, &settings);
                assert_eq!(children.len(), 1);
            }
            NodeKind::Input(_) => panic!("expected a folder"),
        }
        let x = tree.find(&Path::from("panel.x")).unwrap();
        assert_eq!(tree.node(x).parent, Some(panel));
    }

    #[test]
    fn root_form_applies_settings_to_root() {
        let settings = FolderSettings {
            label: Some("Root".into()),
            ..FolderSettings::default()
        };
        let tree =
            normalize(&SchemaInput::root(Schema::new().value("x", 1.0)).with_settings(settings.clone()))
                .unwrap();
        match &tree.node(tree.root()).kind {
            NodeKind::Folder { settings: s, .. } => assert_eq!(s, &settings),
            NodeKind::Input(_) => panic!("root must be a folder"),
        }
        assert!(tree.find(&Path::from("x")).is_some());
    }

    #[test]
    fn separator_in_name_is_rejected() {
        let err = normalize(&Schema::new().value("a.b", 1.0).into()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::SeparatorInName {
                name: "a.b".into()
            }
        );
        let err = normalize(&SchemaInput::named("x.y", Schema::new())).unwrap_err();
        assert!(matches!(err, SchemaError::SeparatorInName { .. }));
    }

    #[test]
    fn empty_and_duplicate_names_are_rejected() {
        assert!(matches!(
            normalize(&Schema::new().value("", 1.0).into()),
            Err(SchemaError::EmptyName { .. })
        ));
        let schema = Schema::new().folder("f", Schema::new().value("x", 1.0).value("x", true));
        assert_eq!(
            normalize(&schema.into()).unwrap_err(),
            SchemaError::DuplicateName {
                folder: "f".into(),
                name: "x".into()
            }
        );
    }

    #[test]
    fn uninferable_value_is_unrecognized() {
        let err = normalize(&Schema::new().value("x", Value::Unit).into()).unwrap_err();
        assert!(matches!(err, SchemaError::Unrecognized { .. }));
    }

    #[test]
    fn invalid_initial_value_is_rejected() {
        let schema = Schema::new().input("x", Input::number(20.0).max(10.0));
        match normalize(&schema.into()).unwrap_err() {
            SchemaError::InvalidInitial { path, source } => {
                assert_eq!(path, "x");
                assert!(matches!(source, ValidationError::OutOfRange { .. }));
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn order_setting_sorts_siblings_stably() {
        let schema = Schema::new()
            .value("a", 1.0)
            .input("b", Input::number(1.0).order(-1))
            .value("c", 1.0)
            .input("d", Input::number(1.0).order(-1));
        let tree = normalize(&schema.into()).unwrap();
        let names: Vec<&str> = tree
            .children(tree.root())
            .iter()
            .map(|id| tree.node(*id).name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn preorder_descends_before_siblings() {
        let schema = Schema::new()
            .value("a", 1.0)
            .folder("f", Schema::new().value("x", 1.0).folder("g", Schema::new().value("y", 1.0)))
            .value("b", 1.0);
        let tree = normalize(&schema.into()).unwrap();
        let paths: Vec<&str> = tree.preorder().map(|(_, n)| n.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "f", "f.x", "f.g", "f.g.y", "b"]);
    }
}
