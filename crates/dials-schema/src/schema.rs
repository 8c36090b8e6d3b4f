//! Authoring types: ordered schemas of inputs and folders.

use ron::{Options, extensions::Extensions};

use crate::{Input, Value, error::SchemaError, raw::RawSchema};

/// Display settings for a folder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FolderSettings {
    /// Folder starts collapsed.
    pub collapsed: bool,
    /// Display label; the folder's name is used when absent.
    pub label: Option<String>,
    /// Sort key among siblings (stable; default 0).
    pub order: i32,
}

/// A folder: a nested schema plus its display settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Folder {
    /// Entries inside the folder.
    pub schema: Schema,
    /// Display settings.
    pub settings: FolderSettings,
}

/// One named entry of a schema.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaItem {
    /// Fully described input.
    Input(Input),
    /// Plain value; the input kind is inferred during normalization.
    Value(Value),
    /// Nested folder.
    Folder(Folder),
}

/// Ordered mapping from name to input or folder.
///
/// Declaration order is preserved; it drives path order and the key order of
/// consumer values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    /// Entries in declaration order.
    entries: Vec<(String, SchemaItem)>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a described input.
    #[must_use]
    pub fn input(mut self, name: impl Into<String>, input: Input) -> Self {
        self.entries.push((name.into(), SchemaItem::Input(input)));
        self
    }

    /// Append a plain value whose input kind is inferred.
    #[must_use]
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .push((name.into(), SchemaItem::Value(value.into())));
        self
    }

    /// Append a folder with default settings.
    #[must_use]
    pub fn folder(self, name: impl Into<String>, schema: Self) -> Self {
        self.folder_with(name, schema, FolderSettings::default())
    }

    /// Append a folder with explicit settings.
    #[must_use]
    pub fn folder_with(
        mut self,
        name: impl Into<String>,
        schema: Self,
        settings: FolderSettings,
    ) -> Self {
        self.entries
            .push((name.into(), SchemaItem::Folder(Folder { schema, settings })));
        self
    }

    /// Append an arbitrary item.
    pub fn push(&mut self, name: impl Into<String>, item: SchemaItem) {
        self.entries.push((name.into(), item));
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[(String, SchemaItem)] {
        &self.entries
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the schema has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a schema from RON text (see [`crate::raw`] for the format).
    pub fn from_ron(source: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(source)
            .map_err(|e| SchemaError::Parse {
                line: Some(e.span.start.line),
                col: Some(e.span.start.col),
                message: e.code.to_string(),
            })?;
        raw.into_schema()
    }
}
