//! Raw RON form of a schema and its conversion to [`Schema`].
//!
//! Files are parsed with implicit `Some`, so optional fields take plain
//! values:
//!
//! ```ron
//! (
//!     entries: [
//!         (name: "speed", input: number(value: 2.0, min: 0.0, max: 10.0)),
//!         (name: "visible", input: value(true), label: "Visible"),
//!         (name: "camera", folder: (collapsed: true, entries: [
//!             (name: "fov", input: value(45.0)),
//!         ])),
//!     ],
//! )
//! ```

use serde::Deserialize;

use crate::{
    Color, FolderSettings, Input, InputKind, Schema, SchemaItem, Value, error::SchemaError,
    schema::Folder,
};

/// Top level of a schema file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSchema {
    /// Entries in declaration order.
    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

/// One named entry: exactly one of `input` or `folder` must be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEntry {
    /// Entry name; becomes one path segment.
    pub name: String,
    /// Input description.
    #[serde(default)]
    pub input: Option<RawInput>,
    /// Nested folder.
    #[serde(default)]
    pub folder: Option<RawFolder>,
    /// Display label (inputs and folders).
    #[serde(default)]
    pub label: Option<String>,
    /// Sibling sort key (inputs and folders).
    #[serde(default)]
    pub order: Option<i32>,
    /// Tooltip (inputs only).
    #[serde(default)]
    pub hint: Option<String>,
    /// Reject user writes (inputs only).
    #[serde(default)]
    pub readonly: Option<bool>,
    /// Grey out the widget (inputs only).
    #[serde(default)]
    pub disabled: Option<bool>,
}

/// Raw folder body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFolder {
    /// Nested entries.
    #[serde(default)]
    pub entries: Vec<RawEntry>,
    /// Start collapsed.
    #[serde(default)]
    pub collapsed: bool,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Sibling sort key.
    #[serde(default)]
    pub order: Option<i32>,
}

/// Raw input description.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawInput {
    /// Plain value; the kind is inferred.
    Value(Value),
    /// Number with optional bounds.
    Number {
        /// Initial value.
        value: f64,
        /// Lower bound.
        #[serde(default)]
        min: Option<f64>,
        /// Upper bound.
        #[serde(default)]
        max: Option<f64>,
        /// Increment.
        #[serde(default)]
        step: Option<f64>,
    },
    /// Checkbox.
    Boolean(bool),
    /// Free text.
    Text(String),
    /// Color given as hex or CSS name.
    Color(Color),
    /// Vector with optional per-component bounds.
    Vector {
        /// Initial components; fixes the dimension.
        value: Vec<f64>,
        /// Lower bound.
        #[serde(default)]
        min: Option<f64>,
        /// Upper bound.
        #[serde(default)]
        max: Option<f64>,
    },
    /// Select among options.
    Select {
        /// Initial option.
        value: Value,
        /// Allowed options.
        options: Vec<Value>,
    },
    /// Interval inside `[min, max]`.
    Interval {
        /// Initial `(lo, hi)`.
        value: (f64, f64),
        /// Lowest permitted value.
        min: f64,
        /// Highest permitted value.
        max: f64,
    },
    /// Push button.
    Button,
}

impl RawInput {
    /// Convert to a descriptor. Fails only when inference finds no kind.
    fn into_input(self) -> Result<Input, String> {
        let input = match self {
            Self::Value(v) => return Input::infer(v),
            Self::Number {
                value,
                min,
                max,
                step,
            } => Input::new(InputKind::Number { min, max, step }, Value::Number(value)),
            Self::Boolean(b) => Input::boolean(b),
            Self::Text(s) => Input::text(s),
            Self::Color(c) => Input::color(c),
            Self::Vector { value, min, max } => Input::new(
                InputKind::Vector {
                    dims: value.len(),
                    min,
                    max,
                },
                Value::Vector(value),
            ),
            Self::Select { value, options } => Input::select(value, options),
            Self::Interval {
                value: (lo, hi),
                min,
                max,
            } => Input::interval(lo, hi, min, max),
            Self::Button => Input::button(),
        };
        Ok(input)
    }
}

impl RawSchema {
    /// Convert to a [`Schema`], rejecting entries that are not exactly one of
    /// input or folder.
    pub fn into_schema(self) -> Result<Schema, SchemaError> {
        let mut schema = Schema::new();
        for entry in self.entries {
            let (name, item) = entry.into_item()?;
            schema.push(name, item);
        }
        Ok(schema)
    }
}

impl RawEntry {
    /// Convert one entry, applying entry-level settings.
    fn into_item(self) -> Result<(String, SchemaItem), SchemaError> {
        let Self {
            name,
            input,
            folder,
            label,
            order,
            hint,
            readonly,
            disabled,
        } = self;
        let item = match (input, folder) {
            (Some(raw), None) => {
                let mut input = raw.into_input().map_err(|reason| SchemaError::Unrecognized {
                    name: name.clone(),
                    reason,
                })?;
                input.settings.label = label;
                input.settings.hint = hint;
                input.settings.order = order.unwrap_or_default();
                input.settings.readonly = readonly.unwrap_or_default();
                input.settings.disabled = disabled.unwrap_or_default();
                SchemaItem::Input(input)
            }
            (None, Some(raw)) => {
                if let Some(field) = [
                    ("hint", hint.is_some()),
                    ("readonly", readonly.is_some()),
                    ("disabled", disabled.is_some()),
                ]
                .into_iter()
                .find_map(|(field, set)| set.then_some(field))
                {
                    return Err(SchemaError::Unrecognized {
                        name,
                        reason: format!("'{}' applies to inputs, not folders", field),
                    });
                }
                let settings = FolderSettings {
                    collapsed: raw.collapsed,
                    label: raw.label.or(label),
                    order: raw.order.or(order).unwrap_or_default(),
                };
                let schema = RawSchema {
                    entries: raw.entries,
                }
                .into_schema()?;
                SchemaItem::Folder(Folder { schema, settings })
            }
            (Some(_), Some(_)) => {
                return Err(SchemaError::Unrecognized {
                    name,
                    reason: "has both an input and a folder".to_string(),
                });
            }
            (None, None) => {
                return Err(SchemaError::Unrecognized {
                    name,
                    reason: "has neither an input nor a folder".to_string(),
                });
            }
        };
        Ok((name, item))
    }
}
