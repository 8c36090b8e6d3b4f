//! Schema authoring, normalization and flattening for the dials store.
//!
//! A [`Schema`] is an ordered, possibly nested set of named inputs and
//! folders. [`normalize`] turns either call shape ([`SchemaInput`]) into a
//! validated arena tree, and [`flatten`] turns that tree into dotted
//! [`Path`]s in display order ([`SchemaData`]).
#![warn(unsafe_op_in_unsafe_fn)]

mod error;
mod flatten;
mod input;
mod normalize;
mod path;
pub mod raw;
mod schema;
mod tree;
mod value;

#[cfg(test)]
mod test_props;
#[cfg(test)]
mod test_ron;

pub use error::{SchemaError, ValidationError};
pub use flatten::{SchemaData, flatten};
pub use input::{Input, InputKind, InputSettings};
pub use normalize::{SchemaInput, normalize};
pub use path::{Path, SEPARATOR};
pub use schema::{Folder, FolderSettings, Schema, SchemaItem};
pub use tree::{Node, NodeId, NodeKind, Preorder, SchemaTree};
pub use value::{Color, Value};

/// Normalize and flatten in one step.
pub fn schema_data(input: &SchemaInput) -> Result<SchemaData, SchemaError> {
    normalize(input).map(|tree| flatten(&tree))
}
