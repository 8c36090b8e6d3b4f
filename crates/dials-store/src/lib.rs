//! Reference-counted reactive value store for declarative control panels.
//!
//! A [`Store`] keeps one value per dotted [`Path`](dials_schema::Path).
//! Consumers describe their inputs with a [`Schema`](dials_schema::Schema)
//! and attach it through a [`Binding`], which reads a first snapshot
//! synchronously, subscribes to every value-bearing path and defers the mount
//! to a [`Lifecycle`] commit hook. Paths shared by several consumers are
//! reference counted and keep a single value.
#![warn(unsafe_op_in_unsafe_fn)]

mod binding;
mod cache;
mod config;
mod error;
mod lifecycle;
mod store;

use dials_schema::Value;
use indexmap::IndexMap;

pub use binding::{Binding, BindingState};
pub use cache::SchemaId;
pub use config::{DEFAULT_SCHEMA_CACHE_CAPACITY, StoreConfig};
pub use error::{Error, Result};
pub use lifecycle::{Hook, Lifecycle, ScopedLifecycle};
pub use store::{Callback, EntryInfo, Store, Unsubscribe};

/// Consumer value shape: leaf name to value, in declaration order.
pub type Values = IndexMap<String, Value>;
