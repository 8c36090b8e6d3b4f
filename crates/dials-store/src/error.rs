use std::result::Result as StdResult;

use dials_schema::{Path, SchemaError, ValidationError};
use thiserror::Error;

/// Convenient result type for the store crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for store and binding operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The schema could not be normalized.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// A write was rejected by the input's constraints. The prior value is kept.
    #[error("invalid value for '{path}': {source}")]
    Validation {
        /// Path that was written.
        path: Path,
        /// Constraint that failed.
        #[source]
        source: ValidationError,
    },

    /// No entry is mounted at the path.
    #[error("unknown path '{path}'")]
    UnknownPath {
        /// Path that was queried.
        path: Path,
    },

    /// Store configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Build an unknown-path error.
    pub(crate) fn unknown(path: &Path) -> Self {
        Self::UnknownPath { path: path.clone() }
    }

    /// Build a validation error for `path`.
    pub(crate) fn invalid(path: &Path, source: ValidationError) -> Self {
        Self::Validation {
            path: path.clone(),
            source,
        }
    }
}
