//! Error handling for the dials binary.

use std::{io, path::PathBuf, result};

use thiserror::Error;

/// Convenient result type for dials operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The schema file was invalid.
    #[error("{0}")]
    Schema(#[from] dials_schema::SchemaError),
    /// A store operation failed.
    #[error("{0}")]
    Store(#[from] dials_store::Error),
    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A `--set` argument was not of the form `PATH=VALUE`.
    #[error("expected PATH=VALUE, got '{0}'")]
    Assignment(String),
}

impl Error {
    /// Render for the terminal. Schema parse errors include their location.
    pub fn pretty(&self) -> String {
        match self {
            Self::Schema(e) => e.pretty(),
            other => other.to_string(),
        }
    }

    /// Wrap an I/O error with the file it concerns.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}
