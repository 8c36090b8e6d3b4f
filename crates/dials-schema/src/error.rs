//! Error types for schema authoring and value validation.

use thiserror::Error;

use crate::path::SEPARATOR;

/// Errors produced while parsing or normalizing a schema.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// A name contains the path separator.
    #[error("name '{name}' contains the path separator '{}'", SEPARATOR)]
    SeparatorInName {
        /// The offending name.
        name: String,
    },
    /// A name is empty.
    #[error("empty name in folder '{folder}'")]
    EmptyName {
        /// Path of the folder holding the empty name.
        folder: String,
    },
    /// The same name appears twice within one folder.
    #[error("duplicate name '{name}' in folder '{folder}'")]
    DuplicateName {
        /// Path of the folder holding the duplicate.
        folder: String,
        /// The repeated name.
        name: String,
    },
    /// An entry is neither a recognized input nor a folder.
    #[error("entry '{name}' is neither an input nor a folder: {reason}")]
    Unrecognized {
        /// Name of the entry.
        name: String,
        /// Why the entry was rejected.
        reason: String,
    },
    /// Input constraints contradict each other.
    #[error("invalid constraints for '{path}': {reason}")]
    InvalidConstraint {
        /// Path of the input.
        path: String,
        /// What is inconsistent.
        reason: String,
    },
    /// An input's declared value fails its own validation.
    #[error("invalid initial value for '{path}': {source}")]
    InvalidInitial {
        /// Path of the input.
        path: String,
        /// Underlying validation failure.
        #[source]
        source: ValidationError,
    },
    /// RON parse error with an optional location.
    #[error("schema parse error: {message}")]
    Parse {
        /// 1-based line number, when known.
        line: Option<usize>,
        /// 1-based column number, when known.
        col: Option<usize>,
        /// Human-readable error message.
        message: String,
    },
}

impl SchemaError {
    /// Render a message including the parse location when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Parse {
                line: Some(l),
                col: Some(c),
                message,
            } => format!("schema parse error at {}:{}\n{}", l, c, message),
            other => other.to_string(),
        }
    }
}

/// A value was rejected by an input's constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Value variant does not fit the input kind.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Kind of value the input accepts.
        expected: &'static str,
        /// Kind of value supplied.
        found: &'static str,
    },
    /// Number lies outside the input's bounds.
    #[error("{value} is outside [{}, {}]", fmt_bound(.min), fmt_bound(.max))]
    OutOfRange {
        /// Rejected number.
        value: f64,
        /// Lower bound, if any.
        min: Option<f64>,
        /// Upper bound, if any.
        max: Option<f64>,
    },
    /// Number is not finite.
    #[error("{0} is not a finite number")]
    NotFinite(f64),
    /// Vector dimension differs from the declared one.
    #[error("expected {expected} components, found {found}")]
    WrongDimension {
        /// Declared dimension.
        expected: usize,
        /// Supplied dimension.
        found: usize,
    },
    /// Value is not one of a select input's options.
    #[error("'{0}' is not one of the options")]
    NotAnOption(String),
    /// Text could not be read as a color.
    #[error("'{0}' is not a color")]
    InvalidColor(String),
    /// Interval lower bound exceeds its upper bound.
    #[error("interval [{lo}, {hi}] is reversed")]
    ReversedInterval {
        /// Lower end supplied.
        lo: f64,
        /// Upper end supplied.
        hi: f64,
    },
    /// Input only accepts writes from its owner.
    #[error("input is read-only")]
    ReadOnly,
}

/// Render an optional bound for error messages.
fn fmt_bound(b: &Option<f64>) -> String {
    b.map_or_else(|| "..".to_string(), |v| v.to_string())
}
