//! Error types for POEM.
//!
//! This module provides a unified error handling approach using `thiserror`.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::spec::Violation;

/// Result type alias for POEM operations.
pub type Result<T> = std::result::Result<T, PoemError>;

/// Errors that can occur in POEM.
#[derive(Debug, Error)]
pub enum PoemError {
    /// Coordinates of an axis are not strictly increasing, or the grid is otherwise malformed.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// An assigned array does not have the shape of the grid.
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Selector or point axes are inconsistent with the grid of a table.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A coordinate lies outside the extent of an axis while strict mode was requested.
    #[error("Value {value} is out of range [{min}, {max}] for dimension {dimension}")]
    OutOfRange {
        dimension: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A node or table is not of the requested kind.
    #[error("Type mismatch: {name} is a {found}, expected a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A path segment does not exist.
    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    /// The source node cannot be attached under the target node.
    #[error("Incompatible mount: {0}")]
    IncompatibleMount(String),

    /// A PolarSet already holds a Polar of that mode.
    #[error("PolarSet {polar_set} already holds a {mode} polar")]
    DuplicateMode { polar_set: String, mode: String },

    /// A sibling with the same name already exists.
    #[error("{parent} already has a child named {name}")]
    NameConflict { parent: String, name: String },

    /// A table was queried before every cell was assigned.
    #[error("PolarTable {0} is not filled")]
    NotFilled(String),

    /// An integer table operation produced a value outside the element type.
    #[error("Arithmetic overflow in {operation} on table {table}")]
    Overflow {
        table: String,
        operation: &'static str,
    },

    /// The string does not name a polar mode.
    #[error("Unknown polar mode: {0}")]
    UnknownMode(String),

    /// A keep pattern could not be compiled.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// No rule set is registered for the declared specification version.
    #[error("Specification version v{0} is not supported")]
    UnsupportedVersion(u32),

    /// The structure violates one or more specification rules.
    #[error("Not compliant with specification v{version}: {}", summarize(.violations))]
    SpecViolation {
        version: u32,
        violations: Vec<Violation>,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The container is missing, corrupt or unwritable.
    #[error("Container error on {}: {message}", path.display())]
    ContainerIo { path: PathBuf, message: String },
}

impl PoemError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(message: impl Into<String>) -> Self {
        Self::InvalidGrid(message.into())
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(message: impl Into<String>) -> Self {
        Self::DimensionMismatch(message.into())
    }

    /// Create a PathNotFound error.
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create an IncompatibleMount error.
    pub fn incompatible_mount(message: impl Into<String>) -> Self {
        Self::IncompatibleMount(message.into())
    }

    /// Create a NameConflict error.
    pub fn name_conflict(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NameConflict {
            parent: parent.into(),
            name: name.into(),
        }
    }

    /// Create a ContainerIo error.
    pub fn container(path: &Path, message: impl ToString) -> Self {
        Self::ContainerIo {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("[{}] {}", v.rule, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Attach a path to netCDF failures.
pub(crate) trait ContainerContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> ContainerContext<T> for std::result::Result<T, netcdf::Error> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|e| PoemError::container(path, e))
    }
}

impl<T> ContainerContext<T> for std::result::Result<T, std::io::Error> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|e| PoemError::container(path, e))
    }
}

impl From<netcdf::Error> for PoemError {
    fn from(err: netcdf::Error) -> Self {
        Self::ContainerIo {
            path: PathBuf::new(),
            message: err.to_string(),
        }
    }
}
