//! Deferred table payloads.

use std::fmt;
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, IxDyn};

use crate::error::{ContainerContext, PoemError, Result};
use crate::table::TableValue;

/// Where the values of a lazily loaded table live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeferredSource {
    path: PathBuf,
    variable: String,
}

impl DeferredSource {
    /// `variable` is the netCDF path of the variable, without leading `/`.
    pub(crate) fn new(path: &Path, variable: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            variable: variable.into(),
        }
    }

    /// Read the whole variable and reshape it to `shape`.
    pub(crate) fn read<T: TableValue>(&self, shape: &[usize]) -> Result<ArrayD<T>> {
        let file = netcdf::open(&self.path).at(&self.path)?;
        let var = file.variable(&self.variable).ok_or_else(|| {
            PoemError::container(
                &self.path,
                format!("variable {} disappeared from the container", self.variable),
            )
        })?;
        let values = T::read_all(&var).at(&self.path)?;
        let found = values.len();
        ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| PoemError::ShapeMismatch {
            expected: shape.to_vec(),
            found: vec![found],
        })
    }
}

impl fmt::Display for DeferredSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:/{}", self.path.display(), self.variable)
    }
}
