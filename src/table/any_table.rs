//! Datatype-erased table.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Datatype, PolarTable};
use crate::error::{PoemError, Result};
use crate::grid::{DimensionGrid, DimensionPoint, OutOfRangePolicy};

/// A table of either datatype, as stored in a [`Polar`](crate::node::Polar).
#[derive(Debug, Clone, PartialEq)]
pub enum AnyPolarTable {
    /// f64 values.
    Real(PolarTable<f64>),
    /// i32 values.
    Integer(PolarTable<i32>),
}

macro_rules! dispatch {
    ($self:expr, $table:ident => $body:expr) => {
        match $self {
            AnyPolarTable::Real($table) => $body,
            AnyPolarTable::Integer($table) => $body,
        }
    };
}

impl AnyPolarTable {
    /// Table name.
    pub fn name(&self) -> &str {
        dispatch!(self, t => t.name())
    }

    /// Rename the table.
    pub fn rename(&mut self, name: impl Into<String>) {
        dispatch!(self, t => t.rename(name))
    }

    /// Unit of the values.
    pub fn unit(&self) -> &str {
        dispatch!(self, t => t.unit())
    }

    /// Free text description.
    pub fn description(&self) -> &str {
        dispatch!(self, t => t.description())
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        dispatch!(self, t => t.set_description(description))
    }

    /// Extra key/value attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        dispatch!(self, t => t.attributes())
    }

    /// Mutable access to the extra attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        dispatch!(self, t => t.attributes_mut())
    }

    /// The grid the table is indexed by.
    pub fn dimension_grid(&self) -> &DimensionGrid {
        dispatch!(self, t => t.dimension_grid())
    }

    /// Shared handle on the grid.
    pub fn grid(&self) -> &Arc<DimensionGrid> {
        dispatch!(self, t => t.grid())
    }

    /// Storage datatype.
    pub fn datatype(&self) -> Datatype {
        match self {
            AnyPolarTable::Real(_) => Datatype::Real,
            AnyPolarTable::Integer(_) => Datatype::Integer,
        }
    }

    /// Shape, equal to the grid shape.
    pub fn shape(&self) -> Vec<usize> {
        dispatch!(self, t => t.shape())
    }

    /// True once every cell has been assigned.
    pub fn is_filled(&self) -> bool {
        dispatch!(self, t => t.is_filled())
    }

    /// True when values are in memory.
    pub fn is_loaded(&self) -> bool {
        dispatch!(self, t => t.is_loaded())
    }

    /// Force the values into memory.
    pub fn materialize(&self) -> Result<()> {
        dispatch!(self, t => t.materialize())
    }

    /// See [`PolarTable::slice`].
    pub fn slice(&self, selector: &DimensionPoint, policy: OutOfRangePolicy) -> Result<Self> {
        Ok(match self {
            AnyPolarTable::Real(t) => AnyPolarTable::Real(t.slice(selector, policy)?),
            AnyPolarTable::Integer(t) => AnyPolarTable::Integer(t.slice(selector, policy)?),
        })
    }

    /// See [`PolarTable::squeeze`].
    pub fn squeeze(&self) -> Result<Self> {
        Ok(match self {
            AnyPolarTable::Real(t) => AnyPolarTable::Real(t.squeeze()?),
            AnyPolarTable::Integer(t) => AnyPolarTable::Integer(t.squeeze()?),
        })
    }

    /// Nearest value, widened to f64.
    pub fn nearest(&self, point: &DimensionPoint) -> Result<f64> {
        self.nearest_with(point, OutOfRangePolicy::Clamp)
    }

    /// Nearest value with an explicit out of range policy, widened to f64.
    pub fn nearest_with(&self, point: &DimensionPoint, policy: OutOfRangePolicy) -> Result<f64> {
        match self {
            AnyPolarTable::Real(t) => t.nearest_with(point, policy),
            AnyPolarTable::Integer(t) => t.nearest_with(point, policy).map(f64::from),
        }
    }

    /// See [`PolarTable::interp`].
    pub fn interp(&self, point: &DimensionPoint, extrapolation: OutOfRangePolicy) -> Result<f64> {
        dispatch!(self, t => t.interp(point, extrapolation))
    }

    /// Deep copy with fresh storage.
    pub fn copy(&self) -> Result<Self> {
        Ok(match self {
            AnyPolarTable::Real(t) => AnyPolarTable::Real(t.copy()?),
            AnyPolarTable::Integer(t) => AnyPolarTable::Integer(t.copy()?),
        })
    }

    /// Borrow as a real table.
    pub fn as_real(&self) -> Result<&PolarTable<f64>> {
        match self {
            AnyPolarTable::Real(t) => Ok(t),
            AnyPolarTable::Integer(t) => Err(mismatch(t.name(), Datatype::Real, Datatype::Integer)),
        }
    }

    /// Mutably borrow as a real table.
    pub fn as_real_mut(&mut self) -> Result<&mut PolarTable<f64>> {
        match self {
            AnyPolarTable::Real(t) => Ok(t),
            AnyPolarTable::Integer(t) => Err(mismatch(t.name(), Datatype::Real, Datatype::Integer)),
        }
    }

    /// Borrow as an integer table.
    pub fn as_integer(&self) -> Result<&PolarTable<i32>> {
        match self {
            AnyPolarTable::Integer(t) => Ok(t),
            AnyPolarTable::Real(t) => Err(mismatch(t.name(), Datatype::Integer, Datatype::Real)),
        }
    }

    /// Mutably borrow as an integer table.
    pub fn as_integer_mut(&mut self) -> Result<&mut PolarTable<i32>> {
        match self {
            AnyPolarTable::Integer(t) => Ok(t),
            AnyPolarTable::Real(t) => Err(mismatch(t.name(), Datatype::Integer, Datatype::Real)),
        }
    }
}

fn mismatch(name: &str, expected: Datatype, found: Datatype) -> PoemError {
    let label = |d: Datatype| match d {
        Datatype::Real => "double table",
        Datatype::Integer => "int table",
    };
    PoemError::TypeMismatch {
        name: name.to_string(),
        expected: label(expected),
        found: label(found),
    }
}

impl From<PolarTable<f64>> for AnyPolarTable {
    fn from(table: PolarTable<f64>) -> Self {
        AnyPolarTable::Real(table)
    }
}

impl From<PolarTable<i32>> for AnyPolarTable {
    fn from(table: PolarTable<i32>) -> Self {
        AnyPolarTable::Integer(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Dimension, DimensionSet};

    fn status() -> AnyPolarTable {
        let set = DimensionSet::new(vec![Dimension::new("TWS_Coord", "kt", "True Wind Speed")]).unwrap();
        let grid = DimensionGrid::with_values(set, vec![vec![0.0, 10.0]]).unwrap();
        let mut table = PolarTable::<i32>::new("SOLVER_STATUS", "-", "Solver status", Arc::new(grid)).unwrap();
        table.set_values_flat(vec![1, 3]).unwrap();
        table.into()
    }

    #[test]
    fn test_downcast() {
        let table = status();
        assert_eq!(table.datatype(), Datatype::Integer);
        assert!(table.as_integer().is_ok());
        assert!(matches!(table.as_real(), Err(PoemError::TypeMismatch { .. })));
    }

    #[test]
    fn test_integer_interp_is_real() {
        let table = status();
        let point = DimensionPoint::from([("TWS_Coord", 5.0)]);
        assert_eq!(table.interp(&point, OutOfRangePolicy::Error).unwrap(), 2.0);
        assert_eq!(table.nearest(&point).unwrap(), 1.0);
    }
}
