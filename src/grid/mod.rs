//! Dimensions and coordinate grids.
//!
//! A [`DimensionGrid`] is a generic Cartesian container: it only guarantees that
//! every axis is strictly increasing. Physical bounds (angles within [0, 180])
//! are enforced by the compliance rules in [`crate::spec`].

mod dimension;
mod dimension_grid;
mod point;

pub use dimension::{Dimension, DimensionSet};
pub use dimension_grid::{DimensionGrid, OutOfRangePolicy};
pub use point::DimensionPoint;
