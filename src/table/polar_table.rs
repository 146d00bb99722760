//! Typed N-D tables bound to a dimension grid.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Axis, IxDyn, Zip};
use tracing::debug;

use super::query;
use super::{Datatype, TableValue};
use crate::error::{PoemError, Result};
use crate::grid::{DimensionGrid, DimensionPoint, OutOfRangePolicy};
use crate::io::DeferredSource;

/// Backing storage: either materialized, or pending a read from a container.
#[derive(Debug, Clone)]
struct Storage<T> {
    cell: OnceLock<ArrayD<T>>,
    source: Option<DeferredSource>,
}

impl<T> Storage<T> {
    fn loaded(values: ArrayD<T>) -> Self {
        Self {
            cell: OnceLock::from(values),
            source: None,
        }
    }
}

/// A dense N-D array of `T` with the shape of its [`DimensionGrid`].
///
/// Query operations (`slice`, `squeeze`, `nearest`, `interp`) never mutate the
/// table; shape-changing ones return a new table over a derived grid.
#[derive(Debug, Clone)]
pub struct PolarTable<T: TableValue> {
    name: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    grid: Arc<DimensionGrid>,
    storage: Storage<T>,
    filled: bool,
}

impl<T: TableValue> PolarTable<T> {
    /// Create an unfilled table. The grid must have values on every axis.
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
        grid: Arc<DimensionGrid>,
    ) -> Result<Self> {
        let name = name.into();
        if !grid.is_filled() {
            return Err(PoemError::invalid_grid(format!(
                "cannot build table {} on a grid with empty axes",
                name
            )));
        }
        let values = ArrayD::from_elem(IxDyn(&grid.shape()), T::default());
        Ok(Self {
            name,
            unit: unit.into(),
            description: description.into(),
            attributes: BTreeMap::new(),
            grid,
            storage: Storage::loaded(values),
            filled: false,
        })
    }

    /// Create a table holding `values`.
    pub fn from_array(
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
        grid: Arc<DimensionGrid>,
        values: ArrayD<T>,
    ) -> Result<Self> {
        let mut table = Self::new(name, unit, description, grid)?;
        table.set_values(values)?;
        Ok(table)
    }

    /// Table whose values are read from a container on first access.
    pub(crate) fn deferred(
        name: String,
        unit: String,
        description: String,
        grid: Arc<DimensionGrid>,
        source: DeferredSource,
    ) -> Self {
        Self {
            name,
            unit,
            description,
            attributes: BTreeMap::new(),
            grid,
            storage: Storage {
                cell: OnceLock::new(),
                source: Some(source),
            },
            filled: true,
        }
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the table.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Unit of the values.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Set the unit of the values.
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = unit.into();
    }

    /// Free text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Extra key/value attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Mutable access to the extra attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.attributes
    }

    /// The grid the table is indexed by.
    pub fn dimension_grid(&self) -> &DimensionGrid {
        &self.grid
    }

    /// Shared handle on the grid.
    pub fn grid(&self) -> &Arc<DimensionGrid> {
        &self.grid
    }

    /// Storage datatype.
    pub fn datatype(&self) -> Datatype {
        T::DATATYPE
    }

    /// Number of axes.
    pub fn ndims(&self) -> usize {
        self.grid.ndims()
    }

    /// Shape, equal to the grid shape.
    pub fn shape(&self) -> Vec<usize> {
        self.grid.shape()
    }

    /// Number of cells.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Extent of an axis.
    pub fn bounds(&self, dimension: &str) -> Result<(f64, f64)> {
        self.grid.bounds(dimension)
    }

    /// True once every cell has been assigned.
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// True when values are in memory (always the case unless lazily loaded).
    pub fn is_loaded(&self) -> bool {
        self.storage.cell.get().is_some()
    }

    fn array(&self) -> Result<&ArrayD<T>> {
        if let Some(values) = self.storage.cell.get() {
            return Ok(values);
        }
        let source = self
            .storage
            .source
            .as_ref()
            .ok_or_else(|| PoemError::NotFilled(self.name.clone()))?;
        debug!("Loading values of table {} from {}", self.name, source);
        let values = source.read::<T>(&self.grid.shape())?;
        Ok(self.storage.cell.get_or_init(|| values))
    }

    fn filled_array(&self) -> Result<&ArrayD<T>> {
        if !self.filled {
            return Err(PoemError::NotFilled(self.name.clone()));
        }
        self.array()
    }

    /// Force the values into memory.
    pub fn materialize(&self) -> Result<()> {
        self.array().map(|_| ())
    }

    /// Borrowing view on the values.
    pub fn view(&self) -> Result<ArrayViewD<'_, T>> {
        Ok(self.array()?.view())
    }

    /// Mutable view on the values. Writes are seen by every later read of this table.
    ///
    /// Writing through a view does not mark an unfilled table filled; only
    /// [`PolarTable::fill_with`] and [`PolarTable::set_values`] do.
    pub fn view_mut(&mut self) -> Result<ArrayViewMutD<'_, T>> {
        self.array()?;
        let name = self.name.clone();
        self.storage
            .cell
            .get_mut()
            .map(|values| values.view_mut())
            .ok_or(PoemError::NotFilled(name))
    }

    /// Owned copy of the values; later writes to either side are independent.
    pub fn to_array(&self) -> Result<ArrayD<T>> {
        Ok(self.array()?.clone())
    }

    /// Replace every value. The array must have the grid shape.
    pub fn set_values(&mut self, values: ArrayD<T>) -> Result<()> {
        let expected = self.grid.shape();
        if values.shape() != expected.as_slice() {
            return Err(PoemError::ShapeMismatch {
                expected,
                found: values.shape().to_vec(),
            });
        }
        self.storage = Storage::loaded(values);
        self.filled = true;
        Ok(())
    }

    /// Replace every value from a row-major vector.
    pub fn set_values_flat(&mut self, values: Vec<T>) -> Result<()> {
        let expected = self.grid.shape();
        let found = vec![values.len()];
        let array = ArrayD::from_shape_vec(IxDyn(&expected), values)
            .map_err(|_| PoemError::ShapeMismatch { expected, found })?;
        self.set_values(array)
    }

    /// Set every cell to `value`.
    pub fn fill_with(&mut self, value: T) {
        self.storage = Storage::loaded(ArrayD::from_elem(IxDyn(&self.grid.shape()), value));
        self.filled = true;
    }

    /// Value at a multi-index.
    pub fn value(&self, index: &[usize]) -> Result<T> {
        let values = self.filled_array()?;
        values.get(IxDyn(index)).copied().ok_or_else(|| {
            PoemError::dimension_mismatch(format!(
                "index {:?} is outside table {} of shape {:?}",
                index,
                self.name,
                values.shape()
            ))
        })
    }

    /// Assign a single cell. The table stays unfilled until every cell is set
    /// through [`PolarTable::fill_with`] or [`PolarTable::set_values`].
    pub fn set_value(&mut self, index: &[usize], value: T) -> Result<()> {
        let shape = self.shape();
        if index.len() != shape.len() || index.iter().zip(&shape).any(|(i, len)| i >= len) {
            return Err(PoemError::dimension_mismatch(format!(
                "index {:?} is outside table {} of shape {:?}",
                index, self.name, shape
            )));
        }
        self.view_mut()?[IxDyn(index)] = value;
        Ok(())
    }

    /// Deep copy with fresh storage. The grid stays shared.
    pub fn copy(&self) -> Result<Self> {
        let mut table = self.clone();
        table.storage = Storage::loaded(self.to_array()?);
        Ok(table)
    }

    /// Table where each selected axis is collapsed to its nearest node.
    ///
    /// The derived grid keeps every axis; selected ones have length 1.
    pub fn slice(&self, selector: &DimensionPoint, policy: OutOfRangePolicy) -> Result<Self> {
        let values = self.filled_array()?;
        query::check_known(&self.grid, selector)?;

        let mut selected = Vec::with_capacity(selector.len());
        for (name, value) in selector.iter() {
            let axis = self.grid.index_of(name)?;
            selected.push((axis, self.grid.nearest_index(axis, value, policy)?));
        }

        let mut sliced = values.clone();
        for &(axis, idx) in &selected {
            sliced.collapse_axis(Axis(axis), idx);
        }
        let grid = self.grid.collapsed(&selected);
        Ok(self.derived(Arc::new(grid), sliced))
    }

    /// Table without its length-1 axes, remaining axes in their original order.
    pub fn squeeze(&self) -> Result<Self> {
        let values = self.filled_array()?;
        let removed: Vec<usize> = self
            .grid
            .shape()
            .iter()
            .enumerate()
            .filter(|(_, &len)| len == 1)
            .map(|(axis, _)| axis)
            .collect();
        if removed.is_empty() {
            return Ok(self.clone());
        }

        let mut squeezed = values.clone();
        for &axis in removed.iter().rev() {
            squeezed = squeezed.index_axis_move(Axis(axis), 0);
        }
        let grid = self.grid.without(&removed);
        Ok(self.derived(Arc::new(grid), squeezed))
    }

    /// Value at the grid node nearest to `point`, clamping out of range coordinates.
    pub fn nearest(&self, point: &DimensionPoint) -> Result<T> {
        self.nearest_with(point, OutOfRangePolicy::Clamp)
    }

    /// Value at the grid node nearest to `point`.
    pub fn nearest_with(&self, point: &DimensionPoint, policy: OutOfRangePolicy) -> Result<T> {
        let values = self.filled_array()?;
        let index = query::nearest_indices(&self.grid, point, policy)?;
        Ok(values[IxDyn(&index)])
    }

    /// Multilinear interpolation at `point`.
    pub fn interp(&self, point: &DimensionPoint, extrapolation: OutOfRangePolicy) -> Result<f64> {
        let values = self.filled_array()?;
        let weights = query::interp_weights(&self.grid, point, extrapolation)?;
        Ok(query::multilinear(values, &weights))
    }

    /// Multiply every value in place.
    pub fn multiply_by(&mut self, coeff: T) -> Result<()> {
        self.map_checked("multiply_by", |v| v.checked_mul(coeff))
    }

    /// Add a constant to every value in place.
    pub fn offset(&mut self, value: T) -> Result<()> {
        self.map_checked("offset", |v| v.checked_add(value))
    }

    /// Replace every value by its absolute value.
    pub fn abs(&mut self) -> Result<()> {
        self.map_checked("abs", T::checked_abs)
    }

    /// Cell-wise sum with a table on an equal grid.
    pub fn sum(&self, other: &PolarTable<T>) -> Result<Self> {
        if self.grid != other.grid {
            return Err(PoemError::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }
        let total = Zip::from(self.filled_array()?)
            .and(other.filled_array()?)
            .map_collect(|&a, &b| a.checked_add(b));
        let total = self.unwrap_checked("sum", total)?;
        Ok(self.derived(Arc::clone(&self.grid), total))
    }

    /// Apply `op` to every value; integer overflow leaves the table unchanged.
    fn map_checked(&mut self, operation: &'static str, op: impl Fn(T) -> Option<T>) -> Result<()> {
        let mapped = self.filled_array()?.mapv(op);
        let values = self.unwrap_checked(operation, mapped)?;
        self.storage = Storage::loaded(values);
        Ok(())
    }

    fn unwrap_checked(&self, operation: &'static str, values: ArrayD<Option<T>>) -> Result<ArrayD<T>> {
        if values.iter().any(Option::is_none) {
            return Err(PoemError::Overflow {
                table: self.name.clone(),
                operation,
            });
        }
        Ok(values.mapv(Option::unwrap_or_default))
    }

    /// Arithmetic mean of all values.
    pub fn mean(&self) -> Result<f64> {
        let values = self.filled_array()?;
        let total: f64 = values.iter().map(|v| v.to_f64()).sum();
        Ok(total / values.len() as f64)
    }

    /// Smallest and largest value.
    pub fn min_max(&self) -> Result<(T, T)> {
        let values = self.filled_array()?;
        let mut iter = values.iter().copied();
        let first = iter
            .next()
            .ok_or_else(|| PoemError::NotFilled(self.name.clone()))?;
        Ok(iter.fold((first, first), |(lo, hi), v| {
            (
                if v < lo { v } else { lo },
                if v > hi { v } else { hi },
            )
        }))
    }

    fn derived(&self, grid: Arc<DimensionGrid>, values: ArrayD<T>) -> Self {
        Self {
            name: self.name.clone(),
            unit: self.unit.clone(),
            description: self.description.clone(),
            attributes: self.attributes.clone(),
            grid,
            storage: Storage::loaded(values),
            filled: true,
        }
    }
}

impl<T: TableValue> PartialEq for PolarTable<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name
            || self.unit != other.unit
            || self.description != other.description
            || self.grid != other.grid
            || self.filled != other.filled
        {
            return false;
        }
        match (self.array(), other.array()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Dimension, DimensionSet};

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|v| v as f64).collect()
    }

    fn mppp_grid() -> Arc<DimensionGrid> {
        let set = DimensionSet::new(vec![
            Dimension::new("STW_Coord", "kt", "Speed Through Water"),
            Dimension::new("TWS_Coord", "kt", "True Wind Speed"),
            Dimension::new("TWA_Coord", "deg", "True Wind Angle"),
            Dimension::new("WA_Coord", "deg", "Waves Angle"),
            Dimension::new("Hs_Coord", "m", "Waves Significant Height"),
        ])
        .unwrap();
        let grid = DimensionGrid::with_values(
            set,
            vec![
                (8..=20).map(f64::from).collect(),
                (0..=40).step_by(5).map(f64::from).collect(),
                (0..=180).step_by(15).map(f64::from).collect(),
                (0..=180).step_by(15).map(f64::from).collect(),
                (0..=8).map(f64::from).collect(),
            ],
        )
        .unwrap();
        Arc::new(grid)
    }

    fn ramp_table() -> PolarTable<f64> {
        let grid = mppp_grid();
        let mut table = PolarTable::new("TOTAL_POWER", "kW", "Total power", grid.clone()).unwrap();
        table.set_values_flat(ramp(grid.size())).unwrap();
        table
    }

    fn point() -> DimensionPoint {
        DimensionPoint::from([
            ("STW_Coord", 8.1),
            ("TWS_Coord", 10.0),
            ("TWA_Coord", 0.1),
            ("WA_Coord", 0.0),
            ("Hs_Coord", 0.0),
        ])
    }

    #[test]
    fn test_slice_then_squeeze_shapes() {
        let table = ramp_table();
        assert_eq!(table.shape(), vec![13, 9, 13, 13, 9]);

        let selector = DimensionPoint::from([("TWS_Coord", 10.0), ("WA_Coord", 0.0), ("Hs_Coord", 0.0)]);
        let sliced = table.slice(&selector, OutOfRangePolicy::Error).unwrap();
        assert_eq!(sliced.shape(), vec![13, 1, 13, 1, 1]);
        assert_eq!(sliced.dimension_grid().values("TWS_Coord").unwrap(), &[10.0]);

        let squeezed = sliced.squeeze().unwrap();
        assert_eq!(squeezed.shape(), vec![13, 13]);
        assert_eq!(
            squeezed.dimension_grid().dimension_set().names(),
            vec!["STW_Coord", "TWA_Coord"]
        );
        // Squeezing twice changes nothing
        assert_eq!(squeezed.squeeze().unwrap().shape(), vec![13, 13]);
        // Source untouched
        assert_eq!(table.shape(), vec![13, 9, 13, 13, 9]);
    }

    #[test]
    fn test_nearest_matches_on_sliced_table() {
        let table = ramp_table();
        assert_eq!(table.nearest(&point()).unwrap(), 3042.0);

        let selector = DimensionPoint::from([("TWS_Coord", 10.0), ("WA_Coord", 0.0), ("Hs_Coord", 0.0)]);
        let squeezed = table
            .slice(&selector, OutOfRangePolicy::Error)
            .unwrap()
            .squeeze()
            .unwrap();
        let reduced = DimensionPoint::from([("STW_Coord", 8.1), ("TWA_Coord", 0.1)]);
        assert_eq!(squeezed.nearest(&reduced).unwrap(), 3042.0);
    }

    #[test]
    fn test_nearest_strict_rejects_out_of_range() {
        let table = ramp_table();
        let far = point().with("STW_Coord", 42.0);
        assert!(matches!(
            table.nearest_with(&far, OutOfRangePolicy::Error),
            Err(PoemError::OutOfRange { .. })
        ));
        assert!(table.nearest(&far).is_ok());
    }

    #[test]
    fn test_interp_on_nodes_and_between() {
        let table = ramp_table();
        let exact = DimensionPoint::from([
            ("STW_Coord", 9.0),
            ("TWS_Coord", 10.0),
            ("TWA_Coord", 0.0),
            ("WA_Coord", 0.0),
            ("Hs_Coord", 0.0),
        ]);
        let at_node = table.nearest(&exact).unwrap();
        assert_eq!(table.interp(&exact, OutOfRangePolicy::Error).unwrap(), at_node);

        // A ramp is linear along every axis, so the midpoint is the average
        let mid = exact.clone().with("STW_Coord", 9.5);
        let next = table.nearest(&exact.with("STW_Coord", 10.0)).unwrap();
        let value = table.interp(&mid, OutOfRangePolicy::Error).unwrap();
        assert!((value - (at_node + next) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_interp_requires_every_wide_axis() {
        let table = ramp_table();
        let partial = DimensionPoint::from([("STW_Coord", 9.0), ("TWA_Coord", 0.0)]);
        assert!(matches!(
            table.interp(&partial, OutOfRangePolicy::Clamp),
            Err(PoemError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_view_aliases_and_copy_does_not() {
        let mut table = ramp_table();
        let copy = table.to_array().unwrap();
        table.view_mut().unwrap()[IxDyn(&[0, 0, 0, 0, 0])] = -1.0;
        assert_eq!(table.value(&[0, 0, 0, 0, 0]).unwrap(), -1.0);
        assert_eq!(copy[IxDyn(&[0, 0, 0, 0, 0])], 0.0);

        let mut deep = table.copy().unwrap();
        deep.fill_with(7.0);
        assert_eq!(table.value(&[0, 0, 0, 0, 0]).unwrap(), -1.0);
    }

    #[test]
    fn test_shape_mismatch_on_assign() {
        let mut table = ramp_table();
        let wrong = ArrayD::from_elem(IxDyn(&[13, 9]), 0.0);
        assert!(matches!(
            table.set_values(wrong),
            Err(PoemError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_unfilled_queries_fail() {
        let table = PolarTable::<i32>::new("SOLVER_STATUS", "-", "status", mppp_grid()).unwrap();
        assert!(!table.is_filled());
        assert!(matches!(table.nearest(&point()), Err(PoemError::NotFilled(_))));
    }

    #[test]
    fn test_set_value_does_not_fill() {
        let mut table = PolarTable::<f64>::new("TOTAL_POWER", "kW", "", mppp_grid()).unwrap();
        table.set_value(&[0, 0, 0, 0, 0], 12.0).unwrap();
        assert!(!table.is_filled());
        assert!(matches!(table.nearest(&point()), Err(PoemError::NotFilled(_))));
        assert!(matches!(table.value(&[0, 0, 0, 0, 0]), Err(PoemError::NotFilled(_))));

        table.view_mut().unwrap()[IxDyn(&[0, 0, 0, 0, 1])] = 3.0;
        assert!(!table.is_filled());
        assert_eq!(table.view().unwrap()[IxDyn(&[0, 0, 0, 0, 0])], 12.0);
    }

    #[test]
    fn test_integer_overflow_leaves_values() {
        let grid = mppp_grid();
        let mut status = PolarTable::<i32>::new("SOLVER_STATUS", "-", "", grid.clone()).unwrap();
        status.fill_with(i32::MAX);
        assert!(matches!(
            status.multiply_by(2),
            Err(PoemError::Overflow { operation: "multiply_by", .. })
        ));
        assert!(matches!(
            status.offset(1),
            Err(PoemError::Overflow { operation: "offset", .. })
        ));
        assert_eq!(status.value(&[0, 0, 0, 0, 0]).unwrap(), i32::MAX);

        let mut low = PolarTable::<i32>::new("LOW", "-", "", grid.clone()).unwrap();
        low.fill_with(i32::MIN);
        assert!(matches!(low.abs(), Err(PoemError::Overflow { .. })));
        assert!(matches!(status.sum(&status), Err(PoemError::Overflow { operation: "sum", .. })));

        let mut one = PolarTable::<i32>::new("ONE", "-", "", grid).unwrap();
        one.fill_with(-1);
        assert_eq!(status.sum(&one).unwrap().value(&[0, 0, 0, 0, 0]).unwrap(), i32::MAX - 1);
    }

    #[test]
    fn test_arithmetic_and_statistics() {
        let grid = mppp_grid();
        let mut a = PolarTable::<f64>::new("A", "-", "", grid.clone()).unwrap();
        a.fill_with(2.0);
        a.multiply_by(3.0).unwrap();
        a.offset(-10.0).unwrap();
        a.abs().unwrap();
        assert_eq!(a.min_max().unwrap(), (4.0, 4.0));

        let b = ramp_table();
        let total = a.sum(&b).unwrap();
        assert_eq!(total.value(&[0, 0, 0, 0, 1]).unwrap(), 5.0);
        assert!((b.mean().unwrap() - (b.size() - 1) as f64 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_value_out_of_bounds() {
        let mut table = ramp_table();
        assert!(table.set_value(&[99, 0, 0, 0, 0], 1.0).is_err());
        table.set_value(&[1, 0, 0, 0, 0], 1.5).unwrap();
        assert_eq!(table.value(&[1, 0, 0, 0, 0]).unwrap(), 1.5);
    }
}
