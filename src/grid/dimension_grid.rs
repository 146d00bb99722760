//! Cartesian coordinate grids.

use super::{DimensionPoint, DimensionSet};
use crate::error::{PoemError, Result};

/// Policy applied when a requested coordinate lies outside an axis extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutOfRangePolicy {
    /// Fail with `OutOfRange`.
    Error,
    /// Snap to the closest boundary.
    #[default]
    Clamp,
}

/// A Cartesian grid: one strictly increasing coordinate array per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionGrid {
    dimension_set: DimensionSet,
    values: Vec<Vec<f64>>,
}

impl DimensionGrid {
    /// Create an empty grid over a dimension set. Every axis must then be given values.
    pub fn new(dimension_set: DimensionSet) -> Self {
        let values = vec![Vec::new(); dimension_set.len()];
        Self {
            dimension_set,
            values,
        }
    }

    /// Build a grid from a set and its coordinate arrays, in set order.
    pub fn with_values(dimension_set: DimensionSet, values: Vec<Vec<f64>>) -> Result<Self> {
        if values.len() != dimension_set.len() {
            return Err(PoemError::invalid_grid(format!(
                "{} coordinate arrays given for {} dimensions",
                values.len(),
                dimension_set.len()
            )));
        }
        let mut grid = Self::new(dimension_set);
        for (idx, coords) in values.into_iter().enumerate() {
            check_strictly_increasing(grid.dimension_name(idx), &coords)?;
            grid.values[idx] = coords;
        }
        Ok(grid)
    }

    /// Replace the coordinates of an axis.
    pub fn set_values(&mut self, name: &str, coords: Vec<f64>) -> Result<()> {
        let idx = self.dimension_set.index(name).ok_or_else(|| {
            PoemError::dimension_mismatch(format!(
                "unknown dimension {}, available dimensions are ({})",
                name,
                self.dimension_set.names().join(", ")
            ))
        })?;
        check_strictly_increasing(name, &coords)?;
        self.values[idx] = coords;
        Ok(())
    }

    /// The ordered dimension set.
    pub fn dimension_set(&self) -> &DimensionSet {
        &self.dimension_set
    }

    /// Number of axes.
    pub fn ndims(&self) -> usize {
        self.dimension_set.len()
    }

    /// Per-axis lengths in set order.
    pub fn shape(&self) -> Vec<usize> {
        self.values.iter().map(Vec::len).collect()
    }

    /// Number of grid nodes.
    pub fn size(&self) -> usize {
        self.values.iter().map(Vec::len).product()
    }

    /// Length of one axis.
    pub fn len_of(&self, name: &str) -> Result<usize> {
        Ok(self.values(name)?.len())
    }

    /// Position of an axis.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.dimension_set
            .index(name)
            .ok_or_else(|| PoemError::dimension_mismatch(format!("grid has no dimension {}", name)))
    }

    /// Coordinates of an axis by name.
    pub fn values(&self, name: &str) -> Result<&[f64]> {
        let idx = self.index_of(name)?;
        Ok(&self.values[idx])
    }

    /// Coordinates of an axis by position. `idx` must be below the grid's dimension count.
    pub(crate) fn values_at(&self, idx: usize) -> &[f64] {
        &self.values[idx]
    }

    /// Smallest and largest coordinate of an axis.
    pub fn bounds(&self, name: &str) -> Result<(f64, f64)> {
        let coords = self.values(name)?;
        match (coords.first(), coords.last()) {
            (Some(&min), Some(&max)) => Ok((min, max)),
            _ => Err(PoemError::invalid_grid(format!("dimension {} has no values", name))),
        }
    }

    /// True once every axis has at least one coordinate.
    pub fn is_filled(&self) -> bool {
        self.values.iter().all(|v| !v.is_empty())
    }

    /// Every grid node, row-major (last axis varies fastest, as netCDF stores arrays).
    pub fn dimension_points(&self) -> Vec<DimensionPoint> {
        let names = self.dimension_set.names();
        let mut points = Vec::with_capacity(self.size());
        if !self.is_filled() {
            return points;
        }
        let shape = self.shape();
        let mut counter = vec![0usize; self.ndims()];
        loop {
            points.push(
                names
                    .iter()
                    .zip(&counter)
                    .enumerate()
                    .map(|(axis, (name, &i))| (name.to_string(), self.values[axis][i]))
                    .collect(),
            );
            if !advance(&mut counter, &shape) {
                break;
            }
        }
        points
    }

    pub(crate) fn dimension_name(&self, idx: usize) -> &str {
        self.dimension_set.get(idx).map(|d| d.name()).unwrap_or("")
    }

    /// Grid where the listed axes are reduced to the coordinate at the given index.
    pub(crate) fn collapsed(&self, selected: &[(usize, usize)]) -> Self {
        let mut grid = self.clone();
        for &(axis, idx) in selected {
            grid.values[axis] = vec![self.values[axis][idx]];
        }
        grid
    }

    /// Grid without the listed axes.
    pub(crate) fn without(&self, removed: &[usize]) -> Self {
        Self {
            dimension_set: self.dimension_set.without(removed),
            values: self
                .values
                .iter()
                .enumerate()
                .filter(|(i, _)| !removed.contains(i))
                .map(|(_, v)| v.clone())
                .collect(),
        }
    }

    /// Resolve a coordinate to the closest node index of an axis.
    ///
    /// Ties go to the lower index.
    pub(crate) fn nearest_index(&self, axis: usize, value: f64, policy: OutOfRangePolicy) -> Result<usize> {
        let coords = &self.values[axis];
        self.check_range(axis, value, policy)?;
        Ok(nearest_index(coords, value))
    }

    pub(crate) fn check_range(&self, axis: usize, value: f64, policy: OutOfRangePolicy) -> Result<()> {
        let coords = &self.values[axis];
        let (min, max) = (coords[0], coords[coords.len() - 1]);
        if policy == OutOfRangePolicy::Error && !(min..=max).contains(&value) {
            return Err(PoemError::OutOfRange {
                dimension: self.dimension_name(axis).to_string(),
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// Closest index in a strictly increasing array, ties toward the lower index.
pub(crate) fn nearest_index(coords: &[f64], value: f64) -> usize {
    let upper = coords.partition_point(|&c| c < value);
    if upper == 0 {
        0
    } else if upper == coords.len() {
        coords.len() - 1
    } else if value - coords[upper - 1] <= coords[upper] - value {
        upper - 1
    } else {
        upper
    }
}

/// Row-major odometer step. Returns false once every index wrapped.
fn advance(counter: &mut [usize], shape: &[usize]) -> bool {
    for axis in (0..counter.len()).rev() {
        counter[axis] += 1;
        if counter[axis] < shape[axis] {
            return true;
        }
        counter[axis] = 0;
    }
    false
}

fn check_strictly_increasing(name: &str, coords: &[f64]) -> Result<()> {
    if coords.is_empty() {
        return Err(PoemError::invalid_grid(format!("dimension {} has no values", name)));
    }
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(PoemError::invalid_grid(format!(
            "dimension {} has non finite values",
            name
        )));
    }
    if let Some(w) = coords.windows(2).find(|w| w[1] <= w[0]) {
        return Err(PoemError::invalid_grid(format!(
            "values of dimension {} must be strictly increasing ({} then {})",
            name, w[0], w[1]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Dimension;

    fn grid() -> DimensionGrid {
        let set = DimensionSet::new(vec![
            Dimension::new("TWS", "kt", "True Wind Speed"),
            Dimension::new("TWA", "deg", "True Wind Angle"),
        ])
        .unwrap();
        let mut grid = DimensionGrid::new(set);
        grid.set_values("TWS", vec![0.0, 10.0, 20.0]).unwrap();
        grid.set_values("TWA", vec![0.0, 90.0]).unwrap();
        grid
    }

    #[test]
    fn test_set_values_rejects_non_increasing() {
        let mut grid = grid();
        assert!(matches!(
            grid.set_values("TWS", vec![0.0, 10.0, 10.0]),
            Err(PoemError::InvalidGrid(_))
        ));
        assert!(matches!(
            grid.set_values("TWS", vec![5.0, 1.0]),
            Err(PoemError::InvalidGrid(_))
        ));
        assert!(matches!(grid.set_values("TWS", vec![]), Err(PoemError::InvalidGrid(_))));
        // Failed assignments leave the axis untouched
        assert_eq!(grid.values("TWS").unwrap(), &[0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_shape_and_size() {
        let grid = grid();
        assert_eq!(grid.shape(), vec![3, 2]);
        assert_eq!(grid.size(), 6);
        assert_eq!(grid.bounds("TWA").unwrap(), (0.0, 90.0));
    }

    #[test]
    fn test_nearest_index_ties_go_low() {
        let coords = [0.0, 10.0, 20.0];
        assert_eq!(nearest_index(&coords, 5.0), 0);
        assert_eq!(nearest_index(&coords, 5.1), 1);
        assert_eq!(nearest_index(&coords, -3.0), 0);
        assert_eq!(nearest_index(&coords, 99.0), 2);
        assert_eq!(nearest_index(&coords, 20.0), 2);
    }

    #[test]
    fn test_strict_range_check() {
        let grid = grid();
        assert!(matches!(
            grid.nearest_index(0, 25.0, OutOfRangePolicy::Error),
            Err(PoemError::OutOfRange { .. })
        ));
        assert_eq!(grid.nearest_index(0, 25.0, OutOfRangePolicy::Clamp).unwrap(), 2);
    }

    #[test]
    fn test_dimension_points_row_major() {
        let points = grid().dimension_points();
        assert_eq!(points.len(), 6);
        assert_eq!(points[1].get("TWS"), Some(0.0));
        assert_eq!(points[1].get("TWA"), Some(90.0));
        assert_eq!(points[2].get("TWS"), Some(10.0));
    }
}
