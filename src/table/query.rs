//! Index resolution and multilinear interpolation kernels.

use ndarray::{ArrayD, IxDyn};

use super::TableValue;
use crate::error::{PoemError, Result};
use crate::grid::{DimensionGrid, DimensionPoint, OutOfRangePolicy};

/// Reject point dimensions the grid does not have.
pub(crate) fn check_known(grid: &DimensionGrid, point: &DimensionPoint) -> Result<()> {
    let set = grid.dimension_set();
    if let Some(unknown) = point.names().find(|n| !set.contains(n)) {
        return Err(PoemError::dimension_mismatch(format!(
            "dimension {} is not part of ({})",
            unknown,
            set.names().join(", ")
        )));
    }
    Ok(())
}

/// Node index per axis for a nearest lookup.
///
/// Singleton axes may be omitted from the point.
pub(crate) fn nearest_indices(
    grid: &DimensionGrid,
    point: &DimensionPoint,
    policy: OutOfRangePolicy,
) -> Result<Vec<usize>> {
    check_known(grid, point)?;
    (0..grid.ndims())
        .map(|axis| {
            let name = grid.dimension_name(axis);
            match point.get(name) {
                Some(value) => grid.nearest_index(axis, value, policy),
                None if grid.values_at(axis).len() == 1 => Ok(0),
                None => Err(PoemError::dimension_mismatch(format!(
                    "point does not give a value for dimension {}",
                    name
                ))),
            }
        })
        .collect()
}

/// Per-axis (index, weight) pairs of the cell surrounding a point.
pub(crate) fn interp_weights(
    grid: &DimensionGrid,
    point: &DimensionPoint,
    extrapolation: OutOfRangePolicy,
) -> Result<Vec<Vec<(usize, f64)>>> {
    check_known(grid, point)?;
    (0..grid.ndims())
        .map(|axis| {
            let name = grid.dimension_name(axis);
            let coords = grid.values_at(axis);
            let Some(x) = point.get(name) else {
                if coords.len() == 1 {
                    return Ok(vec![(0, 1.0)]);
                }
                return Err(PoemError::dimension_mismatch(format!(
                    "dimension {} has {} values and is not given in the point, slice it first",
                    name,
                    coords.len()
                )));
            };
            grid.check_range(axis, x, extrapolation)?;
            if coords.len() == 1 {
                return Ok(vec![(0, 1.0)]);
            }
            let x = x.clamp(coords[0], coords[coords.len() - 1]);
            let lower = coords
                .partition_point(|&c| c <= x)
                .saturating_sub(1)
                .min(coords.len() - 2);
            let (x0, x1) = (coords[lower], coords[lower + 1]);
            let t = (x - x0) / (x1 - x0);
            Ok(vec![(lower, 1.0 - t), (lower + 1, t)])
        })
        .collect()
}

/// Tensor product of the per-axis weights over the `2^k` surrounding cells.
pub(crate) fn multilinear<T: TableValue>(values: &ArrayD<T>, weights: &[Vec<(usize, f64)>]) -> f64 {
    let mut index = vec![0usize; weights.len()];
    accumulate(values, weights, 0, 1.0, &mut index)
}

fn accumulate<T: TableValue>(
    values: &ArrayD<T>,
    weights: &[Vec<(usize, f64)>],
    axis: usize,
    weight: f64,
    index: &mut Vec<usize>,
) -> f64 {
    if axis == weights.len() {
        return weight * values[IxDyn(index)].to_f64();
    }
    let mut total = 0.0;
    for &(i, w) in &weights[axis] {
        if w == 0.0 {
            continue;
        }
        index[axis] = i;
        total += accumulate(values, weights, axis + 1, weight * w, index);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Dimension, DimensionSet};

    fn grid() -> DimensionGrid {
        let set = DimensionSet::new(vec![
            Dimension::new("X", "-", "x"),
            Dimension::new("Y", "-", "y"),
        ])
        .unwrap();
        DimensionGrid::with_values(set, vec![vec![0.0, 1.0], vec![0.0, 2.0, 4.0]]).unwrap()
    }

    #[test]
    fn test_bilinear_center() {
        let grid = grid();
        let values = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, 2.0, 3.0, 3.0, 4.0, 5.0]).unwrap();
        let point = DimensionPoint::from([("X", 0.5), ("Y", 1.0)]);
        let weights = interp_weights(&grid, &point, OutOfRangePolicy::Error).unwrap();
        assert!((multilinear(&values, &weights) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_exact_node_ignores_neighbours() {
        let grid = grid();
        let values = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, f64::NAN, 3.0, 3.0, 4.0, 5.0]).unwrap();
        let point = DimensionPoint::from([("X", 1.0), ("Y", 4.0)]);
        let weights = interp_weights(&grid, &point, OutOfRangePolicy::Error).unwrap();
        assert_eq!(multilinear(&values, &weights), 5.0);
    }

    #[test]
    fn test_missing_axis_is_mismatch() {
        let point = DimensionPoint::from([("X", 0.5)]);
        assert!(matches!(
            interp_weights(&grid(), &point, OutOfRangePolicy::Clamp),
            Err(PoemError::DimensionMismatch(_))
        ));
        assert!(matches!(
            nearest_indices(&grid(), &point, OutOfRangePolicy::Clamp),
            Err(PoemError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_unknown_axis_is_mismatch() {
        let point = DimensionPoint::from([("X", 0.5), ("Y", 1.0), ("Z", 0.0)]);
        assert!(matches!(
            nearest_indices(&grid(), &point, OutOfRangePolicy::Clamp),
            Err(PoemError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_extrapolation_clamps_or_fails() {
        let grid = grid();
        let point = DimensionPoint::from([("X", 2.0), ("Y", 1.0)]);
        assert!(matches!(
            interp_weights(&grid, &point, OutOfRangePolicy::Error),
            Err(PoemError::OutOfRange { .. })
        ));
        let weights = interp_weights(&grid, &point, OutOfRangePolicy::Clamp).unwrap();
        assert_eq!(weights[0], vec![(0, 0.0), (1, 1.0)]);
    }
}
