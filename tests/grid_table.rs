mod common;

use ndarray::IxDyn;
use poem::{Dimension, DimensionGrid, DimensionPoint, DimensionSet, OutOfRangePolicy, PoemError};

use common::{mppp_grid, ramp_table};

#[test]
fn test_non_increasing_axis_is_rejected() {
    let set = DimensionSet::new(vec![Dimension::new("TWS_Coord", "kt", "True Wind Speed")]).unwrap();
    let mut grid = DimensionGrid::new(set);

    assert!(matches!(
        grid.set_values("TWS_Coord", vec![0.0, 10.0, 10.0]),
        Err(PoemError::InvalidGrid(_))
    ));
    assert!(matches!(
        grid.set_values("TWS_Coord", vec![5.0, 0.0]),
        Err(PoemError::InvalidGrid(_))
    ));
    grid.set_values("TWS_Coord", vec![0.0, 5.0, 10.0]).unwrap();
    assert_eq!(grid.shape(), vec![3]);
}

#[test]
fn test_slice_then_squeeze_shape() {
    let grid = mppp_grid();
    let table = ramp_table("TOTAL_POWER", "kW", &grid);
    assert_eq!(table.shape(), vec![13, 9, 13, 13, 9]);

    let selector = DimensionPoint::from([("TWS_Coord", 10.0), ("WA_Coord", 0.0), ("Hs_Coord", 0.0)]);
    let sliced = table.slice(&selector, OutOfRangePolicy::Clamp).unwrap();
    assert_eq!(sliced.shape(), vec![13, 1, 13, 1, 1]);

    let squeezed = sliced.squeeze().unwrap();
    assert_eq!(squeezed.shape(), vec![13, 13]);
    assert_eq!(
        squeezed.dimension_grid().dimension_set().names(),
        vec!["STW_Coord", "TWA_Coord"]
    );

    // squeeze is idempotent
    assert_eq!(squeezed.squeeze().unwrap().shape(), vec![13, 13]);
    // the source table is untouched
    assert_eq!(table.shape(), vec![13, 9, 13, 13, 9]);
}

#[test]
fn test_slice_outside_axis_range() {
    let grid = mppp_grid();
    let table = ramp_table("TOTAL_POWER", "kW", &grid);
    let selector = DimensionPoint::from([("TWS_Coord", 55.0)]);

    match table.slice(&selector, OutOfRangePolicy::Error) {
        Err(PoemError::OutOfRange { dimension, max, .. }) => {
            assert_eq!(dimension, "TWS_Coord");
            assert_eq!(max, 40.0);
        }
        other => panic!("expected OutOfRange, got {:?}", other.map(|t| t.shape())),
    }

    let clamped = table.slice(&selector, OutOfRangePolicy::Clamp).unwrap();
    assert_eq!(clamped.dimension_grid().values("TWS_Coord").unwrap(), &[40.0]);
}

#[test]
fn test_nearest_agrees_with_sliced_nearest() {
    let grid = mppp_grid();
    let table = ramp_table("TOTAL_POWER", "kW", &grid);
    let point = DimensionPoint::from([
        ("STW_Coord", 7.1),
        ("TWS_Coord", 11.0),
        ("TWA_Coord", 44.0),
        ("WA_Coord", 3.0),
        ("Hs_Coord", 2.4),
    ]);

    let direct = table.nearest(&point).unwrap();

    let selector = DimensionPoint::from([("TWS_Coord", 11.0), ("WA_Coord", 3.0), ("Hs_Coord", 2.4)]);
    let sliced = table.slice(&selector, OutOfRangePolicy::Clamp).unwrap();
    assert_eq!(sliced.nearest(&point).unwrap(), direct);

    // STW 7.1 -> 8 (idx 4), TWS 11 -> 10 (2), TWA 44 -> 45 (3), WA 3 -> 0 (0), Hs 2.4 -> 2 (2)
    let expected = (((4 * 9 + 2) * 13 + 3) * 13) * 9 + 2;
    assert_eq!(direct, expected as f64);
}

#[test]
fn test_interp_on_squeezed_table() {
    let grid = mppp_grid();
    let table = ramp_table("TOTAL_POWER", "kW", &grid);
    let selector = DimensionPoint::from([
        ("TWS_Coord", 10.0),
        ("TWA_Coord", 90.0),
        ("WA_Coord", 0.0),
        ("Hs_Coord", 0.0),
    ]);
    let line = table
        .slice(&selector, OutOfRangePolicy::Error)
        .unwrap()
        .squeeze()
        .unwrap();
    assert_eq!(line.shape(), vec![13]);

    // values along STW are evenly spaced, so interpolation is linear in STW
    let lo = line.value(&[2]).unwrap();
    let hi = line.value(&[3]).unwrap();
    let mid = line
        .interp(&DimensionPoint::from([("STW_Coord", 5.0)]), OutOfRangePolicy::Error)
        .unwrap();
    assert!((mid - (lo + hi) / 2.0).abs() < 1e-9);

    assert!(matches!(
        line.interp(&DimensionPoint::from([("STW_Coord", 30.0)]), OutOfRangePolicy::Error),
        Err(PoemError::OutOfRange { .. })
    ));
    let clamped = line
        .interp(&DimensionPoint::from([("STW_Coord", 30.0)]), OutOfRangePolicy::Clamp)
        .unwrap();
    assert_eq!(clamped, line.value(&[12]).unwrap());
}

#[test]
fn test_view_aliases_and_copy_does_not() {
    let grid = mppp_grid();
    let mut table = ramp_table("LEEWAY", "deg", &grid);
    let copy = table.copy().unwrap();

    table.view_mut().unwrap()[IxDyn(&[0, 0, 0, 0, 0])] = -1.0;
    assert_eq!(table.value(&[0, 0, 0, 0, 0]).unwrap(), -1.0);
    assert_eq!(copy.value(&[0, 0, 0, 0, 0]).unwrap(), 0.0);

    let mut owned = table.to_array().unwrap();
    owned[IxDyn(&[0, 0, 0, 0, 1])] = 42.0;
    assert_eq!(table.value(&[0, 0, 0, 0, 1]).unwrap(), 1.0);
}
