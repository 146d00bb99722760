#![allow(dead_code)]

use std::sync::Arc;

use poem::{Dimension, DimensionGrid, DimensionSet, Polar, PolarMode, PolarNode, PolarSet, PolarTable};

fn axis(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| start + step * i as f64).collect()
}

/// MPPP grid of shape (13, 9, 13, 13, 9).
pub fn mppp_grid() -> Arc<DimensionGrid> {
    let set = DimensionSet::new(vec![
        Dimension::new("STW_Coord", "kt", "Speed Through Water"),
        Dimension::new("TWS_Coord", "kt", "True Wind Speed"),
        Dimension::new("TWA_Coord", "deg", "True Wind Angle"),
        Dimension::new("WA_Coord", "deg", "Waves Angle"),
        Dimension::new("Hs_Coord", "m", "Waves Significant Height"),
    ])
    .unwrap();
    let values = vec![
        axis(0.0, 2.0, 13),
        axis(0.0, 5.0, 9),
        axis(0.0, 15.0, 13),
        axis(0.0, 15.0, 13),
        axis(0.0, 1.0, 9),
    ];
    Arc::new(DimensionGrid::with_values(set, values).unwrap())
}

/// Table whose value is its row-major flat index.
pub fn ramp_table(name: &str, unit: &str, grid: &Arc<DimensionGrid>) -> PolarTable<f64> {
    let mut table = PolarTable::<f64>::new(name, unit, name, Arc::clone(grid)).unwrap();
    let values: Vec<f64> = (0..grid.size()).map(|i| i as f64).collect();
    table.set_values_flat(values).unwrap();
    table
}

/// MPPP polar holding every mandatory table plus `BRAKE_POWER`.
pub fn mppp_polar() -> Polar {
    let grid = mppp_grid();
    let mut polar = Polar::new("MPPP", PolarMode::MPPP, Arc::clone(&grid)).unwrap();
    polar.add_table(ramp_table("TOTAL_POWER", "kW", &grid)).unwrap();
    polar.add_table(ramp_table("BRAKE_POWER", "kW", &grid)).unwrap();

    let mut leeway = ramp_table("LEEWAY", "deg", &grid);
    leeway.multiply_by(0.001).unwrap();
    polar.add_table(leeway).unwrap();

    let mut status = polar
        .new_table::<i32>("SOLVER_STATUS", "-", "Solver status")
        .unwrap();
    status.fill_with(1);
    polar
}

/// Root polar set `vessel` holding one MPPP polar.
pub fn vessel() -> PolarNode {
    let mut root: PolarNode = PolarSet::new("vessel").into();
    root.attach(mppp_polar()).unwrap();
    root
}
