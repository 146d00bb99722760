mod common;

use std::sync::Arc;

use poem::{
    mount, mount_from, Dimension, DimensionGrid, DimensionSet, KeepPatterns, Polar, PolarMode,
    PolarNode, PolarSet, PolarTable, PoemError,
};
use serde_json::json;

use common::{mppp_grid, mppp_polar, ramp_table, vessel};

fn fleet() -> PolarNode {
    let mut root = PolarNode::group("fleet");
    root.attach(vessel()).unwrap();
    root.attach(PolarNode::group("archive")).unwrap();
    root
}

#[test]
fn test_paths_and_full_names() {
    let root = fleet();
    assert!(root.exists("/vessel/MPPP/LEEWAY"));
    assert!(root.exists("vessel/MPPP"));
    assert!(!root.exists("/vessel/HPPP"));
    assert!(matches!(
        root.node_from_path("/vessel/HPPP/LEEWAY"),
        Err(PoemError::PathNotFound { .. })
    ));

    let names: Vec<String> = root.descendants().into_iter().map(|n| n.full_name).collect();
    assert_eq!(names[0], "/");
    assert_eq!(names[1], "/vessel");
    assert_eq!(names[2], "/vessel/MPPP");
    assert!(names.contains(&"/archive".to_string()));

    let polars = root.polars();
    assert_eq!(polars.len(), 1);
    assert_eq!(polars[0].0, "/vessel/MPPP");
    assert_eq!(root.polar_table_paths().len(), 4);
}

#[test]
fn test_downcasts() {
    let root = fleet();
    let set = root.node_from_path("vessel").unwrap();
    assert!(set.is_polar_set());
    assert_eq!(set.as_polar_set().unwrap().modes(), vec![PolarMode::MPPP]);
    assert!(matches!(set.as_polar(), Err(PoemError::TypeMismatch { .. })));

    let table = root
        .node_from_path("vessel/MPPP/SOLVER_STATUS")
        .unwrap()
        .as_polar_table()
        .unwrap();
    assert!(table.as_integer().is_ok());
    assert!(table.as_real().is_err());
}

#[test]
fn test_layout_lists_table_names_only() {
    let mut root = PolarNode::group("fleet");
    root.attach(vessel()).unwrap();
    assert_eq!(
        root.layout(),
        json!({
            "fleet": {
                "vessel": {
                    "MPPP": ["TOTAL_POWER", "BRAKE_POWER", "LEEWAY", "SOLVER_STATUS"]
                }
            }
        })
    );
    let text = root.layout_string(Some(2)).unwrap();
    assert!(text.contains("\n  \"fleet\""));
}

#[test]
fn test_mount_lattice() {
    let mut root = fleet();
    let grid = mppp_grid();

    let table: PolarNode = ramp_table("EXTRA", "-", &grid).into();
    assert!(matches!(
        mount(&mut root, "/archive", table.clone()),
        Err(PoemError::IncompatibleMount(_))
    ));

    assert!(matches!(
        mount(&mut root, "/vessel", mppp_polar().into()),
        Err(PoemError::DuplicateMode { .. })
    ));

    let set = DimensionSet::new(vec![Dimension::new("TWS_Coord", "kt", "True Wind Speed")]).unwrap();
    let other = Arc::new(DimensionGrid::with_values(set, vec![vec![0.0, 10.0]]).unwrap());
    let mut foreign = PolarTable::<f64>::new("FOREIGN", "-", "", other).unwrap();
    foreign.fill_with(0.0);
    assert!(matches!(
        mount(&mut root, "/vessel/MPPP", foreign.into()),
        Err(PoemError::IncompatibleMount(_))
    ));

    mount(&mut root, "/vessel/MPPP", table).unwrap();
    assert!(root.exists("/vessel/MPPP/EXTRA"));

    assert!(matches!(
        mount(&mut root, "/missing", PolarNode::group("x")),
        Err(PoemError::PathNotFound { .. })
    ));
}

#[test]
fn test_mount_from_other_tree() {
    let source = fleet();
    let mut target = PolarNode::group("harbour");
    mount_from(&mut target, "/", &source, "/vessel").unwrap();
    assert!(target.exists("/vessel/MPPP/TOTAL_POWER"));
    // source is left as it was
    assert!(source.exists("/vessel/MPPP/TOTAL_POWER"));

    let mut hybrid = PolarSet::new("hybrid");
    hybrid
        .add_polar(Polar::new("HPPP", PolarMode::HPPP, mppp_grid()).unwrap())
        .unwrap();
    target.attach(hybrid).unwrap();
    assert!(matches!(
        mount_from(&mut target, "/hybrid", &source, "/vessel/MPPP/LEEWAY"),
        Err(PoemError::IncompatibleMount(_))
    ));
}

#[test]
fn test_clean_is_idempotent() {
    let mut root = fleet();
    let grid = mppp_grid();
    {
        let mut polar = root
            .node_from_path_mut("/vessel/MPPP")
            .unwrap()
            .into_polar()
            .unwrap();
        polar.add_table(ramp_table("FUEL_RATE", "kg/h", &grid)).unwrap();
    }

    let keep = KeepPatterns::new(&["BRAKE_*"]).unwrap();
    assert_eq!(root.clean(&keep), 1);
    assert_eq!(root.clean(&keep), 0);

    let polar = root.node_from_path("/vessel/MPPP").unwrap().as_polar().unwrap();
    assert_eq!(
        polar.table_names(),
        vec!["TOTAL_POWER", "BRAKE_POWER", "LEEWAY", "SOLVER_STATUS"]
    );
    assert!(polar.has_mandatory_tables());

    assert_eq!(root.clean(&KeepPatterns::default()), 1);
    assert!(!root.exists("/vessel/MPPP/BRAKE_POWER"));
}

#[test]
fn test_handles_keep_invariants() {
    let mut root = fleet();
    let set = DimensionSet::new(vec![Dimension::new("TWS_Coord", "kt", "True Wind Speed")]).unwrap();
    let other = Arc::new(DimensionGrid::with_values(set, vec![vec![0.0, 10.0]]).unwrap());
    {
        let mut vessel = root.child_mut("vessel").unwrap();
        assert!(matches!(
            vessel.attach(PolarNode::group("spare")),
            Err(PoemError::IncompatibleMount(_))
        ));
        let mut set = vessel.into_polar_set().unwrap();
        assert!(matches!(
            set.add_polar(mppp_polar()),
            Err(PoemError::DuplicateMode { .. })
        ));

        let mut polar = set.polar_mut(PolarMode::MPPP).unwrap();
        assert!(matches!(
            polar.add_table(PolarTable::<f64>::new("FOREIGN", "-", "", other).unwrap()),
            Err(PoemError::IncompatibleMount(_))
        ));
        assert!(matches!(
            polar.rename_table("LEEWAY", "TOTAL_POWER"),
            Err(PoemError::NameConflict { .. })
        ));
        polar.rename_table("LEEWAY", "DRIFT").unwrap();
    }

    let mut polar = root.node_from_path_mut("/vessel/MPPP").unwrap();
    assert!(matches!(
        polar.attach(PolarNode::group("spare")),
        Err(PoemError::IncompatibleMount(_))
    ));
    assert!(matches!(
        polar.rename_child("DRIFT", "BRAKE_POWER"),
        Err(PoemError::NameConflict { .. })
    ));
    let drift = polar.child_mut("DRIFT").unwrap();
    assert!(matches!(drift.into_table::<i32>(), Err(PoemError::TypeMismatch { .. })));
    let mut drift = polar.child_mut("DRIFT").unwrap().into_table::<f64>().unwrap();
    drift.set_unit("rad");

    assert!(matches!(
        root.rename_child("vessel", "archive"),
        Err(PoemError::NameConflict { .. })
    ));
    root.rename_child("archive", "attic").unwrap();
    assert!(root.exists("/attic"));
    assert_eq!(
        root.node_from_path("/vessel/MPPP/DRIFT").unwrap().as_polar_table().unwrap().unit(),
        "rad"
    );
    let polar = root.node_from_path("/vessel/MPPP").unwrap().as_polar().unwrap();
    assert_eq!(
        polar.table_names(),
        vec!["TOTAL_POWER", "BRAKE_POWER", "DRIFT", "SOLVER_STATUS"]
    );
}
