//! POEM - Polar performance datasets for ships.
//!
//! POEM models the performance predictions of a vessel as N-dimensional tables
//! over coordinate grids, organised in a tree of groups, polar sets and polars,
//! and stored in versioned netCDF containers.
//!
//! # Features
//!
//! - Dimension grids with nearest, multilinear, slice and squeeze queries
//! - A closed polar tree with path navigation, mount and clean
//! - Versioned structural rules with aggregated violation reports
//! - Lazy or eager container loading, atomic writes
//!
//! # Example
//!
//! ```ignore
//! use poem::{io, DimensionPoint};
//!
//! let root = io::load("vessel.nc")?;
//! let table = root.node_from_path("/vessel/MPPP/TOTAL_POWER")?.as_polar_table()?;
//! let point = DimensionPoint::from([
//!     ("STW_Coord", 12.0),
//!     ("TWS_Coord", 20.0),
//!     ("TWA_Coord", 45.0),
//!     ("WA_Coord", 45.0),
//!     ("Hs_Coord", 2.0),
//! ]);
//! println!("{}", table.nearest(&point)?);
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod error;
pub mod grid;
pub mod io;
pub mod node;
pub mod spec;
pub mod table;
pub mod util;

pub use error::{PoemError, Result};
pub use grid::{Dimension, DimensionGrid, DimensionPoint, DimensionSet, OutOfRangePolicy};
pub use io::{append_to_netcdf, load, load_with, to_netcdf, LoadOptions};
pub use node::{
    mount, mount_from, ControlType, KeepPatterns, NodeKind, NodeMut, NodeRef, Polar, PolarGroup,
    PolarMode, PolarMut, PolarNode, PolarSet, PolarSetMut, PolarTableMut,
};
pub use spec::{get_version, mandatory_polar_tables, spec_check, SpecReport, Violation};
pub use table::{AnyPolarTable, Datatype, PolarTable, TableValue};
