//! netCDF container codec.
//!
//! Groups map to tree nodes, coordinate variables to grid axes and the other
//! variables of a polar group to its tables.

mod lazy;
mod reader;
pub(crate) mod schema;
mod writer;

pub(crate) use lazy::DeferredSource;
pub use reader::{load, load_with, LoadOptions};
pub use writer::{append_to_netcdf, to_netcdf};
