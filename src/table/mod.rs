//! Typed tables and their query kernels.

mod any_table;
mod polar_table;
mod query;
mod value;

pub use any_table::AnyPolarTable;
pub use polar_table::PolarTable;
pub use value::{Datatype, TableValue};
