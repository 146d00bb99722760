//! The polar tree: groups, polar sets, polars and tables.
//!
//! [`PolarNode`] is a closed sum type over the four node kinds. Every parent
//! owns its children; full names are computed while walking from a root.

mod clean;
mod group;
mod handle;
mod layout;
mod mode;
mod mount;
mod path;
mod polar;
mod polar_set;
mod tree;

pub use clean::KeepPatterns;
pub use group::PolarGroup;
pub use handle::{NodeMut, PolarMut, PolarSetMut, PolarTableMut};
pub use mode::{ControlType, PolarMode};
pub use mount::{mount, mount_from};
pub use tree::{NodeKind, PolarNode};
pub use path::NodeRef;
pub use polar::Polar;
pub use polar_set::PolarSet;
