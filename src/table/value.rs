//! Element types a PolarTable can hold.

use std::fmt;

use super::{AnyPolarTable, PolarTable};

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for i32 {}
}

/// Storage datatype of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// 64-bit float.
    Real,
    /// 32-bit signed integer.
    Integer,
}

impl Datatype {
    /// Name used in layouts and reports.
    pub fn name(self) -> &'static str {
        match self {
            Datatype::Real => "double",
            Datatype::Integer => "int",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar element of a [`PolarTable`](super::PolarTable). Implemented for `f64` and `i32` only.
pub trait TableValue:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
{
    /// Datatype tag.
    const DATATYPE: Datatype;

    /// Widen to f64 for interpolation and statistics.
    fn to_f64(self) -> f64;

    /// Product, `None` when it does not fit the type.
    fn checked_mul(self, rhs: Self) -> Option<Self>;

    /// Sum, `None` when it does not fit the type.
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// Absolute value, `None` when it does not fit the type.
    fn checked_abs(self) -> Option<Self>;

    #[doc(hidden)]
    fn read_all(var: &netcdf::Variable<'_>) -> Result<Vec<Self>, netcdf::Error>;

    #[doc(hidden)]
    fn write_variable<'g>(
        group: &'g mut netcdf::GroupMut<'_>,
        name: &str,
        dims: &[&str],
        values: &[Self],
    ) -> Result<netcdf::VariableMut<'g>, netcdf::Error>;

    #[doc(hidden)]
    fn wrap(table: PolarTable<Self>) -> AnyPolarTable;

    #[doc(hidden)]
    fn downcast_mut(table: &mut AnyPolarTable) -> Option<&mut PolarTable<Self>>;
}

impl TableValue for f64 {
    const DATATYPE: Datatype = Datatype::Real;

    fn to_f64(self) -> f64 {
        self
    }

    fn checked_mul(self, rhs: Self) -> Option<Self> {
        Some(self * rhs)
    }

    fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(self + rhs)
    }

    fn checked_abs(self) -> Option<Self> {
        Some(self.abs())
    }

    fn read_all(var: &netcdf::Variable<'_>) -> Result<Vec<Self>, netcdf::Error> {
        var.get_values::<f64, _>(..)
    }

    fn write_variable<'g>(
        group: &'g mut netcdf::GroupMut<'_>,
        name: &str,
        dims: &[&str],
        values: &[Self],
    ) -> Result<netcdf::VariableMut<'g>, netcdf::Error> {
        let mut var = group.add_variable::<f64>(name, dims)?;
        var.put_values(values, ..)?;
        Ok(var)
    }

    fn wrap(table: PolarTable<Self>) -> AnyPolarTable {
        AnyPolarTable::Real(table)
    }

    fn downcast_mut(table: &mut AnyPolarTable) -> Option<&mut PolarTable<Self>> {
        match table {
            AnyPolarTable::Real(t) => Some(t),
            AnyPolarTable::Integer(_) => None,
        }
    }
}

impl TableValue for i32 {
    const DATATYPE: Datatype = Datatype::Integer;

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn checked_mul(self, rhs: Self) -> Option<Self> {
        i32::checked_mul(self, rhs)
    }

    fn checked_add(self, rhs: Self) -> Option<Self> {
        i32::checked_add(self, rhs)
    }

    fn checked_abs(self) -> Option<Self> {
        i32::checked_abs(self)
    }

    fn read_all(var: &netcdf::Variable<'_>) -> Result<Vec<Self>, netcdf::Error> {
        var.get_values::<i32, _>(..)
    }

    fn write_variable<'g>(
        group: &'g mut netcdf::GroupMut<'_>,
        name: &str,
        dims: &[&str],
        values: &[Self],
    ) -> Result<netcdf::VariableMut<'g>, netcdf::Error> {
        let mut var = group.add_variable::<i32>(name, dims)?;
        var.put_values(values, ..)?;
        Ok(var)
    }

    fn wrap(table: PolarTable<Self>) -> AnyPolarTable {
        AnyPolarTable::Integer(table)
    }

    fn downcast_mut(table: &mut AnyPolarTable) -> Option<&mut PolarTable<Self>> {
        match table {
            AnyPolarTable::Integer(t) => Some(t),
            AnyPolarTable::Real(_) => None,
        }
    }
}
