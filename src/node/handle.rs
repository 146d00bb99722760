//! Mutable handles on nodes held by a parent.
//!
//! A handle exposes only edits that keep the parent consistent: accepted kinds,
//! one polar per mode, one grid per polar and unique sibling names. A held node
//! can never be replaced wholesale or renamed through its handle; renames go
//! through the parent with [`PolarNode::rename_child`].

use std::collections::BTreeMap;
use std::ops::Deref;

use ndarray::{ArrayD, ArrayViewMutD};

use super::{KeepPatterns, Polar, PolarMode, PolarNode, PolarSet};
use crate::error::{PoemError, Result};
use crate::table::{AnyPolarTable, PolarTable, TableValue};

/// Mutable handle on a node of a tree.
#[derive(Debug)]
pub struct NodeMut<'a> {
    node: &'a mut PolarNode,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(node: &'a mut PolarNode) -> Self {
        Self { node }
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.node.set_description(description);
    }

    /// Mutable access to the attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.node.attributes_mut()
    }

    /// See [`PolarNode::attach`].
    pub fn attach(&mut self, child: impl Into<PolarNode>) -> Result<()> {
        self.node.attach(child)
    }

    /// See [`PolarNode::remove`].
    pub fn remove(&mut self, name: &str) -> Result<PolarNode> {
        self.node.remove(name)
    }

    /// See [`PolarNode::rename_child`].
    pub fn rename_child(&mut self, name: &str, new_name: impl Into<String>) -> Result<()> {
        self.node.rename_child(name, new_name)
    }

    /// See [`PolarNode::clean`].
    pub fn clean(&mut self, keep: &KeepPatterns) -> usize {
        self.node.clean(keep)
    }

    /// Handle on a direct child.
    pub fn child_mut(&mut self, name: &str) -> Option<NodeMut<'_>> {
        self.node.child_mut(name)
    }

    /// Handle on a node below this one.
    pub fn node_from_path_mut(&mut self, path: &str) -> Result<NodeMut<'_>> {
        self.node.node_from_path_mut(path)
    }

    /// Narrow to a polar set.
    pub fn into_polar_set(self) -> Result<PolarSetMut<'a>> {
        self.node.as_polar_set_mut().map(PolarSetMut::new)
    }

    /// Narrow to a polar.
    pub fn into_polar(self) -> Result<PolarMut<'a>> {
        self.node.as_polar_mut().map(PolarMut::new)
    }

    /// Narrow to a table of element type `T`.
    pub fn into_table<T: TableValue>(self) -> Result<PolarTableMut<'a, T>> {
        typed(self.node.as_polar_table_mut()?).map(PolarTableMut::new)
    }
}

impl Deref for NodeMut<'_> {
    type Target = PolarNode;

    fn deref(&self) -> &PolarNode {
        self.node
    }
}

/// Mutable handle on a polar set held by a parent.
#[derive(Debug)]
pub struct PolarSetMut<'a> {
    set: &'a mut PolarSet,
}

impl<'a> PolarSetMut<'a> {
    pub(crate) fn new(set: &'a mut PolarSet) -> Self {
        Self { set }
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.set.set_description(description);
    }

    /// Mutable access to the attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.set.attributes_mut()
    }

    /// See [`PolarSet::add_polar`].
    pub fn add_polar(&mut self, polar: Polar) -> Result<()> {
        self.set.add_polar(polar)
    }

    /// See [`PolarSet::remove_polar`].
    pub fn remove_polar(&mut self, mode: PolarMode) -> Result<Polar> {
        self.set.remove_polar(mode)
    }

    /// Handle on the polar of a given mode.
    pub fn polar_mut(&mut self, mode: PolarMode) -> Result<PolarMut<'_>> {
        self.set.polar_mut(mode)
    }
}

impl Deref for PolarSetMut<'_> {
    type Target = PolarSet;

    fn deref(&self) -> &PolarSet {
        self.set
    }
}

/// Mutable handle on a polar held by a parent.
#[derive(Debug)]
pub struct PolarMut<'a> {
    polar: &'a mut Polar,
}

impl<'a> PolarMut<'a> {
    pub(crate) fn new(polar: &'a mut Polar) -> Self {
        Self { polar }
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.polar.set_description(description);
    }

    /// Mutable access to the attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.polar.attributes_mut()
    }

    /// See [`Polar::new_table`].
    pub fn new_table<T: TableValue>(
        &mut self,
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<PolarTableMut<'_, T>> {
        self.polar.new_table(name, unit, description)
    }

    /// See [`Polar::add_table`].
    pub fn add_table(&mut self, table: impl Into<AnyPolarTable>) -> Result<()> {
        self.polar.add_table(table)
    }

    /// See [`Polar::remove_table`].
    pub fn remove_table(&mut self, name: &str) -> Result<AnyPolarTable> {
        self.polar.remove_table(name)
    }

    /// See [`Polar::rename_table`].
    pub fn rename_table(&mut self, name: &str, new_name: impl Into<String>) -> Result<()> {
        self.polar.rename_table(name, new_name)
    }

    /// See [`Polar::table_mut`].
    pub fn table_mut<T: TableValue>(&mut self, name: &str) -> Result<PolarTableMut<'_, T>> {
        self.polar.table_mut(name)
    }
}

impl Deref for PolarMut<'_> {
    type Target = Polar;

    fn deref(&self) -> &Polar {
        self.polar
    }
}

/// Mutable handle on a table held by a polar.
///
/// Values and metadata may change; name and grid may not.
#[derive(Debug)]
pub struct PolarTableMut<'a, T: TableValue> {
    table: &'a mut PolarTable<T>,
}

impl<'a, T: TableValue> PolarTableMut<'a, T> {
    pub(crate) fn new(table: &'a mut PolarTable<T>) -> Self {
        Self { table }
    }

    /// Set the unit of the values.
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.table.set_unit(unit);
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.table.set_description(description);
    }

    /// Mutable access to the extra attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.table.attributes_mut()
    }

    /// See [`PolarTable::set_values`].
    pub fn set_values(&mut self, values: ArrayD<T>) -> Result<()> {
        self.table.set_values(values)
    }

    /// See [`PolarTable::set_values_flat`].
    pub fn set_values_flat(&mut self, values: Vec<T>) -> Result<()> {
        self.table.set_values_flat(values)
    }

    /// See [`PolarTable::fill_with`].
    pub fn fill_with(&mut self, value: T) {
        self.table.fill_with(value);
    }

    /// See [`PolarTable::set_value`].
    pub fn set_value(&mut self, index: &[usize], value: T) -> Result<()> {
        self.table.set_value(index, value)
    }

    /// See [`PolarTable::view_mut`].
    pub fn view_mut(&mut self) -> Result<ArrayViewMutD<'_, T>> {
        self.table.view_mut()
    }

    /// See [`PolarTable::multiply_by`].
    pub fn multiply_by(&mut self, coeff: T) -> Result<()> {
        self.table.multiply_by(coeff)
    }

    /// See [`PolarTable::offset`].
    pub fn offset(&mut self, value: T) -> Result<()> {
        self.table.offset(value)
    }

    /// See [`PolarTable::abs`].
    pub fn abs(&mut self) -> Result<()> {
        self.table.abs()
    }
}

impl<T: TableValue> Deref for PolarTableMut<'_, T> {
    type Target = PolarTable<T>;

    fn deref(&self) -> &PolarTable<T> {
        self.table
    }
}

pub(crate) fn typed<T: TableValue>(table: &mut AnyPolarTable) -> Result<&mut PolarTable<T>> {
    let name = table.name().to_string();
    let found = table.datatype().name();
    T::downcast_mut(table).ok_or(PoemError::TypeMismatch {
        name,
        expected: T::DATATYPE.name(),
        found,
    })
}
