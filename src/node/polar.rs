//! Polars: tables of one mode over one grid.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::handle::{typed, PolarTableMut};
use super::{PolarMode, PolarNode};
use crate::error::{PoemError, Result};
use crate::grid::DimensionGrid;
use crate::spec;
use crate::table::{AnyPolarTable, PolarTable, TableValue};

/// A named collection of tables sharing one [`DimensionGrid`] and one [`PolarMode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polar {
    pub(super) name: String,
    pub(super) description: String,
    pub(super) attributes: BTreeMap<String, String>,
    mode: PolarMode,
    grid: Arc<DimensionGrid>,
    format_version: u32,
    pub(super) children: Vec<PolarNode>,
}

impl Polar {
    /// Create an empty polar. The grid must have values on every axis.
    pub fn new(name: impl Into<String>, mode: PolarMode, grid: Arc<DimensionGrid>) -> Result<Self> {
        let name = name.into();
        if !grid.is_filled() {
            return Err(PoemError::invalid_grid(format!(
                "polar {} needs values on every dimension of its grid",
                name
            )));
        }
        Ok(Self {
            name,
            description: String::new(),
            attributes: BTreeMap::new(),
            mode,
            grid,
            format_version: spec::CURRENT_VERSION,
            children: Vec::new(),
        })
    }

    /// Polar read from a container laid out by an older specification version.
    pub(crate) fn with_format_version(mut self, version: u32) -> Self {
        self.format_version = version;
        self
    }

    /// Polar name, by convention the mode name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operating mode.
    pub fn mode(&self) -> PolarMode {
        self.mode
    }

    /// The grid every table of the polar is indexed by.
    pub fn dimension_grid(&self) -> &DimensionGrid {
        &self.grid
    }

    /// Shared handle on the grid.
    pub fn grid(&self) -> &Arc<DimensionGrid> {
        &self.grid
    }

    /// Specification version whose layout the polar follows.
    ///
    /// New polars follow [`spec::CURRENT_VERSION`]; polars read from legacy
    /// containers keep the version they were read with.
    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// Free text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Extra key/value attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Mutable access to the attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.attributes
    }

    /// Create a table on the polar grid and return it for filling.
    pub fn new_table<T: TableValue>(
        &mut self,
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<PolarTableMut<'_, T>> {
        let table = PolarTable::<T>::new(name, unit, description, Arc::clone(&self.grid))?;
        let name = table.name().to_string();
        self.add_table(T::wrap(table))?;
        self.table_mut(&name)
    }

    /// Add a table. Its grid must equal the polar grid and its name must be free.
    pub fn add_table(&mut self, table: impl Into<AnyPolarTable>) -> Result<()> {
        let table = table.into();
        if **table.grid() != *self.grid {
            return Err(PoemError::incompatible_mount(format!(
                "grid of table {} differs from the grid of polar {}",
                table.name(),
                self.name
            )));
        }
        if self.has_table(table.name()) {
            return Err(PoemError::name_conflict(&self.name, table.name()));
        }
        self.children.push(PolarNode::Table(table));
        Ok(())
    }

    /// Check if a table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables().any(|t| t.name() == name)
    }

    /// Table by name.
    pub fn table(&self, name: &str) -> Result<&AnyPolarTable> {
        self.tables()
            .find(|t| t.name() == name)
            .ok_or_else(|| PoemError::path_not_found(format!("{}/{}", self.name, name)))
    }

    /// Handle on a table of element type `T`, for changing its values.
    pub fn table_mut<T: TableValue>(&mut self, name: &str) -> Result<PolarTableMut<'_, T>> {
        typed(self.slot_mut(name)?).map(PolarTableMut::new)
    }

    /// Rename a table. The new name must be free.
    pub fn rename_table(&mut self, name: &str, new_name: impl Into<String>) -> Result<()> {
        let new_name = new_name.into();
        if new_name != name && self.has_table(&new_name) {
            return Err(PoemError::name_conflict(&self.name, new_name));
        }
        self.slot_mut(name)?.rename(new_name);
        Ok(())
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut AnyPolarTable> {
        let polar = self.name.clone();
        self.children
            .iter_mut()
            .filter_map(|c| match c {
                PolarNode::Table(t) => Some(t),
                _ => None,
            })
            .find(|t| t.name() == name)
            .ok_or_else(|| PoemError::path_not_found(format!("{}/{}", polar, name)))
    }

    /// Tables in insertion order.
    pub fn tables(&self) -> impl Iterator<Item = &AnyPolarTable> {
        self.children.iter().filter_map(|c| match c {
            PolarNode::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Table names in insertion order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables().map(|t| t.name()).collect()
    }

    /// Detach a table.
    pub fn remove_table(&mut self, name: &str) -> Result<AnyPolarTable> {
        let idx = self
            .children
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| PoemError::path_not_found(format!("{}/{}", self.name, name)))?;
        match self.children.remove(idx) {
            PolarNode::Table(t) => Ok(t),
            other => Err(PoemError::TypeMismatch {
                name: other.name().to_string(),
                expected: "PolarTable",
                found: other.kind().as_str(),
            }),
        }
    }

    /// Tables the mode requires under the polar's specification version.
    pub fn mandatory_tables(&self) -> &'static [&'static str] {
        spec::specification(self.format_version)
            .map(|s| s.mandatory_tables(self.mode))
            .unwrap_or(&[])
    }

    /// Mandatory tables for the mode that are not present.
    pub fn missing_mandatory_tables(&self) -> Vec<&'static str> {
        self.mandatory_tables()
            .iter()
            .copied()
            .filter(|name| !self.has_table(name))
            .collect()
    }

    /// True if every mandatory table of the mode is present.
    pub fn has_mandatory_tables(&self) -> bool {
        self.missing_mandatory_tables().is_empty()
    }
}
