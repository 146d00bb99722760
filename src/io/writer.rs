//! Container writing.
//!
//! Every write goes to a temporary sibling of the target which replaces the
//! target only once the netCDF handle is closed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use super::schema;
use crate::error::{ContainerContext, PoemError, Result};
use crate::node::{Polar, PolarNode};
use crate::spec::CURRENT_VERSION;
use crate::table::{AnyPolarTable, PolarTable, TableValue};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write the tree rooted at `node` as a new container, replacing any file at `path`.
pub fn to_netcdf(node: &PolarNode, root_name: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    reject_table(node)?;
    reject_legacy(node)?;
    info!("Writing {} to {}", node.name(), path.display());

    replace_atomically(path, |tmp| {
        let mut file = netcdf::create(tmp).at(tmp)?;
        let mut root = file
            .root_mut()
            .ok_or_else(|| PoemError::container(tmp, "new container has no root group"))?;
        let writer = Writer { path: tmp };
        writer.group_attributes(&mut root, &schema::root_attributes(node, root_name))?;
        writer.contents(&mut root, node)
    })
}

/// Add the tree rooted at `node` as a new top-level group of an existing container.
pub fn append_to_netcdf(node: &PolarNode, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    reject_table(node)?;
    reject_legacy(node)?;
    if !path.is_file() {
        return Err(PoemError::container(path, "cannot append to a missing container"));
    }
    info!("Appending {} to {}", node.name(), path.display());

    replace_atomically(path, |tmp| {
        fs::copy(path, tmp).at(path)?;
        let mut file = netcdf::append(tmp).at(tmp)?;
        if file.group(node.name()).at(tmp)?.is_some() {
            return Err(PoemError::name_conflict("/", node.name()));
        }
        let mut root = file
            .root_mut()
            .ok_or_else(|| PoemError::container(tmp, "container has no root group"))?;
        Writer { path: tmp }.group(&mut root, node)
    })
}

fn reject_table(node: &PolarNode) -> Result<()> {
    if node.is_polar_table() {
        return Err(PoemError::TypeMismatch {
            name: node.name().to_string(),
            expected: "container node",
            found: "PolarTable",
        });
    }
    Ok(())
}

/// Containers are always written in the current layout, which legacy polars do not follow.
fn reject_legacy(node: &PolarNode) -> Result<()> {
    match node
        .polars()
        .into_iter()
        .find(|(_, polar)| polar.format_version() != CURRENT_VERSION)
    {
        Some((path, polar)) => {
            warn!(
                "Polar {} follows POEM v{} and cannot be written as v{}",
                path,
                polar.format_version(),
                CURRENT_VERSION
            );
            Err(PoemError::UnsupportedVersion(polar.format_version()))
        }
        None => Ok(()),
    }
}

/// Run `write` against a fresh temporary path, then move it over `path`.
fn replace_atomically(path: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    let tmp = temp_path(path);
    debug!("Staging container in {}", tmp.display());
    // the netCDF handle is dropped when `write` returns
    if let Err(err) = write(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PoemError::container(path, err));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "poem".to_string());
    path.with_file_name(format!(".{}.{}-{}.tmp", file_name, std::process::id(), n))
}

/// Writes nodes into groups of the container staged at `path`.
struct Writer<'a> {
    path: &'a Path,
}

impl Writer<'_> {
    fn group(&self, parent: &mut netcdf::GroupMut<'_>, node: &PolarNode) -> Result<()> {
        let mut group = parent.add_group(node.name()).at(self.path)?;
        self.group_attributes(&mut group, &schema::group_attributes(node))?;
        self.contents(&mut group, node)
    }

    fn contents(&self, group: &mut netcdf::GroupMut<'_>, node: &PolarNode) -> Result<()> {
        match node {
            PolarNode::Polar(polar) => self.polar(group, polar),
            _ => {
                for child in node.children() {
                    self.group(group, child)?;
                }
                Ok(())
            }
        }
    }

    fn polar(&self, group: &mut netcdf::GroupMut<'_>, polar: &Polar) -> Result<()> {
        debug!("Writing {} polar {}", polar.mode(), polar.name());
        let grid = polar.dimension_grid();
        for (idx, dimension) in grid.dimension_set().iter().enumerate() {
            let values = grid.values_at(idx);
            group
                .add_dimension(dimension.name(), values.len())
                .at(self.path)?;
            let mut var = f64::write_variable(group, dimension.name(), &[dimension.name()], values)
                .at(self.path)?;
            self.variable_attributes(&mut var, &schema::dimension_attributes(dimension))?;
        }

        let dims = grid.dimension_set().names();
        for table in polar.tables() {
            match table {
                AnyPolarTable::Real(t) => self.table(group, &dims, t, table)?,
                AnyPolarTable::Integer(t) => self.table(group, &dims, t, table)?,
            }
        }
        Ok(())
    }

    fn table<T: TableValue>(
        &self,
        group: &mut netcdf::GroupMut<'_>,
        dims: &[&str],
        table: &PolarTable<T>,
        any: &AnyPolarTable,
    ) -> Result<()> {
        if !table.is_filled() {
            return Err(PoemError::NotFilled(table.name().to_string()));
        }
        let values: Vec<T> = table.view()?.iter().copied().collect();
        let mut var = T::write_variable(group, table.name(), dims, &values).at(self.path)?;
        self.variable_attributes(&mut var, &schema::table_attributes(any))
    }

    fn group_attributes(
        &self,
        group: &mut netcdf::GroupMut<'_>,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()> {
        for (key, value) in attributes {
            group.add_attribute(key, value.as_str()).at(self.path)?;
        }
        Ok(())
    }

    fn variable_attributes(
        &self,
        var: &mut netcdf::VariableMut<'_>,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()> {
        for (key, value) in attributes {
            var.put_attribute(key, value.as_str()).at(self.path)?;
        }
        Ok(())
    }
}
