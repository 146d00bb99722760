//! Container loading.

use std::path::Path;
use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};
use tracing::{debug, info, warn};

use super::lazy::DeferredSource;
use super::schema;
use crate::error::{ContainerContext, PoemError, Result};
use crate::grid::{Dimension, DimensionGrid, DimensionSet};
use crate::node::{Polar, PolarMode, PolarNode, PolarSet};
use crate::spec::{self, GroupStructure, Structure};
use crate::table::{AnyPolarTable, Datatype, PolarTable, TableValue};

const DEFAULT_ROOT_NAME: &str = "vessel";

/// How a container is read.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    root_name: Option<String>,
    eager: bool,
    validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            root_name: None,
            eager: false,
            validate: true,
        }
    }
}

impl LoadOptions {
    /// Name of the root node. Defaults to the `vessel_name` attribute, then `vessel`.
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    /// Read every table payload up front instead of on first access.
    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// Refuse containers that break the rules of the version they declare.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Load a container with default options: lazy and validated.
pub fn load(path: impl AsRef<Path>) -> Result<PolarNode> {
    load_with(path, &LoadOptions::default())
}

/// Load a container.
pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<PolarNode> {
    let path = path.as_ref();
    info!("Loading POEM container {}", path.display());

    let structure = Structure::from_file(path)?;
    if options.validate {
        spec::check_structure(&structure)?.into_result()?;
    }
    let version = structure.declared_version()?;
    if spec::specification(version).is_none() {
        return Err(PoemError::UnsupportedVersion(version));
    }

    let root_name = options
        .root_name
        .clone()
        .or_else(|| structure.root.attribute(schema::VESSEL_NAME).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_ROOT_NAME.to_string());

    let file = if options.eager {
        Some(netcdf::open(path).at(path)?)
    } else {
        None
    };
    let loader = Loader { path, file, version };

    let root = if version == 0 {
        loader.legacy_root(&structure.root, &root_name)?
    } else {
        loader.node(&structure.root, &root_name)?
    };
    info!(
        "Loaded {} ({} polars, v{})",
        path.display(),
        root.polars().len(),
        version
    );
    Ok(root)
}

struct Loader<'a> {
    path: &'a Path,
    file: Option<netcdf::File>,
    version: u32,
}

impl Loader<'_> {
    fn node(&self, group: &GroupStructure, name: &str) -> Result<PolarNode> {
        if group.is_polar() {
            let mode = group
                .polar_mode()
                .ok_or_else(|| PoemError::UnknownMode(group.name.clone()))?;
            debug!("{} is a {} polar", group.path, mode);
            return self.polar(group, name, mode);
        }

        let mut node = if group.is_polar_set() {
            debug!("{} is a polar set", group.path);
            PolarNode::from(PolarSet::new(name))
        } else {
            debug!("{} is a group", group.path);
            PolarNode::group(name)
        };
        describe(&mut node, group);

        for var in &group.variables {
            debug!("Ignoring variable {} outside of a polar in {}", var.name, group.path);
        }
        for sub in &group.groups {
            let child = self.node(sub, &sub.name)?;
            if node.is_polar_set() {
                node.attach(child)?;
            } else {
                node.push_child(child)?;
            }
        }
        Ok(node)
    }

    /// Legacy containers hold a single polar in their root group.
    fn legacy_root(&self, root: &GroupStructure, name: &str) -> Result<PolarNode> {
        let mode = spec::legacy_mode(root.attribute(schema::VESSEL_TYPE));
        debug!("Reading legacy root as a {} polar", mode);
        let polar = self.polar(root, mode.as_str(), mode)?;
        let mut set = PolarNode::from(PolarSet::new(name));
        set.attach(polar)?;
        Ok(set)
    }

    fn polar(&self, group: &GroupStructure, name: &str, mode: PolarMode) -> Result<PolarNode> {
        let dims: Vec<&str> = match group.variables.first() {
            Some(var) => var.dimensions.iter().map(String::as_str).collect(),
            None => group.coordinates.iter().map(|c| c.name.as_str()).collect(),
        };
        let grid = Arc::new(self.grid(group, &dims)?);

        let polar = Polar::new(name, mode, Arc::clone(&grid))?.with_format_version(self.version);
        let mut node = PolarNode::from(polar);
        describe(&mut node, group);

        for var in &group.variables {
            if var.dimensions != dims {
                return Err(PoemError::container(
                    self.path,
                    format!(
                        "table {} in {} is not indexed by the polar dimensions ({})",
                        var.name,
                        group.path,
                        dims.join(", ")
                    ),
                ));
            }
            let Some(datatype) = var.datatype else {
                warn!("Skipping {} in {}: unsupported variable type", var.name, group.path);
                continue;
            };
            let var_path = variable_path(&group.path, &var.name);
            let unit = attribute(&var.attributes, schema::UNIT);
            let description = attribute(&var.attributes, schema::DESCRIPTION);
            let mut table = match datatype {
                Datatype::Real => self.table::<f64>(&var.name, unit, description, &grid, &var_path)?,
                Datatype::Integer => {
                    self.table::<i32>(&var.name, unit, description, &grid, &var_path)?
                }
            };
            *table.attributes_mut() = schema::user_attributes(&var.attributes);
            node.attach(table)?;
        }
        Ok(node)
    }

    fn grid(&self, group: &GroupStructure, dims: &[&str]) -> Result<DimensionGrid> {
        let mut dimensions = Vec::with_capacity(dims.len());
        let mut values = Vec::with_capacity(dims.len());
        for name in dims {
            let coord = group.coordinate(name).ok_or_else(|| {
                PoemError::container(
                    self.path,
                    format!("coordinate variable {} is missing in {}", name, group.path),
                )
            })?;
            dimensions.push(Dimension::new(
                *name,
                attribute(&coord.attributes, schema::UNIT),
                attribute(&coord.attributes, schema::DESCRIPTION),
            ));
            values.push(coord.values.clone());
        }
        DimensionGrid::with_values(DimensionSet::new(dimensions)?, values)
    }

    fn table<T: TableValue>(
        &self,
        name: &str,
        unit: String,
        description: String,
        grid: &Arc<DimensionGrid>,
        var_path: &str,
    ) -> Result<AnyPolarTable> {
        let table = match &self.file {
            Some(file) => {
                let var = file.variable(var_path).ok_or_else(|| {
                    PoemError::container(self.path, format!("variable {} not found", var_path))
                })?;
                let values = T::read_all(&var).at(self.path)?;
                let found = values.len();
                let array = ArrayD::from_shape_vec(IxDyn(&grid.shape()), values).map_err(|_| {
                    PoemError::ShapeMismatch {
                        expected: grid.shape(),
                        found: vec![found],
                    }
                })?;
                PolarTable::from_array(name, unit, description, Arc::clone(grid), array)?
            }
            None => PolarTable::deferred(
                name.to_string(),
                unit,
                description,
                Arc::clone(grid),
                DeferredSource::new(self.path, var_path),
            ),
        };
        Ok(T::wrap(table))
    }
}

fn describe(node: &mut PolarNode, group: &GroupStructure) {
    if let Some(description) = group.attribute(schema::DESCRIPTION) {
        node.set_description(description);
    }
    *node.attributes_mut() = schema::user_attributes(&group.attributes);
}

fn attribute(attrs: &std::collections::BTreeMap<String, String>, key: &str) -> String {
    attrs.get(key).cloned().unwrap_or_default()
}

/// netCDF path of a variable, without leading `/`.
fn variable_path(group_path: &str, name: &str) -> String {
    let group = group_path.trim_matches('/');
    if group.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", group, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_path() {
        assert_eq!(variable_path("/", "LEEWAY"), "LEEWAY");
        assert_eq!(variable_path("/ship/MPPP", "LEEWAY"), "ship/MPPP/LEEWAY");
    }

    #[test]
    fn test_load_options_builder() {
        let options = LoadOptions::default().root_name("trawler").eager(true);
        assert_eq!(options.root_name.as_deref(), Some("trawler"));
        assert!(options.eager);
        assert!(options.validate);
    }
}
