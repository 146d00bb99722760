//! Payload-free snapshot of a container layout.

use std::collections::BTreeMap;
use std::path::Path;

use netcdf::types::{FloatType, IntType, NcVariableType};
use tracing::debug;

use crate::error::{ContainerContext, PoemError, Result};
use crate::io::schema;
use crate::node::{NodeKind, PolarMode, PolarNode};
use crate::table::Datatype;

/// A coordinate variable: one axis of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateStructure {
    /// Variable name, equal to its dimension name.
    pub name: String,
    /// Coordinate values.
    pub values: Vec<f64>,
    /// Variable attributes.
    pub attributes: BTreeMap<String, String>,
}

/// A data variable, described by its dimensions only.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableStructure {
    /// Variable name.
    pub name: String,
    /// Dimension names, in storage order.
    pub dimensions: Vec<String>,
    /// Storage type, when it is one a table can hold.
    pub datatype: Option<Datatype>,
    /// Variable attributes.
    pub attributes: BTreeMap<String, String>,
}

/// A group and everything below it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStructure {
    /// Group name, empty for the root group.
    pub name: String,
    /// Path from the root group, `/` for the root.
    pub path: String,
    /// Group attributes.
    pub attributes: BTreeMap<String, String>,
    /// Coordinate variables.
    pub coordinates: Vec<CoordinateStructure>,
    /// Other variables.
    pub variables: Vec<VariableStructure>,
    /// Subgroups.
    pub groups: Vec<GroupStructure>,
}

/// Layout of a whole container, from a file or from the tree it would be written from.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    /// The root group.
    pub root: GroupStructure,
}

impl GroupStructure {
    fn new(name: &str, path: String) -> Self {
        Self {
            name: name.to_string(),
            path,
            attributes: BTreeMap::new(),
            coordinates: Vec::new(),
            variables: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Coordinate variable by name.
    pub fn coordinate(&self, name: &str) -> Option<&CoordinateStructure> {
        self.coordinates.iter().find(|c| c.name == name)
    }

    /// Tagged as a polar, carries a mode attribute, or is named after a mode and holds tables.
    pub fn is_polar(&self) -> bool {
        self.attribute(schema::NODE_TYPE) == Some(NodeKind::Polar.container_tag())
            || self.attribute(schema::POLAR_MODE).is_some()
            || (PolarMode::is_mode(&self.name) && !self.variables.is_empty())
    }

    /// Tagged as a polar set, or every subgroup is a polar.
    pub fn is_polar_set(&self) -> bool {
        self.attribute(schema::NODE_TYPE) == Some(NodeKind::PolarSet.container_tag())
            || (!self.groups.is_empty() && self.groups.iter().all(GroupStructure::is_polar))
    }

    /// Mode from the `polar_mode` attribute, else from the group name.
    pub fn polar_mode(&self) -> Option<PolarMode> {
        self.attribute(schema::POLAR_MODE)
            .and_then(|m| m.parse().ok())
            .or_else(|| self.name.parse().ok())
    }

    /// This group and every group below it, pre-order.
    pub fn walk(&self) -> Vec<&GroupStructure> {
        let mut out = vec![self];
        for group in &self.groups {
            out.extend(group.walk());
        }
        out
    }
}

impl Structure {
    /// Read the layout of a netCDF container.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = netcdf::open(path).at(path)?;
        let root = file
            .root()
            .ok_or_else(|| PoemError::container(path, "container has no root group"))?;
        let root = read_group(&root, "", "/".to_string()).at(path)?;
        Ok(Self { root })
    }

    /// Layout the tree rooted at `node` would have once written under `root_name`.
    pub fn from_node(node: &PolarNode, root_name: &str) -> Result<Self> {
        if node.is_polar_table() {
            return Err(PoemError::TypeMismatch {
                name: node.name().to_string(),
                expected: "container node",
                found: "PolarTable",
            });
        }
        let mut root = node_group(node, "", "/".to_string());
        root.attributes = schema::root_attributes(node, root_name);
        Ok(Self { root })
    }

    /// Declared specification version; 0 when the root does not declare one.
    pub fn declared_version(&self) -> Result<u32> {
        match self.root.attribute(schema::FORMAT_VERSION) {
            None => Ok(0),
            Some(value) => schema::parse_version(value).ok_or_else(|| {
                PoemError::container(
                    Path::new(&self.root.path),
                    format!("malformed {} attribute: {}", schema::FORMAT_VERSION, value),
                )
            }),
        }
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

fn read_group(
    group: &netcdf::Group<'_>,
    name: &str,
    path: String,
) -> std::result::Result<GroupStructure, netcdf::Error> {
    debug!("Reading structure of group {}", path);
    let mut out = GroupStructure::new(name, path);
    out.attributes = schema::read_attributes(group.attributes());

    for var in group.variables() {
        let var_name = var.name();
        let dimensions: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d: &netcdf::Dimension<'_>| d.name().to_string())
            .collect();
        let attributes = schema::read_attributes(var.attributes());
        if dimensions.len() == 1 && dimensions[0] == var_name {
            out.coordinates.push(CoordinateStructure {
                values: var.get_values::<f64, _>(..)?,
                name: var_name,
                attributes,
            });
        } else {
            let datatype = match var.vartype() {
                NcVariableType::Float(FloatType::F64) => Some(Datatype::Real),
                NcVariableType::Int(IntType::I32) => Some(Datatype::Integer),
                _ => None,
            };
            out.variables.push(VariableStructure {
                name: var_name,
                dimensions,
                datatype,
                attributes,
            });
        }
    }

    for sub in group.groups() {
        let sub_name = sub.name();
        let sub_path = child_path(&out.path, &sub_name);
        out.groups.push(read_group(&sub, &sub_name, sub_path)?);
    }
    Ok(out)
}

fn node_group(node: &PolarNode, name: &str, path: String) -> GroupStructure {
    let mut out = GroupStructure::new(name, path);
    out.attributes = schema::group_attributes(node);

    match node {
        PolarNode::Polar(polar) => {
            let grid = polar.dimension_grid();
            for (idx, dimension) in grid.dimension_set().iter().enumerate() {
                out.coordinates.push(CoordinateStructure {
                    name: dimension.name().to_string(),
                    values: grid.values_at(idx).to_vec(),
                    attributes: schema::dimension_attributes(dimension),
                });
            }
            for table in polar.tables() {
                out.variables.push(VariableStructure {
                    name: table.name().to_string(),
                    dimensions: table
                        .dimension_grid()
                        .dimension_set()
                        .names()
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    datatype: Some(table.datatype()),
                    attributes: schema::table_attributes(table),
                });
            }
        }
        _ => {
            for child in node.children() {
                let path = child_path(&out.path, child.name());
                out.groups.push(node_group(child, child.name(), path));
            }
        }
    }
    out
}
