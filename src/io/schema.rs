//! Attribute names and values of POEM containers.

use std::collections::BTreeMap;

use crate::grid::Dimension;
use crate::node::{NodeKind, PolarNode};
use crate::spec::CURRENT_VERSION;
use crate::table::AnyPolarTable;

pub(crate) const FILE_TYPE: &str = "file_type";
pub(crate) const FILE_TYPE_POEM: &str = "poem";
pub(crate) const FORMAT_VERSION: &str = "poem_file_format_version";
pub(crate) const VESSEL_NAME: &str = "vessel_name";
pub(crate) const VESSEL_TYPE: &str = "vessel_type";
pub(crate) const NODE_TYPE: &str = "POEM_NODE_TYPE";
pub(crate) const POLAR_DIMENSION: &str = "POLAR_DIMENSION";
pub(crate) const POLAR_MODE: &str = "polar_mode";
pub(crate) const DESCRIPTION: &str = "description";
pub(crate) const UNIT: &str = "unit";

/// Keys managed by the codec; never copied into node attributes on load.
const RESERVED: [&str; 7] = [
    FILE_TYPE,
    FORMAT_VERSION,
    VESSEL_NAME,
    NODE_TYPE,
    POLAR_MODE,
    DESCRIPTION,
    UNIT,
];

pub(crate) fn is_reserved(key: &str) -> bool {
    RESERVED.contains(&key)
}

/// Attributes written on the group of a container node.
pub(crate) fn group_attributes(node: &PolarNode) -> BTreeMap<String, String> {
    let mut attrs = node.attributes().clone();
    attrs.insert(NODE_TYPE.to_string(), node.kind().container_tag().to_string());
    if let PolarNode::Polar(polar) = node {
        attrs.insert(POLAR_MODE.to_string(), polar.mode().to_string());
    }
    if !node.description().is_empty() {
        attrs.insert(DESCRIPTION.to_string(), node.description().to_string());
    }
    attrs
}

/// Attributes written on the root group.
pub(crate) fn root_attributes(node: &PolarNode, root_name: &str) -> BTreeMap<String, String> {
    let mut attrs = group_attributes(node);
    attrs.insert(FILE_TYPE.to_string(), FILE_TYPE_POEM.to_string());
    attrs.insert(FORMAT_VERSION.to_string(), format!("v{}", CURRENT_VERSION));
    attrs.insert(VESSEL_NAME.to_string(), root_name.to_string());
    attrs
}

/// Attributes of a coordinate variable.
pub(crate) fn dimension_attributes(dimension: &Dimension) -> BTreeMap<String, String> {
    BTreeMap::from([
        (UNIT.to_string(), dimension.unit().to_string()),
        (DESCRIPTION.to_string(), dimension.description().to_string()),
        (NODE_TYPE.to_string(), POLAR_DIMENSION.to_string()),
    ])
}

/// Attributes of a table variable.
pub(crate) fn table_attributes(table: &AnyPolarTable) -> BTreeMap<String, String> {
    let mut attrs = table.attributes().clone();
    attrs.insert(UNIT.to_string(), table.unit().to_string());
    attrs.insert(DESCRIPTION.to_string(), table.description().to_string());
    attrs.insert(NODE_TYPE.to_string(), NodeKind::Table.container_tag().to_string());
    attrs
}

/// Collect netCDF attributes as strings.
pub(crate) fn read_attributes<'a>(
    attributes: impl Iterator<Item = netcdf::Attribute<'a>>,
) -> BTreeMap<String, String> {
    attributes
        .map(|attr| (attr.name().to_string(), attr_value_to_string(&attr)))
        .collect()
}

/// Attributes that belong to the node rather than to the codec.
pub(crate) fn user_attributes(attrs: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    attrs
        .iter()
        .filter(|(k, _)| !is_reserved(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn attr_value_to_string(attr: &netcdf::Attribute<'_>) -> String {
    use netcdf::AttributeValue;

    match attr.value() {
        Ok(AttributeValue::Str(v)) => v,
        Ok(AttributeValue::Strs(v)) => v.join(", "),
        Ok(AttributeValue::Uchar(v)) => v.to_string(),
        Ok(AttributeValue::Schar(v)) => v.to_string(),
        Ok(AttributeValue::Ushort(v)) => v.to_string(),
        Ok(AttributeValue::Short(v)) => v.to_string(),
        Ok(AttributeValue::Uint(v)) => v.to_string(),
        Ok(AttributeValue::Int(v)) => v.to_string(),
        Ok(AttributeValue::Ulonglong(v)) => v.to_string(),
        Ok(AttributeValue::Longlong(v)) => v.to_string(),
        Ok(AttributeValue::Float(v)) => v.to_string(),
        Ok(AttributeValue::Double(v)) => v.to_string(),
        Ok(AttributeValue::Uchars(v)) => format!("{:?}", v),
        Ok(AttributeValue::Schars(v)) => format!("{:?}", v),
        Ok(AttributeValue::Ushorts(v)) => format!("{:?}", v),
        Ok(AttributeValue::Shorts(v)) => format!("{:?}", v),
        Ok(AttributeValue::Uints(v)) => format!("{:?}", v),
        Ok(AttributeValue::Ints(v)) => format!("{:?}", v),
        Ok(AttributeValue::Ulonglongs(v)) => format!("{:?}", v),
        Ok(AttributeValue::Longlongs(v)) => format!("{:?}", v),
        Ok(AttributeValue::Floats(v)) => format!("{:?}", v),
        Ok(AttributeValue::Doubles(v)) => format!("{:?}", v),
        Err(_) => String::new(),
    }
}

/// Major version of a `poem_file_format_version` value (`v1`, `1`, `1.2.0`, `v1.0`).
pub(crate) fn parse_version(value: &str) -> Option<u32> {
    let value = value.trim();
    let value = value
        .strip_prefix('v')
        .or_else(|| value.strip_prefix('V'))
        .unwrap_or(value);
    value.split('.').next()?.parse().ok()
}
