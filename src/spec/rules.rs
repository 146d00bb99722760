//! Rule functions shared by the specification versions.
//!
//! Every check returns one message per problem so a report lists all of them.

use super::registry::{PolarEntry, Specification};
use super::structure::{GroupStructure, Structure};
use crate::io::schema;

/// Root group declares the file type, the version and the vessel name.
pub(super) fn root_declaration(spec: &Specification, structure: &Structure) -> Vec<String> {
    let root = &structure.root;
    let mut found = Vec::new();
    match root.attribute(schema::FILE_TYPE) {
        Some(schema::FILE_TYPE_POEM) => {}
        Some(other) => found.push(format!(
            "root attribute {} is {}, expected {}",
            schema::FILE_TYPE,
            other,
            schema::FILE_TYPE_POEM
        )),
        None => found.push(format!("root attribute {} is missing", schema::FILE_TYPE)),
    }
    match root.attribute(schema::FORMAT_VERSION).map(schema::parse_version) {
        Some(Some(v)) if v == spec.version => {}
        Some(Some(v)) => found.push(format!(
            "root attribute {} declares v{}, checked against v{}",
            schema::FORMAT_VERSION,
            v,
            spec.version
        )),
        Some(None) => found.push(format!("root attribute {} is malformed", schema::FORMAT_VERSION)),
        None => found.push(format!("root attribute {} is missing", schema::FORMAT_VERSION)),
    }
    if root.attribute(schema::VESSEL_NAME).is_none() {
        found.push(format!("root attribute {} is missing", schema::VESSEL_NAME));
    }
    found
}

/// Dimension names of each polar form the canonical set of its mode.
pub(super) fn dimension_names(spec: &Specification, structure: &Structure) -> Vec<String> {
    let mut found = Vec::new();
    for entry in (spec.locate_polars)(structure) {
        let Some(mode) = entry.mode else {
            found.push(format!("cannot determine the mode of polar {}", entry.group.path));
            continue;
        };
        let canonical = (spec.canonical_dimensions)(mode);
        let mut dims = polar_dimensions(entry.group);
        for var in &entry.group.variables {
            if var.dimensions != dims {
                found.push(format!(
                    "in {}, table {} has dimensions ({}) while the polar has ({})",
                    entry.group.path,
                    var.name,
                    var.dimensions.join(", "),
                    dims.join(", ")
                ));
            }
        }
        dims.sort();
        let mut expected: Vec<&str> = canonical.to_vec();
        expected.sort_unstable();
        if dims != expected {
            found.push(format!(
                "in {}, {} polar has dimensions ({}), expected ({})",
                entry.group.path,
                mode,
                dims.join(", "),
                canonical.join(", ")
            ));
        }
        found.extend(missing_coordinates(entry.group, canonical));
    }
    found
}

/// Canonical coordinate variables exist in each polar group.
pub(super) fn canonical_coordinates(spec: &Specification, structure: &Structure) -> Vec<String> {
    (spec.locate_polars)(structure)
        .into_iter()
        .flat_map(|entry| {
            let canonical = entry.mode.map(spec.canonical_dimensions).unwrap_or(&[]);
            missing_coordinates(entry.group, canonical)
        })
        .collect()
}

fn missing_coordinates(group: &GroupStructure, canonical: &[&str]) -> Vec<String> {
    canonical
        .iter()
        .filter(|name| group.coordinate(name).is_none())
        .map(|name| format!("in {}, coordinate variable {} is missing", group.path, name))
        .collect()
}

/// Coordinates are non-negative and strictly increasing.
pub(super) fn coordinates_increasing(spec: &Specification, structure: &Structure) -> Vec<String> {
    let mut found = Vec::new();
    for entry in (spec.locate_polars)(structure) {
        for coord in &entry.group.coordinates {
            if coord.values.is_empty() {
                found.push(format!("in {}, coordinate {} is empty", entry.group.path, coord.name));
            }
            if let Some(v) = coord.values.iter().find(|v| !(**v >= 0.0)) {
                found.push(format!(
                    "in {}, coordinate {} has negative value {}",
                    entry.group.path, coord.name, v
                ));
            }
            if let Some(w) = coord.values.windows(2).find(|w| w[1] <= w[0]) {
                found.push(format!(
                    "in {}, coordinate {} is not strictly increasing ({} then {})",
                    entry.group.path, coord.name, w[0], w[1]
                ));
            }
        }
    }
    found
}

/// Angular coordinates lie within [0, 180].
pub(super) fn angles_bounded(spec: &Specification, structure: &Structure) -> Vec<String> {
    let mut found = Vec::new();
    for entry in (spec.locate_polars)(structure) {
        for coord in &entry.group.coordinates {
            if coord.attributes.get(schema::UNIT).map(String::as_str) != Some("deg") {
                continue;
            }
            if let Some(v) = coord.values.iter().find(|v| !(0.0..=180.0).contains(*v)) {
                found.push(format!(
                    "in {}, angular coordinate {} has value {} outside [0, 180]",
                    entry.group.path, coord.name, v
                ));
            }
        }
    }
    found
}

/// Every mandatory table of the mode is present.
pub(super) fn mandatory_tables(spec: &Specification, structure: &Structure) -> Vec<String> {
    let mut found = Vec::new();
    for entry in (spec.locate_polars)(structure) {
        let Some(mode) = entry.mode else {
            continue;
        };
        for name in (spec.mandatory_tables)(mode) {
            if !entry.group.variables.iter().any(|v| v.name == *name) {
                found.push(format!(
                    "in {}, mandatory table {} of {} polar is missing",
                    entry.group.path, name, mode
                ));
            }
        }
    }
    found
}

/// Dimensions are declared in canonical order.
pub(super) fn dimension_order(spec: &Specification, structure: &Structure) -> Vec<String> {
    let mut found = Vec::new();
    for entry in (spec.locate_polars)(structure) {
        let Some(mode) = entry.mode else {
            continue;
        };
        let canonical = (spec.canonical_dimensions)(mode);
        let dims = polar_dimensions(entry.group);
        let same_set = dims.len() == canonical.len() && canonical.iter().all(|c| dims.contains(c));
        if same_set && dims != canonical {
            found.push(format!(
                "in {}, dimensions are ordered ({}), expected ({})",
                entry.group.path,
                dims.join(", "),
                canonical.join(", ")
            ));
        }
    }
    found
}

/// Coordinates and tables carry a unit and a description.
pub(super) fn units_described(spec: &Specification, structure: &Structure) -> Vec<String> {
    let mut found = Vec::new();
    for entry in (spec.locate_polars)(structure) {
        let coords = entry.group.coordinates.iter().map(|c| (&c.name, &c.attributes));
        let vars = entry.group.variables.iter().map(|v| (&v.name, &v.attributes));
        for (name, attributes) in coords.chain(vars) {
            for key in [schema::UNIT, schema::DESCRIPTION] {
                if !attributes.contains_key(key) {
                    found.push(format!(
                        "in {}, variable {} has no {} attribute",
                        entry.group.path, name, key
                    ));
                }
            }
        }
    }
    found
}

/// Dimensions of a polar group: those of its first table, else its coordinates.
fn polar_dimensions(group: &GroupStructure) -> Vec<&str> {
    match group.variables.first() {
        Some(var) => var.dimensions.iter().map(String::as_str).collect(),
        None => group.coordinates.iter().map(|c| c.name.as_str()).collect(),
    }
}

/// Every group holding a polar.
pub(super) fn polars_by_tag(structure: &Structure) -> Vec<PolarEntry<'_>> {
    structure
        .root
        .walk()
        .into_iter()
        .filter(|g| g.is_polar())
        .map(|group| PolarEntry {
            group,
            mode: group.polar_mode(),
        })
        .collect()
}

/// Legacy single-polar files: the root group is the polar.
pub(super) fn root_polar(structure: &Structure) -> Vec<PolarEntry<'_>> {
    let group = &structure.root;
    let mode = super::registry::legacy_mode(group.attribute(schema::VESSEL_TYPE));
    vec![PolarEntry {
        group,
        mode: Some(mode),
    }]
}
