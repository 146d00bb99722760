//! Versioned structural rules for POEM containers.
//!
//! Checks read only the layout of a container (groups, attributes, coordinate
//! values, variable dimensions), never table payloads. Every rule runs; the
//! report lists all violations found.

mod registry;
mod report;
mod rules;
mod structure;

use std::path::Path;

use tracing::{info, warn};

use crate::error::{PoemError, Result};
use crate::node::PolarNode;

pub use registry::{
    current, mandatory_polar_tables, specification, versions, PolarEntry, Rule, Specification,
    CURRENT_VERSION,
};
pub use report::{SpecReport, Violation};
pub(crate) use registry::legacy_mode;
pub use structure::{CoordinateStructure, GroupStructure, Structure, VariableStructure};

/// Whether the container at `path` satisfies the version it declares.
pub fn spec_check(path: impl AsRef<Path>) -> Result<bool> {
    Ok(spec_report(path)?.is_compliant())
}

/// Every violation of the container at `path` against the version it declares.
pub fn spec_report(path: impl AsRef<Path>) -> Result<SpecReport> {
    let path = path.as_ref();
    let structure = Structure::from_file(path)?;
    let report = check_structure(&structure)?;
    if report.is_compliant() {
        info!("{} complies with POEM v{}", path.display(), report.version);
    } else {
        info!(
            "{} does not comply with POEM v{} ({} violations)",
            path.display(),
            report.version,
            report.violations.len()
        );
    }
    Ok(report)
}

/// Declared specification version of the container at `path`; 0 if undeclared.
pub fn get_version(path: impl AsRef<Path>) -> Result<u32> {
    Structure::from_file(path.as_ref())?.declared_version()
}

/// Evaluate a structure against the version it declares.
pub fn check_structure(structure: &Structure) -> Result<SpecReport> {
    let version = structure.declared_version()?;
    let spec = specification(version).ok_or(PoemError::UnsupportedVersion(version))?;
    Ok(evaluate(spec, structure))
}

/// Evaluate the layout a tree would be written with against the current version.
pub fn check_node(node: &PolarNode) -> Result<SpecReport> {
    let structure = Structure::from_node(node, node.name())?;
    Ok(evaluate(current(), &structure))
}

/// Evaluate a structure against one given rule set.
pub fn evaluate(spec: &Specification, structure: &Structure) -> SpecReport {
    let mut violations = Vec::new();
    for rule in spec.rules {
        for message in (rule.check)(spec, structure) {
            warn!("POEM v{} {}: {}", spec.version, rule.id, message);
            violations.push(Violation {
                rule: rule.id,
                message,
            });
        }
    }
    SpecReport {
        version: spec.version,
        violations,
    }
}
