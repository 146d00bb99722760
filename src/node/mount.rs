//! Attaching subtrees across trees.

use tracing::info;

use super::PolarNode;
use crate::error::{PoemError, Result};

/// Check that `source` may be attached under `target`.
///
/// | target   | source              | extra check                      |
/// |----------|---------------------|----------------------------------|
/// | Group    | Group or PolarSet   |                                  |
/// | PolarSet | Polar               | no polar of that mode yet        |
/// | Polar    | PolarTable          | grid equal to the polar grid     |
pub(crate) fn check_compatible(target: &PolarNode, source: &PolarNode) -> Result<()> {
    match (target, source) {
        (PolarNode::Group(_), PolarNode::Group(_) | PolarNode::PolarSet(_)) => Ok(()),
        (PolarNode::PolarSet(set), PolarNode::Polar(polar)) => {
            if set.has_polar(polar.mode()) {
                return Err(PoemError::DuplicateMode {
                    polar_set: set.name().to_string(),
                    mode: polar.mode().to_string(),
                });
            }
            Ok(())
        }
        (PolarNode::Polar(polar), PolarNode::Table(table)) => {
            if **table.grid() != **polar.grid() {
                return Err(PoemError::incompatible_mount(format!(
                    "grid of table {} differs from the grid of polar {}",
                    table.name(),
                    polar.name()
                )));
            }
            Ok(())
        }
        _ => Err(incompatible(target, source)),
    }
}

pub(crate) fn incompatible(target: &PolarNode, source: &PolarNode) -> PoemError {
    PoemError::incompatible_mount(format!(
        "a {} cannot be mounted on a {} ({} onto {})",
        source.kind().as_str(),
        target.kind().as_str(),
        source.name(),
        target.name()
    ))
}

/// Attach `source` under the node at `target_path` of `target_root`.
///
/// The target path must exist; intermediate nodes are never created.
pub fn mount(target_root: &mut PolarNode, target_path: &str, source: PolarNode) -> Result<()> {
    let name = source.name().to_string();
    let target = target_root.resolve_mut(target_path)?;
    target.attach(source)?;
    info!("Mounted {} on {}", name, target_path);
    Ok(())
}

/// Copy the node at `source_path` of `source_root` under `target_path` of `target_root`.
pub fn mount_from(
    target_root: &mut PolarNode,
    target_path: &str,
    source_root: &PolarNode,
    source_path: &str,
) -> Result<()> {
    let source = source_root.node_from_path(source_path)?.clone();
    mount(target_root, target_path, source)
}
