//! Generic container nodes.

use std::collections::BTreeMap;

use super::PolarNode;

/// A generic named container. Holds groups and polar sets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolarGroup {
    pub(super) name: String,
    pub(super) description: String,
    pub(super) attributes: BTreeMap<String, String>,
    pub(super) children: Vec<PolarNode>,
}

impl PolarGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free text description.
    pub fn description(&self) -> &str {
        &self.description
    }
}
