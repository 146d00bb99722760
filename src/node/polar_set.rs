//! Sets of polars, at most one per mode.

use std::collections::BTreeMap;

use super::handle::PolarMut;
use super::{Polar, PolarMode, PolarNode};
use crate::error::{PoemError, Result};

/// Collection holding at most one [`Polar`] per [`PolarMode`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolarSet {
    pub(super) name: String,
    pub(super) description: String,
    pub(super) attributes: BTreeMap<String, String>,
    pub(super) children: Vec<PolarNode>,
}

impl PolarSet {
    /// Create an empty polar set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Free-form key/value attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Mutable access to the attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.attributes
    }

    /// Add a polar. Fails if a polar of the same mode, or of the same name, is present.
    pub fn add_polar(&mut self, polar: Polar) -> Result<()> {
        if self.has_polar(polar.mode()) {
            return Err(PoemError::DuplicateMode {
                polar_set: self.name.clone(),
                mode: polar.mode().to_string(),
            });
        }
        if self.children.iter().any(|c| c.name() == polar.name()) {
            return Err(PoemError::name_conflict(&self.name, polar.name()));
        }
        self.children.push(PolarNode::Polar(polar));
        Ok(())
    }

    /// Check if a polar of that mode is present.
    pub fn has_polar(&self, mode: PolarMode) -> bool {
        self.polars().any(|p| p.mode() == mode)
    }

    /// Polar of a given mode.
    pub fn polar(&self, mode: PolarMode) -> Result<&Polar> {
        self.polars()
            .find(|p| p.mode() == mode)
            .ok_or_else(|| PoemError::path_not_found(format!("{}/{}", self.name, mode)))
    }

    /// Handle on the polar of a given mode.
    pub fn polar_mut(&mut self, mode: PolarMode) -> Result<PolarMut<'_>> {
        let set = self.name.clone();
        self.children
            .iter_mut()
            .filter_map(|c| match c {
                PolarNode::Polar(p) => Some(p),
                _ => None,
            })
            .find(|p| p.mode() == mode)
            .map(PolarMut::new)
            .ok_or_else(|| PoemError::path_not_found(format!("{}/{}", set, mode)))
    }

    /// Polars in insertion order.
    pub fn polars(&self) -> impl Iterator<Item = &Polar> {
        self.children.iter().filter_map(|c| match c {
            PolarNode::Polar(p) => Some(p),
            _ => None,
        })
    }

    /// Modes present in the set.
    pub fn modes(&self) -> Vec<PolarMode> {
        self.polars().map(Polar::mode).collect()
    }

    /// Detach the polar of a given mode.
    pub fn remove_polar(&mut self, mode: PolarMode) -> Result<Polar> {
        let idx = self
            .children
            .iter()
            .position(|c| matches!(c, PolarNode::Polar(p) if p.mode() == mode))
            .ok_or_else(|| PoemError::path_not_found(format!("{}/{}", self.name, mode)))?;
        match self.children.remove(idx) {
            PolarNode::Polar(p) => Ok(p),
            other => Err(PoemError::TypeMismatch {
                name: other.name().to_string(),
                expected: "Polar",
                found: other.kind().as_str(),
            }),
        }
    }
}
