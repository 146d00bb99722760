//! Named physical axes.

use crate::error::{PoemError, Result};

/// A named physical axis (speed through water, true wind angle, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    name: String,
    unit: String,
    description: String,
}

impl Dimension {
    /// Create a new dimension.
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            description: description.into(),
        }
    }

    /// Dimension name, unique within a [`DimensionSet`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit of the coordinates.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Free text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Angular axes are bound to [0, 180] by the specification layer.
    pub fn is_angular(&self) -> bool {
        self.unit == "deg"
    }
}

/// Ordered set of dimensions. Order defines axis order of every array built on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DimensionSet {
    dimensions: Vec<Dimension>,
}

impl DimensionSet {
    /// Build a set, rejecting duplicated names.
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self> {
        for (i, dimension) in dimensions.iter().enumerate() {
            if dimensions[..i].iter().any(|d| d.name == dimension.name) {
                return Err(PoemError::invalid_grid(format!(
                    "dimension {} declared twice",
                    dimension.name
                )));
            }
        }
        Ok(Self { dimensions })
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// True when the set holds no dimension.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Position of a dimension.
    pub fn index(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name == name)
    }

    /// Check if a dimension is part of the set.
    pub fn contains(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    /// Dimension at position `idx`.
    pub fn get(&self, idx: usize) -> Option<&Dimension> {
        self.dimensions.get(idx)
    }

    /// Dimension by name.
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.dimensions.iter()
    }

    pub(crate) fn without(&self, removed: &[usize]) -> Self {
        Self {
            dimensions: self
                .dimensions
                .iter()
                .enumerate()
                .filter(|(i, _)| !removed.contains(i))
                .map(|(_, d)| d.clone())
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DimensionSet {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.dimensions.iter()
    }
}
