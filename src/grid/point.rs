//! Coordinates addressed by dimension name.

/// A set of `dimension name -> coordinate` assignments.
///
/// Used both as a full point (nearest, interp) and as a partial selector (slice).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DimensionPoint {
    coords: Vec<(String, f64)>,
}

impl DimensionPoint {
    /// Create an empty point.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coordinate of a dimension, replacing a previous assignment.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.coords.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.coords.push((name, value)),
        }
    }

    /// Builder form of [`DimensionPoint::set`].
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Coordinate assigned to a dimension.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.coords.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Check whether a dimension is assigned.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of assigned dimensions.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// True when nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Assigned dimension names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.coords.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over assignments.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.coords.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for DimensionPoint {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut point = Self::new();
        for (name, value) in iter {
            point.set(name, value);
        }
        point
    }
}

impl<S: Into<String>, const N: usize> From<[(S, f64); N]> for DimensionPoint {
    fn from(coords: [(S, f64); N]) -> Self {
        coords.into_iter().collect()
    }
}
