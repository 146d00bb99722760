//! The polymorphic tree node.

use std::collections::BTreeMap;

use super::{mount, NodeMut, Polar, PolarGroup, PolarSet};
use crate::error::{PoemError, Result};
use crate::table::{AnyPolarTable, PolarTable};

/// Kind of a [`PolarNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Generic container.
    Group,
    /// Set of polars.
    PolarSet,
    /// Polar.
    Polar,
    /// Table leaf.
    Table,
}

impl NodeKind {
    /// Human readable kind name.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Group => "PolarNode",
            NodeKind::PolarSet => "PolarSet",
            NodeKind::Polar => "Polar",
            NodeKind::Table => "PolarTable",
        }
    }

    /// Value of the `POEM_NODE_TYPE` attribute in containers.
    pub fn container_tag(self) -> &'static str {
        match self {
            NodeKind::Group => "POLAR_NODE",
            NodeKind::PolarSet => "POLAR_SET",
            NodeKind::Polar => "POLAR",
            NodeKind::Table => "POLAR_TABLE",
        }
    }
}

/// A node of the polar tree.
///
/// Parents own their children by value; paths are computed from the root on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum PolarNode {
    /// Generic container of groups and polar sets.
    Group(PolarGroup),
    /// At most one polar per mode.
    PolarSet(PolarSet),
    /// Tables sharing a grid.
    Polar(Polar),
    /// Leaf table.
    Table(AnyPolarTable),
}

macro_rules! dispatch {
    ($self:expr, $n:ident => $container:expr, $t:ident => $table:expr) => {
        match $self {
            PolarNode::Group($n) => $container,
            PolarNode::PolarSet($n) => $container,
            PolarNode::Polar($n) => $container,
            PolarNode::Table($t) => $table,
        }
    };
}

impl PolarNode {
    /// Create an empty generic group node.
    pub fn group(name: impl Into<String>) -> Self {
        PolarNode::Group(PolarGroup::new(name))
    }

    /// Kind of the node.
    pub fn kind(&self) -> NodeKind {
        match self {
            PolarNode::Group(_) => NodeKind::Group,
            PolarNode::PolarSet(_) => NodeKind::PolarSet,
            PolarNode::Polar(_) => NodeKind::Polar,
            PolarNode::Table(_) => NodeKind::Table,
        }
    }

    /// Node name.
    pub fn name(&self) -> &str {
        dispatch!(self, n => &n.name, t => t.name())
    }

    /// Rename the node. A node held by a parent is renamed with
    /// [`PolarNode::rename_child`] on that parent.
    pub fn rename(&mut self, name: impl Into<String>) {
        dispatch!(self, n => n.name = name.into(), t => t.rename(name))
    }

    /// Free text description, empty when unset.
    pub fn description(&self) -> &str {
        dispatch!(self, n => &n.description, t => t.description())
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        dispatch!(
            self,
            n => n.description = description.into(),
            t => t.set_description(description)
        )
    }

    /// Extra key/value attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        dispatch!(self, n => &n.attributes, t => t.attributes())
    }

    /// Mutable access to the attributes.
    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        dispatch!(self, n => &mut n.attributes, t => t.attributes_mut())
    }

    /// Children in insertion order. Tables have none.
    pub fn children(&self) -> &[PolarNode] {
        dispatch!(self, n => &n.children, _t => &[])
    }

    pub(crate) fn children_mut(&mut self) -> &mut [PolarNode] {
        dispatch!(self, n => &mut n.children, _t => &mut [])
    }

    /// True for leaves.
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// True for a generic group.
    pub fn is_group(&self) -> bool {
        matches!(self, PolarNode::Group(_))
    }

    /// True for a polar set.
    pub fn is_polar_set(&self) -> bool {
        matches!(self, PolarNode::PolarSet(_))
    }

    /// True for a polar.
    pub fn is_polar(&self) -> bool {
        matches!(self, PolarNode::Polar(_))
    }

    /// True for a table.
    pub fn is_polar_table(&self) -> bool {
        matches!(self, PolarNode::Table(_))
    }

    fn mismatch(&self, expected: NodeKind) -> PoemError {
        PoemError::TypeMismatch {
            name: self.name().to_string(),
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    /// Borrow as a generic group.
    pub fn as_group(&self) -> Result<&PolarGroup> {
        match self {
            PolarNode::Group(g) => Ok(g),
            _ => Err(self.mismatch(NodeKind::Group)),
        }
    }

    /// Borrow as a polar set.
    pub fn as_polar_set(&self) -> Result<&PolarSet> {
        match self {
            PolarNode::PolarSet(s) => Ok(s),
            _ => Err(self.mismatch(NodeKind::PolarSet)),
        }
    }

    /// Mutably borrow as a polar set.
    pub fn as_polar_set_mut(&mut self) -> Result<&mut PolarSet> {
        match self {
            PolarNode::PolarSet(s) => Ok(s),
            _ => Err(self.mismatch(NodeKind::PolarSet)),
        }
    }

    /// Borrow as a polar.
    pub fn as_polar(&self) -> Result<&Polar> {
        match self {
            PolarNode::Polar(p) => Ok(p),
            _ => Err(self.mismatch(NodeKind::Polar)),
        }
    }

    /// Mutably borrow as a polar.
    pub fn as_polar_mut(&mut self) -> Result<&mut Polar> {
        match self {
            PolarNode::Polar(p) => Ok(p),
            _ => Err(self.mismatch(NodeKind::Polar)),
        }
    }

    /// Borrow as a table.
    pub fn as_polar_table(&self) -> Result<&AnyPolarTable> {
        match self {
            PolarNode::Table(t) => Ok(t),
            _ => Err(self.mismatch(NodeKind::Table)),
        }
    }

    /// Mutably borrow as a table.
    pub fn as_polar_table_mut(&mut self) -> Result<&mut AnyPolarTable> {
        match self {
            PolarNode::Table(t) => Ok(t),
            _ => Err(self.mismatch(NodeKind::Table)),
        }
    }

    /// Direct child by name.
    pub fn child(&self, name: &str) -> Option<&PolarNode> {
        self.children().iter().find(|c| c.name() == name)
    }

    /// Handle on a direct child.
    pub fn child_mut(&mut self, name: &str) -> Option<NodeMut<'_>> {
        self.child_slot(name).map(NodeMut::new)
    }

    pub(crate) fn child_slot(&mut self, name: &str) -> Option<&mut PolarNode> {
        self.children_mut().iter_mut().find(|c| c.name() == name)
    }

    /// Rename a direct child. The new name must be free among its siblings.
    pub fn rename_child(&mut self, name: &str, new_name: impl Into<String>) -> Result<()> {
        let new_name = new_name.into();
        if new_name != name && self.child(&new_name).is_some() {
            return Err(PoemError::name_conflict(self.name(), new_name));
        }
        let parent = self.name().to_string();
        let child = self
            .child_slot(name)
            .ok_or_else(|| PoemError::path_not_found(format!("{}/{}", parent, name)))?;
        child.rename(new_name);
        Ok(())
    }

    /// Attach a child, enforcing which kinds may hold which.
    ///
    /// Groups take groups and polar sets, polar sets take polars of a new mode,
    /// polars take tables on an equal grid. Names must be unique among siblings.
    pub fn attach(&mut self, child: impl Into<PolarNode>) -> Result<()> {
        let child = child.into();
        mount::check_compatible(self, &child)?;
        match self {
            PolarNode::Group(_) => self.push_child(child),
            PolarNode::PolarSet(set) => match child {
                PolarNode::Polar(polar) => set.add_polar(polar),
                other => Err(self.incompatible(&other)),
            },
            PolarNode::Polar(polar) => match child {
                PolarNode::Table(table) => polar.add_table(table),
                other => Err(self.incompatible(&other)),
            },
            PolarNode::Table(_) => Err(self.incompatible(&child)),
        }
    }

    fn incompatible(&self, child: &PolarNode) -> PoemError {
        mount::incompatible(self, child)
    }

    /// Append a child without kind checks. Sibling names stay unique.
    pub(crate) fn push_child(&mut self, child: PolarNode) -> Result<()> {
        if self.child(child.name()).is_some() {
            return Err(PoemError::name_conflict(self.name(), child.name()));
        }
        if self.is_polar_table() {
            return Err(self.incompatible(&child));
        }
        dispatch!(self, n => n.children.push(child), _t => {});
        Ok(())
    }

    /// Detach a direct child.
    pub fn remove(&mut self, name: &str) -> Result<PolarNode> {
        let Some(idx) = self.children().iter().position(|c| c.name() == name) else {
            return Err(PoemError::path_not_found(format!("{}/{}", self.name(), name)));
        };
        let removed = dispatch!(self, n => Some(n.children.remove(idx)), _t => None);
        removed.ok_or_else(|| PoemError::path_not_found(name))
    }
}

impl From<PolarGroup> for PolarNode {
    fn from(group: PolarGroup) -> Self {
        PolarNode::Group(group)
    }
}

impl From<PolarSet> for PolarNode {
    fn from(set: PolarSet) -> Self {
        PolarNode::PolarSet(set)
    }
}

impl From<Polar> for PolarNode {
    fn from(polar: Polar) -> Self {
        PolarNode::Polar(polar)
    }
}

impl From<AnyPolarTable> for PolarNode {
    fn from(table: AnyPolarTable) -> Self {
        PolarNode::Table(table)
    }
}

impl From<PolarTable<f64>> for PolarNode {
    fn from(table: PolarTable<f64>) -> Self {
        PolarNode::Table(table.into())
    }
}

impl From<PolarTable<i32>> for PolarNode {
    fn from(table: PolarTable<i32>) -> Self {
        PolarNode::Table(table.into())
    }
}
