//! Slash-delimited addressing inside a tree.

use super::{NodeMut, Polar, PolarNode};
use crate::error::{PoemError, Result};

/// A borrowed node together with its root-relative path.
#[derive(Debug, Clone)]
pub struct NodeRef<'a> {
    /// The node.
    pub node: &'a PolarNode,
    /// Root-relative path: `/` for the root, `/a/b` below it.
    pub full_name: String,
}

/// Split a path into its non-empty segments. A leading `/` is optional.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

impl PolarNode {
    /// True if `path`, relative to this node, resolves.
    pub fn exists(&self, path: &str) -> bool {
        self.node_from_path(path).is_ok()
    }

    /// Resolve a path relative to this node. The empty path and `/` name the node itself.
    pub fn node_from_path(&self, path: &str) -> Result<&PolarNode> {
        let mut node = self;
        for segment in segments(path) {
            node = node
                .child(segment)
                .ok_or_else(|| PoemError::path_not_found(path))?;
        }
        Ok(node)
    }

    /// Handle on the node at `path`, for edits that keep the tree consistent.
    pub fn node_from_path_mut(&mut self, path: &str) -> Result<NodeMut<'_>> {
        self.resolve_mut(path).map(NodeMut::new)
    }

    pub(crate) fn resolve_mut(&mut self, path: &str) -> Result<&mut PolarNode> {
        let mut node = self;
        for segment in segments(path) {
            node = node
                .child_slot(segment)
                .ok_or_else(|| PoemError::path_not_found(path))?;
        }
        Ok(node)
    }

    /// Detach the node at `path`. The node itself cannot be removed this way.
    pub fn remove_path(&mut self, path: &str) -> Result<PolarNode> {
        let parts: Vec<&str> = segments(path).collect();
        let Some((name, parent)) = parts.split_last() else {
            return Err(PoemError::path_not_found(path));
        };
        let parent = self.resolve_mut(&parent.join("/"))?;
        parent
            .remove(name)
            .map_err(|_| PoemError::path_not_found(path))
    }

    /// Every node of the subtree in pre-order, this node first, with full names.
    pub fn descendants(&self) -> Vec<NodeRef<'_>> {
        let mut out = Vec::new();
        walk(self, "/".to_string(), &mut out);
        out
    }

    /// Full names of every table of the subtree.
    pub fn polar_table_paths(&self) -> Vec<String> {
        self.descendants()
            .into_iter()
            .filter(|n| n.node.is_polar_table())
            .map(|n| n.full_name)
            .collect()
    }

    /// Every polar of the subtree with its full name.
    pub fn polars(&self) -> Vec<(String, &Polar)> {
        self.descendants()
            .into_iter()
            .filter_map(|n| match n.node {
                PolarNode::Polar(p) => Some((n.full_name, p)),
                _ => None,
            })
            .collect()
    }
}

fn walk<'a>(node: &'a PolarNode, full_name: String, out: &mut Vec<NodeRef<'a>>) {
    let prefix = if full_name == "/" {
        String::new()
    } else {
        full_name.clone()
    };
    out.push(NodeRef { node, full_name });
    for child in node.children() {
        walk(child, format!("{}/{}", prefix, child.name()), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PolarSet;

    fn tree() -> PolarNode {
        let mut root = PolarNode::group("vessel");
        let mut sub = PolarNode::group("configs");
        sub.attach(PolarSet::new("loaded")).unwrap();
        root.attach(sub).unwrap();
        root
    }

    #[test]
    fn test_paths_resolve_from_node() {
        let root = tree();
        assert!(root.exists("configs/loaded"));
        assert!(root.exists("/configs/loaded"));
        assert!(root.exists(""));
        assert!(!root.exists("configs/ballast"));
        assert!(matches!(
            root.node_from_path("configs/ballast"),
            Err(PoemError::PathNotFound { .. })
        ));
        let sub = root.node_from_path("configs").unwrap();
        assert!(sub.node_from_path("loaded").unwrap().is_polar_set());
    }

    #[test]
    fn test_descendants_full_names() {
        let root = tree();
        let names: Vec<String> = root.descendants().into_iter().map(|n| n.full_name).collect();
        assert_eq!(names, vec!["/", "/configs", "/configs/loaded"]);
    }

    #[test]
    fn test_remove_path() {
        let mut root = tree();
        let removed = root.remove_path("configs/loaded").unwrap();
        assert_eq!(removed.name(), "loaded");
        assert!(!root.exists("configs/loaded"));
        assert!(root.remove_path("/").is_err());
    }
}
