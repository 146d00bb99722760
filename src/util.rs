//! Human readable renderings of a polar tree.

use std::fmt::Write;

use crate::node::PolarNode;

/// Box-drawing rendering of the tree below `node`, the node itself on the first line.
pub fn render_tree(node: &PolarNode) -> String {
    let mut result = format!("{}\n", display_name(node));
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        result.push_str(&format_tree_recursive(child, "", i == children.len() - 1));
    }
    result
}

fn format_tree_recursive(node: &PolarNode, prefix: &str, is_last: bool) -> String {
    let mut result = String::new();

    let connector = if is_last { "└── " } else { "├── " };
    result.push_str(&format!("{}{}{}\n", prefix, connector, display_name(node)));

    let new_prefix = format!("{}{}   ", prefix, if is_last { " " } else { "│" });

    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let is_last_child = i == children.len() - 1;
        result.push_str(&format_tree_recursive(child, &new_prefix, is_last_child));
    }

    result
}

fn display_name(node: &PolarNode) -> String {
    match node {
        PolarNode::Polar(polar) => format!("{} [Polar {}]", polar.name(), polar.mode()),
        PolarNode::Table(table) if table.unit().is_empty() => {
            format!("{} ({})", table.name(), table.datatype())
        }
        PolarNode::Table(table) => {
            format!("{} ({}, {})", table.name(), table.datatype(), table.unit())
        }
        _ => format!("{} [{}]", node.name(), node.kind().as_str()),
    }
}

/// Summary of every polar below `node`: mode, dimensions and table count.
pub fn describe(node: &PolarNode) -> String {
    let mut text = String::new();
    let polars = node.polars();
    if polars.is_empty() {
        text.push_str("No polar found\n");
        return text;
    }

    for (path, polar) in polars {
        let _ = writeln!(text, "Polar: {}", path);
        if !polar.description().is_empty() {
            let _ = writeln!(text, "  Description: {}", polar.description());
        }
        let _ = writeln!(
            text,
            "  Mode: {} (control: {:?})",
            polar.mode(),
            polar.mode().control_type()
        );

        let grid = polar.dimension_grid();
        text.push_str("  Dimensions:\n");
        for (idx, dimension) in grid.dimension_set().iter().enumerate() {
            let values = grid.values_at(idx);
            let _ = writeln!(
                text,
                "    {} [{}] ({}): {:?}",
                dimension.name(),
                dimension.unit(),
                values.len(),
                values
            );
        }

        let names = polar.table_names();
        let _ = writeln!(text, "  Tables ({}): {}", names.len(), names.join(", "));
        let missing = polar.missing_mandatory_tables();
        if !missing.is_empty() {
            let _ = writeln!(text, "  Missing mandatory tables: {}", missing.join(", "));
        }
        text.push('\n');
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PolarSet;

    #[test]
    fn test_render_tree_connectors() {
        let mut root = PolarNode::group("fleet");
        root.attach(PolarNode::group("a")).unwrap();
        root.attach(PolarSet::new("b")).unwrap();

        let tree = render_tree(&root);
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines[0], "fleet [PolarNode]");
        assert_eq!(lines[1], "├── a [PolarNode]");
        assert_eq!(lines[2], "└── b [PolarSet]");
    }

    #[test]
    fn test_describe_without_polars() {
        assert_eq!(describe(&PolarNode::group("empty")), "No polar found\n");
    }
}
