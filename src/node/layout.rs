//! Structural description of a tree, without numeric payloads.

use serde::Serialize;
use serde_json::{Map, Value};

use super::PolarNode;
use crate::error::Result;

impl PolarNode {
    /// Nested `name -> substructure` map. A polar maps to the list of its table names.
    pub fn layout(&self) -> Value {
        let mut root = Map::new();
        root.insert(self.name().to_string(), layout_of(self));
        Value::Object(root)
    }

    /// [`PolarNode::layout`] as JSON text, compact or indented by `indent` spaces.
    pub fn layout_string(&self, indent: Option<usize>) -> Result<String> {
        let layout = self.layout();
        let Some(width) = indent else {
            return Ok(serde_json::to_string(&layout)?);
        };
        let spaces = vec![b' '; width];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&spaces);
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        layout.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn layout_of(node: &PolarNode) -> Value {
    match node {
        PolarNode::Table(t) => Value::String(t.name().to_string()),
        PolarNode::Polar(p) => Value::Array(
            p.table_names()
                .into_iter()
                .map(|n| Value::String(n.to_string()))
                .collect(),
        ),
        _ => Value::Object(
            node.children()
                .iter()
                .map(|c| (c.name().to_string(), layout_of(c)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::grid::{Dimension, DimensionGrid, DimensionSet};
    use crate::node::{Polar, PolarMode, PolarSet};

    fn tree() -> PolarNode {
        let set = DimensionSet::new(vec![Dimension::new("TWS_Coord", "kt", "True Wind Speed")]).unwrap();
        let grid = Arc::new(DimensionGrid::with_values(set, vec![vec![0.0, 10.0]]).unwrap());
        let mut polar = Polar::new("MPPP", PolarMode::MPPP, grid).unwrap();
        polar.new_table::<f64>("TOTAL_POWER", "kW", "Total power").unwrap().fill_with(1.0);
        polar.new_table::<i32>("SOLVER_STATUS", "-", "Status").unwrap().fill_with(1);
        let mut set = PolarSet::new("loaded");
        set.add_polar(polar).unwrap();
        let mut root = PolarNode::group("vessel");
        root.attach(set).unwrap();
        root
    }

    #[test]
    fn test_layout_nesting() {
        assert_eq!(
            tree().layout(),
            json!({"vessel": {"loaded": {"MPPP": ["TOTAL_POWER", "SOLVER_STATUS"]}}})
        );
    }

    #[test]
    fn test_layout_indent() {
        let text = tree().layout_string(Some(2)).unwrap();
        assert!(text.starts_with("{\n  \"vessel\""));
        let compact = tree().layout_string(None).unwrap();
        assert!(!compact.contains('\n'));
    }
}
