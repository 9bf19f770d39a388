//! Declaration ordering for a single-pass emitter (§4.4).
//!
//! All enumerations first, in insertion order; then nodes with every
//! parent emitted before its children (topological over the one-level
//! parent/child DAG that the parser/resolver guarantee); duplicates
//! suppressed via a visited set.

use astgen_parser::model::RawEnum;
use rustc_hash::FxHashMap;

use crate::model::{DeclRef, Node};

pub fn order(enums: &[RawEnum], nodes: &FxHashMap<String, Node>, node_order: &[String]) -> Vec<DeclRef> {
    let mut out = Vec::with_capacity(enums.len() + node_order.len());
    for e in enums {
        out.push(DeclRef::Enum(e.name.clone()));
    }

    let mut visited = rustc_hash::FxHashSet::default();
    for name in node_order {
        let Some(node) = nodes.get(name) else { continue };
        if node.parents.is_empty() && visited.insert(name.clone()) {
            out.push(DeclRef::Node(name.clone()));
            for child in &node.children {
                if visited.insert(child.clone()) {
                    out.push(DeclRef::Node(child.clone()));
                }
            }
        }
    }
    // Defensive: the parser/resolver guarantee every node is either a root
    // (no parents) or reached above as someone's child, but emit anything
    // left over rather than silently dropping it.
    for name in node_order {
        if visited.insert(name.clone()) {
            out.push(DeclRef::Node(name.clone()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use astgen_common::span::Span;

    fn node(name: &str, parents: Vec<&str>, children: Vec<&str>) -> Node {
        Node {
            name: name.to_string(),
            fqn: name.to_string(),
            attributes: Default::default(),
            parents: parents.into_iter().map(String::from).collect(),
            children: children.into_iter().map(String::from).collect(),
            fields: Vec::new(),
            public_blocks: Vec::new(),
            private_blocks: Vec::new(),
            guards: Default::default(),
            span: Span::point(0),
        }
    }

    #[test]
    fn parents_precede_children_and_enums_come_first() {
        let mut nodes = FxHashMap::default();
        nodes.insert("Expr".to_string(), node("Expr", vec![], vec!["Binary"]));
        nodes.insert("Binary".to_string(), node("Binary", vec!["Expr"], vec![]));
        let enums = vec![RawEnum {
            name: "Color".to_string(),
            variants: vec!["Red".to_string()],
            span: Span::point(0),
        }];
        let order_list = vec!["Expr".to_string(), "Binary".to_string()];
        let ordered = order(&enums, &nodes, &order_list);
        assert_eq!(
            ordered,
            vec![
                DeclRef::Enum("Color".to_string()),
                DeclRef::Node("Expr".to_string()),
                DeclRef::Node("Binary".to_string()),
            ]
        );
    }

    #[test]
    fn standalone_nodes_keep_their_declaration_order() {
        let mut nodes = FxHashMap::default();
        nodes.insert("A".to_string(), node("A", vec![], vec![]));
        nodes.insert("B".to_string(), node("B", vec![], vec![]));
        let order_list = vec!["A".to_string(), "B".to_string()];
        let ordered = order(&[], &nodes, &order_list);
        assert_eq!(
            ordered,
            vec![DeclRef::Node("A".to_string()), DeclRef::Node("B".to_string())]
        );
    }
}
