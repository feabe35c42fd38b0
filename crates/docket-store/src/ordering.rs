//! Ordering normalization.
//!
//! Rewrites `section_order` and `order` into evenly spaced steps of 1000 so
//! the sequence survives canvas moves and leaves room for insertions.

use std::cmp::Ordering;
use std::collections::HashMap;

use docket_graph::{Graph, Node, NodeKind};

const STEP: u32 = 1000;

fn compare(a: &Node, b: &Node, key: fn(&Node) -> f64) -> Ordering {
    key(a).total_cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
}

fn spaced(index: usize) -> u32 {
    u32::try_from(index + 1).map_or(u32::MAX, |n| n.saturating_mul(STEP))
}

/// Normalize ordering keys in place; returns whether anything changed.
///
/// Sections are numbered by `section_order`, `order`, canvas y, then id.
/// Within each section, items are numbered by `order`, canvas y, then id.
/// Nodes outside any known section keep their keys.
pub fn normalize_graph_ordering(graph: &mut Graph) -> bool {
    let mut sections: Vec<&Node> = graph.nodes_of_kind(NodeKind::Section).collect();
    sections.sort_by(|a, b| compare(a, b, Node::section_sort_key));

    let mut section_orders: HashMap<String, u32> = HashMap::new();
    let mut item_orders: HashMap<String, u32> = HashMap::new();
    for (index, section) in sections.iter().enumerate() {
        section_orders.insert(section.id.clone(), spaced(index));

        let mut items: Vec<&Node> = graph
            .nodes
            .iter()
            .filter(|node| node.kind.is_section_item())
            .filter(|node| node.section_id.as_deref() == Some(section.id.as_str()))
            .collect();
        items.sort_by(|a, b| compare(a, b, Node::item_sort_key));
        for (position, item) in items.iter().enumerate() {
            item_orders.insert(item.id.clone(), spaced(position));
        }
    }

    let mut changed = false;
    for node in &mut graph.nodes {
        let target = if node.kind == NodeKind::Section {
            section_orders.get(&node.id).map(|order| (&mut node.section_order, *order))
        } else if node.section_id.is_some() {
            item_orders.get(&node.id).map(|order| (&mut node.order, *order))
        } else {
            None
        };
        if let Some((slot, order)) = target {
            if *slot != Some(order) {
                *slot = Some(order);
                changed = true;
            }
        }
    }
    changed
}
