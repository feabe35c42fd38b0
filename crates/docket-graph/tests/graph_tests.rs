use docket_graph::{Edge, Graph, Node, NodeKind};
use proptest::prelude::*;

fn graph(count: usize, pairs: &[(usize, usize)]) -> Graph {
    let mut nodes = vec![Node::new(NodeKind::Start, "n0")];
    nodes.extend((1..count).map(|i| Node::new(NodeKind::Question, format!("n{i}"))));
    nodes.push(Node::new(NodeKind::End, "end"));
    let edges = pairs
        .iter()
        .map(|(from, to)| Edge::always(format!("n{from}"), format!("n{to}")))
        .collect();
    Graph::from_parts(nodes, edges)
}

#[test]
fn test_start_and_end_cannot_be_removed() {
    let mut graph = graph(3, &[(0, 1), (1, 2)]);
    assert!(!graph.remove_node("n0"));
    assert!(!graph.remove_node("end"));
    assert!(graph.remove_node("n1"));
    assert!(graph.edges.is_empty());
    assert!(!graph.remove_node("n1"));
}

proptest! {
    #[test]
    fn prop_removal_leaves_no_dangling_edges(
        count in 2..12usize,
        pairs in prop::collection::vec((0..12usize, 0..12usize), 0..40),
        removals in prop::collection::vec(0..12usize, 0..6),
    ) {
        let pairs: Vec<(usize, usize)> = pairs
            .into_iter()
            .filter(|(from, to)| *from < count && *to < count)
            .collect();
        let mut graph = graph(count, &pairs);
        for index in removals {
            graph.remove_node(&format!("n{index}"));
        }

        prop_assert!(graph.contains_node("n0"));
        prop_assert!(graph.contains_node("end"));
        for edge in &graph.edges {
            prop_assert!(graph.contains_node(&edge.from));
            prop_assert!(graph.contains_node(&edge.to));
        }
    }
}
