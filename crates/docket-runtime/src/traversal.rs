//! Edge traversal

use docket_graph::{Edge, ResponsesByNode};

use crate::condition::condition_matches;

/// Targets of the edges leaving `source_node_id` whose condition holds for
/// the source's response, in edge declaration order.
///
/// Legacy gating is not applied here; callers that need it check the
/// returned nodes with [`crate::Visibility`].
#[must_use]
pub fn next_node_ids(
    source_node_id: &str,
    edges: &[Edge],
    responses: &ResponsesByNode<'_>,
) -> Vec<String> {
    let source = responses.get(source_node_id).copied();
    edges
        .iter()
        .filter(|edge| edge.from == source_node_id)
        .filter(|edge| condition_matches(&edge.condition, source))
        .map(|edge| edge.to.clone())
        .collect()
}
