//! Section projection for client runners

use std::cmp::Ordering;

use docket_graph::{Graph, Node, NodeKind, ResponsesByNode};
use indexmap::IndexMap;

use crate::legacy::LegacyCatalog;
use crate::visibility::Visibility;

/// A section and the nodes grouped under it
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedSection<'a> {
    /// The section; `None` for the trailing unsectioned bucket
    pub section: Option<&'a Node>,
    /// Items, ordered
    pub nodes: Vec<&'a Node>,
}

fn by_key(a: &Node, b: &Node, key: fn(&Node) -> f64) -> Ordering {
    key(a).total_cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
}

/// Group client-visible, non-structural nodes under client-visible sections.
///
/// Sections are ordered by `section_order`, `order`, canvas y, then id;
/// items by `order`, canvas y, then id. Nodes whose section is missing or
/// hidden land in a trailing bucket with no section.
#[must_use]
pub fn project_graph_to_sections(graph: &Graph) -> Vec<ProjectedSection<'_>> {
    let mut sections: Vec<&Node> = graph
        .nodes_of_kind(NodeKind::Section)
        .filter(|node| node.client_visible)
        .collect();
    sections.sort_by(|a, b| by_key(a, b, Node::section_sort_key));

    let mut buckets: IndexMap<&str, Vec<&Node>> = sections
        .iter()
        .map(|section| (section.id.as_str(), Vec::new()))
        .collect();
    let mut unsectioned: Vec<&Node> = Vec::new();

    for node in graph
        .nodes
        .iter()
        .filter(|node| node.client_visible && !node.kind.is_structural())
    {
        let bucket = node
            .section_id
            .as_deref()
            .and_then(|id| buckets.get_mut(id));
        match bucket {
            Some(items) => items.push(node),
            None => unsectioned.push(node),
        }
    }

    let mut projected: Vec<ProjectedSection<'_>> = sections
        .into_iter()
        .map(|section| {
            let mut nodes = buckets.get(section.id.as_str()).cloned().unwrap_or_default();
            nodes.sort_by(|a, b| by_key(a, b, Node::item_sort_key));
            ProjectedSection {
                section: Some(section),
                nodes,
            }
        })
        .collect();

    if !unsectioned.is_empty() {
        unsectioned.sort_by(|a, b| by_key(a, b, Node::item_sort_key));
        projected.push(ProjectedSection {
            section: None,
            nodes: unsectioned,
        });
    }
    projected
}

/// Section projection restricted to currently visible nodes; sections left
/// empty are dropped
#[must_use]
pub fn visible_sections<'a>(
    graph: &'a Graph,
    responses: &ResponsesByNode<'_>,
    catalog: &dyn LegacyCatalog,
) -> Vec<ProjectedSection<'a>> {
    let visibility = Visibility::new(graph, responses, catalog);
    project_graph_to_sections(graph)
        .into_iter()
        .filter_map(|mut bucket| {
            if bucket.section.is_some_and(|section| !visibility.is_visible(section)) {
                return None;
            }
            bucket.nodes.retain(|node| visibility.is_visible(node));
            (!bucket.nodes.is_empty()).then_some(bucket)
        })
        .collect()
}

/// Required nodes of `sections` with neither a meaningful value nor a skip
#[must_use]
pub fn missing_required<'a>(
    sections: &[ProjectedSection<'a>],
    responses: &ResponsesByNode<'_>,
) -> Vec<&'a Node> {
    sections
        .iter()
        .flat_map(|bucket| bucket.nodes.iter().copied())
        .filter(|node| node.required)
        .filter(|node| {
            !responses
                .get(node.id.as_str())
                .is_some_and(|response| response.is_answered())
        })
        .collect()
}
