//! Visibility evaluator
//!
//! A node is visible to the client when it is `client_visible`, passes the
//! legacy `show_if` gates of the step and field it mirrors, and (for
//! non-structural kinds) has either no incoming edges or at least one
//! incoming edge whose condition holds.

use std::borrow::Cow;
use std::collections::HashMap;

use docket_graph::{Edge, Graph, Node, ResponsesByNode};

use crate::condition::condition_matches;
use crate::legacy::{build_legacy_answers_from_responses, Answers, LegacyCatalog};

/// Visibility of the nodes of one graph against one set of responses.
///
/// Precomputes the legacy answer projection and the incoming-edge index so
/// repeated queries over the same graph stay linear overall.
pub struct Visibility<'a> {
    graph: &'a Graph,
    responses: &'a ResponsesByNode<'a>,
    catalog: &'a dyn LegacyCatalog,
    answers: Cow<'a, Answers>,
    incoming: HashMap<&'a str, Vec<&'a Edge>>,
}

impl<'a> Visibility<'a> {
    /// Evaluator that builds the legacy projection itself
    #[must_use]
    pub fn new(
        graph: &'a Graph,
        responses: &'a ResponsesByNode<'a>,
        catalog: &'a dyn LegacyCatalog,
    ) -> Self {
        let answers = build_legacy_answers_from_responses(graph, responses);
        Self::build(graph, responses, catalog, Cow::Owned(answers))
    }

    /// Evaluator over a precomputed legacy projection
    #[must_use]
    pub fn with_answers(
        graph: &'a Graph,
        responses: &'a ResponsesByNode<'a>,
        catalog: &'a dyn LegacyCatalog,
        answers: &'a Answers,
    ) -> Self {
        Self::build(graph, responses, catalog, Cow::Borrowed(answers))
    }

    fn build(
        graph: &'a Graph,
        responses: &'a ResponsesByNode<'a>,
        catalog: &'a dyn LegacyCatalog,
        answers: Cow<'a, Answers>,
    ) -> Self {
        let mut incoming: HashMap<&'a str, Vec<&'a Edge>> = HashMap::new();
        for edge in &graph.edges {
            incoming.entry(edge.to.as_str()).or_default().push(edge);
        }
        Self {
            graph,
            responses,
            catalog,
            answers,
            incoming,
        }
    }

    /// Legacy answer projection used for gating
    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Whether `node` is currently visible
    #[must_use]
    pub fn is_visible(&self, node: &Node) -> bool {
        if !passes_legacy_gate(node, self.catalog, &self.answers) {
            return false;
        }
        if node.kind.is_structural() {
            return true;
        }
        let Some(incoming) = self.incoming.get(node.id.as_str()) else {
            return true;
        };
        incoming.iter().any(|edge| {
            condition_matches(&edge.condition, self.responses.get(edge.from.as_str()).copied())
        })
    }

    /// Visible nodes, in declaration order
    pub fn visible_nodes(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.graph.nodes.iter().filter(move |node| self.is_visible(node))
    }
}

/// `client_visible` plus the legacy step and field `show_if` gates.
///
/// Steps or fields unknown to the catalog do not gate.
pub(crate) fn passes_legacy_gate(node: &Node, catalog: &dyn LegacyCatalog, answers: &Answers) -> bool {
    if !node.client_visible {
        return false;
    }
    let Some(step) = node.legacy_step_id.as_deref().and_then(|id| catalog.step(id)) else {
        return true;
    };
    if !step.is_shown(answers) {
        return false;
    }
    node.legacy_field_id
        .as_deref()
        .and_then(|id| step.field(id))
        .map_or(true, |field| field.is_shown(answers))
}

/// Whether `node` is currently visible to the client.
///
/// Pass `legacy_answers` when evaluating many nodes of the same graph, or use
/// [`Visibility`] directly.
#[must_use]
pub fn evaluate_node_visibility(
    node: &Node,
    graph: &Graph,
    responses: &ResponsesByNode<'_>,
    catalog: &dyn LegacyCatalog,
    legacy_answers: Option<&Answers>,
) -> bool {
    match legacy_answers {
        Some(answers) => Visibility::with_answers(graph, responses, catalog, answers).is_visible(node),
        None => Visibility::new(graph, responses, catalog).is_visible(node),
    }
}
