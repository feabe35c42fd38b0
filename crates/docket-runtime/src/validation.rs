//! Graph Validator
//!
//! Structural checks run before a template version is published. Errors block
//! publishing; warnings are advisory. All problems are collected rather than
//! stopping at the first one.

use std::collections::{HashMap, HashSet};
use std::fmt;

use docket_graph::{EdgeCondition, Graph, NodeKind};
use serde::Serialize;

/// Problem that blocks publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    /// No start node
    #[error("Graph requires a Start node.")]
    MissingStart,

    /// No end node
    #[error("Graph requires an End node.")]
    MissingEnd,

    /// Edge source does not exist
    #[error("Edge {edge_id} has unknown source node.")]
    UnknownEdgeSource {
        /// Offending edge
        edge_id: String,
    },

    /// Edge target does not exist
    #[error("Edge {edge_id} has unknown target node.")]
    UnknownEdgeTarget {
        /// Offending edge
        edge_id: String,
    },

    /// The graph contains a cycle
    #[error("Cycles are not allowed (cycle through \"{node_id}\").")]
    CycleDetected {
        /// Node where the back edge closes the cycle
        node_id: String,
    },

    /// Answerable node without a filing label
    #[error("Node \"{title}\" must include at least one filing label.")]
    MissingLabel {
        /// Offending node
        node_id: String,
        /// Its title
        title: String,
    },

    /// Question without an input type
    #[error("Question \"{title}\" is missing an input type.")]
    MissingInputType {
        /// Offending node
        node_id: String,
        /// Its title
        title: String,
    },
}

/// Advisory problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Non-decision node that branches
    #[error("Node \"{title}\" has multiple outgoing edges; this can reduce predictability.")]
    MultipleOutgoing {
        /// Offending node
        node_id: String,
        /// Its title
        title: String,
    },

    /// Decision without both a yes and a no path
    #[error("Decision \"{title}\" should define both Yes and No paths.")]
    IncompleteDecision {
        /// Offending node
        node_id: String,
        /// Its title
        title: String,
    },

    /// Too many workflow nodes
    #[error(
        "This questionnaire is large (> {limit} workflow nodes). Consider splitting into smaller assignments."
    )]
    OversizedGraph {
        /// Workflow nodes present
        count: usize,
        /// Configured limit
        limit: usize,
    },

    /// Answerable nodes outside any section
    #[error("{count} nodes are not assigned to a section.")]
    UnsectionedNodes {
        /// How many
        count: usize,
    },
}

/// Validation outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Blocking problems
    pub errors: Vec<ValidationError>,
    /// Advisory problems
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// No errors (warnings allowed)
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether a cycle was reported
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, ValidationError::CycleDetected { .. }))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s), {} warning(s)", self.errors.len(), self.warnings.len())?;
        for error in &self.errors {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

/// Context for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    /// Workflow-node count above which a size warning is raised
    pub max_workflow_nodes: usize,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            max_workflow_nodes: 60,
        }
    }
}

impl ValidationContext {
    /// Override the workflow-node limit
    #[inline]
    #[must_use]
    pub fn with_max_workflow_nodes(mut self, max: usize) -> Self {
        self.max_workflow_nodes = max;
        self
    }
}

/// Publish-time graph validator
#[derive(Debug, Clone, Default)]
pub struct GraphValidator {
    context: ValidationContext,
}

impl GraphValidator {
    /// Create a new validator with default context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new validator with custom context
    #[must_use]
    pub fn with_context(context: ValidationContext) -> Self {
        Self { context }
    }

    /// Validate a complete graph
    #[must_use]
    pub fn validate(&self, graph: &Graph) -> ValidationReport {
        let mut report = ValidationReport::default();
        self.validate_structure(graph, &mut report);
        self.validate_nodes(graph, &mut report);
        self.validate_size(graph, &mut report);
        report
    }

    fn validate_structure(&self, graph: &Graph, report: &mut ValidationReport) {
        if !graph.has_kind(NodeKind::Start) {
            report.errors.push(ValidationError::MissingStart);
        }
        if !graph.has_kind(NodeKind::End) {
            report.errors.push(ValidationError::MissingEnd);
        }

        let known: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &graph.edges {
            if !known.contains(edge.from.as_str()) {
                report.errors.push(ValidationError::UnknownEdgeSource {
                    edge_id: edge.id.clone(),
                });
            }
            if !known.contains(edge.to.as_str()) {
                report.errors.push(ValidationError::UnknownEdgeTarget {
                    edge_id: edge.id.clone(),
                });
            }
        }

        if let Some(node_id) = find_cycle(graph) {
            report.errors.push(ValidationError::CycleDetected { node_id });
        }
    }

    fn validate_nodes(&self, graph: &Graph, report: &mut ValidationReport) {
        let mut outgoing: HashMap<&str, Vec<&EdgeCondition>> = HashMap::new();
        for edge in &graph.edges {
            outgoing.entry(edge.from.as_str()).or_default().push(&edge.condition);
        }

        for node in &graph.nodes {
            if node.kind.is_answerable() && node.labels.is_empty() {
                report.errors.push(ValidationError::MissingLabel {
                    node_id: node.id.clone(),
                    title: node.title.clone(),
                });
            }
            if node.kind == NodeKind::Question && node.input_type.is_none() {
                report.errors.push(ValidationError::MissingInputType {
                    node_id: node.id.clone(),
                    title: node.title.clone(),
                });
            }

            let conditions = outgoing.get(node.id.as_str()).map_or(&[][..], Vec::as_slice);
            if node.kind != NodeKind::Decision && conditions.len() > 1 {
                report.warnings.push(ValidationWarning::MultipleOutgoing {
                    node_id: node.id.clone(),
                    title: node.title.clone(),
                });
            }
            if node.kind == NodeKind::Decision {
                let has_yes = conditions.iter().any(|c| matches!(c, EdgeCondition::Yes));
                let has_no = conditions.iter().any(|c| matches!(c, EdgeCondition::No));
                if !(has_yes && has_no) {
                    report.warnings.push(ValidationWarning::IncompleteDecision {
                        node_id: node.id.clone(),
                        title: node.title.clone(),
                    });
                }
            }
        }
    }

    fn validate_size(&self, graph: &Graph, report: &mut ValidationReport) {
        let workflow = graph.nodes.iter().filter(|n| n.kind.is_workflow()).count();
        if workflow > self.context.max_workflow_nodes {
            report.warnings.push(ValidationWarning::OversizedGraph {
                count: workflow,
                limit: self.context.max_workflow_nodes,
            });
        }

        let unsectioned = graph
            .nodes
            .iter()
            .filter(|n| n.kind.is_answerable() && n.section_id.is_none())
            .count();
        if unsectioned > 0 {
            report
                .warnings
                .push(ValidationWarning::UnsectionedNodes { count: unsectioned });
        }
    }
}

/// Validate with the default context
#[must_use]
pub fn validate_graph(graph: &Graph) -> ValidationReport {
    GraphValidator::new().validate(graph)
}

/// Detect cycles with an iterative two-color DFS.
///
/// Each stack frame holds a node and the index of its next child, so the
/// walk never recurses and terminates on any input. Returns the node closing
/// the first cycle found.
fn find_cycle(graph: &Graph) -> Option<String> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        adjacency
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
    }

    let mut visiting: HashSet<&str> = HashSet::new();
    let mut visited: HashSet<&str> = HashSet::new();

    for root in graph.nodes.iter().map(|n| n.id.as_str()) {
        if visited.contains(root) {
            continue;
        }
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        visiting.insert(root);

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let next = adjacency
                .get(node)
                .and_then(|children| children.get(frame.1))
                .copied();
            match next {
                Some(child) => {
                    frame.1 += 1;
                    if visiting.contains(child) {
                        return Some(child.to_owned());
                    }
                    if !visited.contains(child) {
                        visiting.insert(child);
                        stack.push((child, 0));
                    }
                }
                None => {
                    visiting.remove(node);
                    visited.insert(node);
                    stack.pop();
                }
            }
        }
    }
    None
}
