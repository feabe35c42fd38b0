//! Progress and stage derivation

use docket_graph::{index_assignment_responses, Assignment, AssignmentStage, Node, NodeResponse, Template};
use serde::Serialize;

use crate::visibility::Visibility;
use crate::legacy::LegacyCatalog;

/// Completion of one assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssignmentProgress {
    /// Visible client nodes
    pub total: usize,
    /// Of those, answered or skipped
    pub completed: usize,
    /// `completed / total`, rounded to a whole percent
    pub percent: u8,
    /// Derived stage
    pub stage: AssignmentStage,
}

fn is_client_progress_node(node: &Node) -> bool {
    node.client_visible && !node.kind.is_structural()
}

/// Derive progress and stage of `assignment` against its pinned template
/// version.
///
/// Without a template or pinned version the result is empty with the
/// recorded stage. The derived stage never ranks below the recorded one.
#[must_use]
pub fn derive_assignment_progress(
    assignment: &Assignment,
    template: Option<&Template>,
    responses: &[NodeResponse],
    catalog: &dyn LegacyCatalog,
) -> AssignmentProgress {
    let recorded = assignment.stage();
    let Some(version) = template.and_then(|t| t.version(assignment.template_version)) else {
        return AssignmentProgress {
            total: 0,
            completed: 0,
            percent: 0,
            stage: recorded,
        };
    };
    let graph = version.graph();
    let by_node = index_assignment_responses(responses, &assignment.id);
    let visibility = Visibility::new(graph, &by_node, catalog);

    let mut total = 0_usize;
    let mut completed = 0_usize;
    for node in graph.nodes.iter().filter(|n| is_client_progress_node(n)) {
        if !visibility.is_visible(node) {
            continue;
        }
        total += 1;
        if by_node.get(node.id.as_str()).is_some_and(|r| r.is_answered()) {
            completed += 1;
        }
    }

    let (percent, derived) = if total == 0 {
        (100, AssignmentStage::Submitted)
    } else {
        let stage = if completed == 0 {
            AssignmentStage::Assigned
        } else if completed < total {
            AssignmentStage::InProgress
        } else {
            AssignmentStage::Submitted
        };
        (rounded_percent(completed, total), stage)
    };

    AssignmentProgress {
        total,
        completed,
        percent,
        stage: derived.max(recorded),
    }
}

/// Half-up rounding of `part / whole * 100`
fn rounded_percent(part: usize, whole: usize) -> u8 {
    let percent = (part * 100 + whole / 2) / whole;
    u8::try_from(percent.min(100)).unwrap_or(100)
}
