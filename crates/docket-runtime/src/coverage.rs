//! Filing-label coverage of an assignment

use docket_graph::{index_assignment_responses, Assignment, FilingLabel, Node, NodeResponse, Template};
use serde::Serialize;

use crate::legacy::LegacyCatalog;
use crate::visibility::Visibility;

/// Coverage of one filing label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageState {
    /// Label
    pub label: FilingLabel,
    /// Nothing tracked under this label is missing
    pub covered: bool,
    /// Unanswered tracked nodes (1 for an untracked critical label)
    pub missing_count: usize,
    /// Unanswered tracked nodes that are required or block the workflow
    pub blocking_count: usize,
}

impl CoverageState {
    fn unknown(label: FilingLabel) -> Self {
        Self {
            label,
            covered: false,
            missing_count: 0,
            blocking_count: 0,
        }
    }

    fn untracked(label: FilingLabel) -> Self {
        let critical = label.is_filing_critical();
        Self {
            label,
            covered: !critical,
            missing_count: usize::from(critical),
            blocking_count: 0,
        }
    }
}

/// Coverage of every filing label, in declaration order.
///
/// Tracked nodes are visible, labeled question, doc request and decision
/// nodes of the pinned version. Without a template, assignment or pinned
/// version every label reports `covered = false` with zero counts.
#[must_use]
pub fn compute_coverage_state(
    template: Option<&Template>,
    assignment: Option<&Assignment>,
    responses: &[NodeResponse],
    catalog: &dyn LegacyCatalog,
) -> Vec<CoverageState> {
    let resolved = template.zip(assignment).and_then(|(template, assignment)| {
        template
            .version(assignment.template_version)
            .map(|version| (version.graph(), assignment))
    });
    let Some((graph, assignment)) = resolved else {
        return FilingLabel::ALL.into_iter().map(CoverageState::unknown).collect();
    };

    let by_node = index_assignment_responses(responses, &assignment.id);
    let visibility = Visibility::new(graph, &by_node, catalog);
    let tracked: Vec<&Node> = graph
        .nodes
        .iter()
        .filter(|node| node.kind.is_answerable() && !node.labels.is_empty())
        .filter(|node| visibility.is_visible(node))
        .collect();

    FilingLabel::ALL
        .into_iter()
        .map(|label| {
            let mut for_label = tracked.iter().filter(|node| node.labels.contains(&label)).peekable();
            if for_label.peek().is_none() {
                return CoverageState::untracked(label);
            }
            let mut state = CoverageState::unknown(label);
            for node in for_label {
                let answered = by_node
                    .get(node.id.as_str())
                    .is_some_and(|response| response.is_answered());
                if answered {
                    continue;
                }
                state.missing_count += 1;
                if node.required || node.blocks_workflow {
                    state.blocking_count += 1;
                }
            }
            state.covered = state.missing_count == 0;
            state
        })
        .collect()
}
