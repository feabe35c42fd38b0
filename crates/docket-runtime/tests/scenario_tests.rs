use docket_graph::{index_responses, FilingLabel, NodeResponse, ResponseValue};
use docket_runtime::{
    build_intake_state_from_assignment, compute_coverage_state, derive_assignment_progress,
    evaluate_node_visibility, missing_required, next_node_ids, validate_graph, visible_sections,
    EmptyCatalog, ValidationWarning, Visibility,
};
use docket_graph::AssignmentStage;
use docket_test_utils::{
    branching_graph, cyclic_graph, household_catalog, household_graph, incomplete_decision_graph,
    make_assignment, make_template, skip, text, yes_no,
};
use pretty_assertions::assert_eq;

fn visible_ids(graph: &docket_graph::Graph, responses: &[NodeResponse]) -> Vec<String> {
    let by_node = index_responses(responses);
    let catalog = household_catalog();
    Visibility::new(graph, &by_node, &catalog)
        .visible_nodes()
        .map(|node| node.id.clone())
        .collect()
}

#[test]
fn test_yes_branch_reveals_follow_up() {
    let graph = branching_graph();
    let responses = [yes_no("q1", true)];
    let by_node = index_responses(&responses);

    let visible = |id: &str| {
        evaluate_node_visibility(graph.node(id).unwrap(), &graph, &by_node, &EmptyCatalog, None)
    };
    assert!(visible("q2"));
    assert!(!visible("end"));
    assert_eq!(next_node_ids("q1", &graph.edges, &by_node), vec!["q2"]);
}

#[test]
fn test_textual_no_takes_no_branch() {
    let graph = branching_graph();
    let responses = [text("q1", "no")];
    let by_node = index_responses(&responses);

    assert_eq!(next_node_ids("q1", &graph.edges, &by_node), vec!["end"]);
    let q2 = graph.node("q2").unwrap();
    assert!(!evaluate_node_visibility(q2, &graph, &by_node, &EmptyCatalog, None));
}

#[test]
fn test_unanswered_source_fires_only_always_edges() {
    let graph = branching_graph();
    let by_node = index_responses(std::iter::empty());
    assert!(next_node_ids("q1", &graph.edges, &by_node).is_empty());
    assert_eq!(next_node_ids("start", &graph.edges, &by_node), vec!["q1"]);
}

#[test]
fn test_incomplete_decision_is_only_a_warning() {
    let graph = incomplete_decision_graph();
    let report = validate_graph(&graph);
    assert!(report.is_valid(), "{report}");
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::IncompleteDecision { node_id, .. } if node_id == "d")));

    let by_node = index_responses(std::iter::empty());
    let decision = graph.node("d").unwrap();
    assert!(evaluate_node_visibility(decision, &graph, &by_node, &EmptyCatalog, None));
}

#[test]
fn test_untracked_critical_label_is_uncovered() {
    let template = make_template(branching_graph());
    let assignment = make_assignment();
    let coverage = compute_coverage_state(Some(&template), Some(&assignment), &[], &EmptyCatalog);

    let income = coverage.iter().find(|c| c.label == FilingLabel::Income).unwrap();
    assert!(!income.covered);
    assert_eq!(income.missing_count, 1);
    assert_eq!(income.blocking_count, 0);

    let other = coverage.iter().find(|c| c.label == FilingLabel::Other).unwrap();
    assert!(other.covered);
    assert_eq!(other.missing_count, 0);
}

#[test]
fn test_answered_labels_are_covered() {
    let template = make_template(branching_graph());
    let assignment = make_assignment();
    let responses = [yes_no("q1", false)];
    let coverage =
        compute_coverage_state(Some(&template), Some(&assignment), &responses, &EmptyCatalog);
    let assets = coverage.iter().find(|c| c.label == FilingLabel::Assets).unwrap();
    assert!(assets.covered);
}

#[test]
fn test_cycle_reported() {
    let report = validate_graph(&cyclic_graph());
    assert!(!report.is_valid());
    assert!(report.has_cycle());
}

#[test]
fn test_legacy_step_gate() {
    let graph = household_graph();
    assert_eq!(visible_ids(&graph, &[]), ["sec-filing", "node-filing_type"]);

    let joint = [text("node-filing_type", "joint")];
    assert_eq!(
        visible_ids(&graph, &joint),
        ["sec-filing", "node-filing_type", "sec-spouse", "node-spouse_name", "node-spouse_works"]
    );

    let working = [text("node-filing_type", "joint"), yes_no("node-spouse_works", true)];
    assert!(visible_ids(&graph, &working).contains(&"node-spouse_income".to_owned()));
}

#[test]
fn test_progress_tracks_visible_nodes() {
    let template = make_template(household_graph());
    let assignment = make_assignment();
    let progress = |responses: &[NodeResponse]| {
        derive_assignment_progress(&assignment, Some(&template), responses, &household_catalog())
    };

    let empty = progress(&[]);
    assert_eq!((empty.total, empty.completed, empty.percent), (1, 0, 0));
    assert_eq!(empty.stage, AssignmentStage::Assigned);

    let joint = progress(&[text("node-filing_type", "joint")]);
    assert_eq!((joint.total, joint.completed, joint.percent), (3, 1, 33));
    assert_eq!(joint.stage, AssignmentStage::InProgress);

    let single = progress(&[text("node-filing_type", "single")]);
    assert_eq!((single.total, single.completed, single.percent), (1, 1, 100));
    assert_eq!(single.stage, AssignmentStage::Submitted);
}

#[test]
fn test_recorded_stage_is_a_floor() {
    let template = make_template(branching_graph());
    let mut assignment = make_assignment();
    assignment.computed_stage = Some(AssignmentStage::Approved);
    let progress = derive_assignment_progress(&assignment, Some(&template), &[], &EmptyCatalog);
    assert_eq!(progress.stage, AssignmentStage::Approved);
}

#[test]
fn test_sections_and_missing_required() {
    let graph = household_graph();
    let responses = [text("node-filing_type", "joint"), skip("node-spouse_name", "unknown")];
    let by_node = index_responses(&responses);
    let sections = visible_sections(&graph, &by_node, &household_catalog());

    let titles: Vec<&str> = sections
        .iter()
        .filter_map(|bucket| bucket.section.map(|s| s.title.as_str()))
        .collect();
    assert_eq!(titles, ["Filing", "Spouse"]);

    let missing: Vec<&str> = missing_required(&sections, &by_node)
        .into_iter()
        .map(|node| node.id.as_str())
        .collect();
    assert!(missing.is_empty(), "{missing:?}");
}

#[test]
fn test_intake_state_projection() {
    let graph = household_graph();
    let responses = [
        text("node-filing_type", "joint"),
        yes_no("node-spouse_works", true),
        skip("node-spouse_name", "will send later"),
    ];
    let state = build_intake_state_from_assignment(&graph, &responses);

    assert_eq!(state.answers.get("filing_type").and_then(|v| v.as_text()), Some("joint"));
    assert_eq!(state.answers.get("spouse_works").and_then(|v| v.as_text()), Some("Yes"));
    assert!(!state.answers.contains_key("spouse_name"));
    let flag = state.flags.get("spouse_name").unwrap();
    assert!(flag.flagged);
    assert_eq!(flag.note, "will send later");
    assert!(!flag.resolved);
}

#[test]
fn test_file_values_project_to_uploads() {
    use docket_graph::{Node, NodeKind, ResponseFile};

    let graph = docket_graph::Graph::from_parts(
        vec![Node::new(NodeKind::DocRequest, "doc").with_legacy_field("documents", "paystubs")],
        Vec::new(),
    );
    let file = ResponseFile::new("f1", "march.pdf", docket_test_utils::ts());
    let responses = [docket_test_utils::answer("doc", ResponseValue::files(vec![file]))];
    let state = build_intake_state_from_assignment(&graph, &responses);
    assert_eq!(state.uploads.get("paystubs"), Some(&vec!["march.pdf".to_owned()]));
}
