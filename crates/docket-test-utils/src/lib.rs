//! Testing utilities for the Docket workspace
//!
//! Shared fixtures: deterministic services, scenario graphs, response
//! builders and a small legacy catalog.

#![allow(missing_docs)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use docket_graph::{
    Assignment, CreatedBy, Edge, EdgeCondition, FilingLabel, FixedClock, Graph, InputType, Node,
    NodeKind, NodeResponse, ResponseValue, SequentialIds, SkipActor, SkipRecord, Template,
    TemplateKind, TemplateVersion, Timestamp,
};
use docket_runtime::{FieldValue, LegacyField, LegacyFieldKind, LegacyStep, StaticCatalog};
use docket_store::{NoopTelemetry, StoreServices, TelemetrySink};

pub const ASSIGNMENT_ID: &str = "assign-test";
pub const TEMPLATE_ID: &str = "tpl-test";

pub fn ts() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
}

pub fn test_services() -> StoreServices {
    test_services_with(Arc::new(NoopTelemetry))
}

pub fn test_services_with(telemetry: Arc<dyn TelemetrySink>) -> StoreServices {
    StoreServices::new(
        Arc::new(FixedClock::new(ts())),
        Arc::new(SequentialIds::new()),
        telemetry,
    )
}

pub fn answer(node_id: &str, value: ResponseValue) -> NodeResponse {
    NodeResponse::answered(ASSIGNMENT_ID, node_id, value, ts())
}

pub fn text(node_id: &str, value: &str) -> NodeResponse {
    answer(node_id, ResponseValue::text(value))
}

pub fn yes_no(node_id: &str, value: bool) -> NodeResponse {
    answer(node_id, ResponseValue::Bool(value))
}

pub fn skip(node_id: &str, reason: &str) -> NodeResponse {
    NodeResponse::skipped(
        ASSIGNMENT_ID,
        node_id,
        SkipRecord {
            reason: reason.to_owned(),
            by: SkipActor::Client,
            at: ts(),
        },
        ts(),
    )
}

pub fn question(id: &str, input: InputType, labels: &[FilingLabel]) -> Node {
    Node::new(NodeKind::Question, id)
        .with_title(format!("Question {id}"))
        .with_input_type(Some(input))
        .with_labels(labels.iter().copied())
}

/// Start -> Q1 (yes/no); Q1 -yes-> Q2 -> End; Q1 -no-> End
pub fn branching_graph() -> Graph {
    Graph::from_parts(
        vec![
            Node::new(NodeKind::Start, "start"),
            question("q1", InputType::YesNo, &[FilingLabel::Assets]),
            question("q2", InputType::Textarea, &[FilingLabel::Assets]),
            Node::new(NodeKind::End, "end"),
        ],
        vec![
            Edge::new("e-start", "start", "q1", EdgeCondition::Always),
            Edge::new("e-yes", "q1", "q2", EdgeCondition::Yes),
            Edge::new("e-no", "q1", "end", EdgeCondition::No),
            Edge::new("e-done", "q2", "end", EdgeCondition::Always),
        ],
    )
}

/// Start -> D (decision with only a `no` branch) -> End
pub fn incomplete_decision_graph() -> Graph {
    Graph::from_parts(
        vec![
            Node::new(NodeKind::Start, "start"),
            Node::new(NodeKind::Decision, "d")
                .with_title("Own a home?")
                .with_labels([FilingLabel::Assets]),
            Node::new(NodeKind::End, "end"),
        ],
        vec![
            Edge::new("e1", "start", "d", EdgeCondition::Always),
            Edge::new("e2", "d", "end", EdgeCondition::No),
        ],
    )
}

/// Start -> A -> B -> A, plus End reachable from Start
pub fn cyclic_graph() -> Graph {
    Graph::from_parts(
        vec![
            Node::new(NodeKind::Start, "start"),
            question("a", InputType::Text, &[FilingLabel::Other]),
            question("b", InputType::Text, &[FilingLabel::Other]),
            Node::new(NodeKind::End, "end"),
        ],
        vec![
            Edge::always("start", "a"),
            Edge::always("a", "b"),
            Edge::always("b", "a"),
            Edge::always("start", "end"),
        ],
    )
}

/// Linear chain Start -> q0 .. q{n-1} -> End; every third edge is `yes`
pub fn chain_graph(len: usize) -> Graph {
    let mut nodes = vec![Node::new(NodeKind::Start, "start")];
    nodes.extend((0..len).map(|i| question(&format!("q{i}"), InputType::YesNo, &[FilingLabel::Income])));
    nodes.push(Node::new(NodeKind::End, "end"));
    let edges = nodes
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let condition = if i % 3 == 2 { EdgeCondition::Yes } else { EdgeCondition::Always };
            Edge::new(format!("e{i}"), pair[0].id.clone(), pair[1].id.clone(), condition)
        })
        .collect();
    Graph::from_parts(nodes, edges)
}

/// Published template with `graph` as v1
pub fn make_template(graph: Graph) -> Template {
    let version = TemplateVersion::published(1, graph, docket_graph::Publisher::Attorney, ts(), None);
    Template::new(TEMPLATE_ID, "Test template", TemplateKind::Custom, CreatedBy::Attorney, version, ts())
}

pub fn make_assignment() -> Assignment {
    Assignment::new(ASSIGNMENT_ID, TEMPLATE_ID, 1, "Test assignment", ts())
}

/// Two steps; `spouse` is shown only when `filing_type` is "joint", and
/// `spouse_income` only when `spouse_works` is "Yes"
pub fn household_catalog() -> StaticCatalog {
    StaticCatalog::new(vec![
        LegacyStep::new("filing", "Filing").with_field(
            LegacyField::new("filing_type", LegacyFieldKind::Radio, "Filing type").required(),
        ),
        LegacyStep::new("spouse", "Spouse")
            .with_show_if(|answers| {
                answers.get("filing_type").and_then(FieldValue::as_text) == Some("joint")
            })
            .with_field(LegacyField::new("spouse_name", LegacyFieldKind::Text, "Spouse name"))
            .with_field(LegacyField::new("spouse_works", LegacyFieldKind::Radio, "Spouse works?"))
            .with_field(
                LegacyField::new("spouse_income", LegacyFieldKind::Text, "Spouse income").with_show_if(
                    |answers| answers.get("spouse_works").and_then(FieldValue::as_text) == Some("Yes"),
                ),
            ),
    ])
}

/// Graph mirroring [`household_catalog`], as the intake seed would build it
pub fn household_graph() -> Graph {
    docket_store::build_guided_intake_graph(&household_catalog())
}
