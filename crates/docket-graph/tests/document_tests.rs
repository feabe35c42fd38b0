use chrono::{TimeZone, Utc};
use docket_graph::{
    CreatedBy, EdgeCondition, FilingLabel, Graph, GraphEdit, InputType, NodeKind, NodeResponse,
    Publisher, ResponseValue, Template, TemplateKind, TemplateVersion, Timestamp,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn at(hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2026, 5, 4, hour, 0, 0).unwrap()
}

fn stored_graph() -> serde_json::Value {
    json!({
        "nodes": [
            {"id": "s", "kind": "start", "title": "Start", "clientVisible": false},
            {
                "id": "q1",
                "kind": "question",
                "title": "Own real estate?",
                "clientVisible": true,
                "labels": ["assets", "schedule_a_b"],
                "inputType": "yes_no",
                "required": true,
                "blocksWorkflow": true,
                "ui": {"x": 240.0, "y": 80.0}
            },
            {"id": "e", "kind": "end", "title": "End"}
        ],
        "edges": [
            {"id": "e1", "from": "s", "to": "q1", "when": {"type": "always"}},
            {"id": "e2", "from": "q1", "to": "e", "when": {"type": "choice_equals", "optionId": "opt-1"}},
            {"id": "e3", "from": "q1", "to": "e"}
        ]
    })
}

#[test]
fn test_reads_stored_graph() {
    let graph: Graph = serde_json::from_value(stored_graph()).unwrap();
    let q1 = graph.node("q1").unwrap();
    assert_eq!(q1.kind, NodeKind::Question);
    assert_eq!(q1.input_type, Some(InputType::YesNo));
    assert_eq!(q1.labels, vec![FilingLabel::Assets, FilingLabel::ScheduleAB]);
    assert!(q1.blocks_workflow);

    let conditions: Vec<&EdgeCondition> = graph.edges.iter().map(|e| &e.condition).collect();
    assert_eq!(
        conditions,
        [
            &EdgeCondition::Always,
            &EdgeCondition::choice_equals("opt-1"),
            &EdgeCondition::Always
        ]
    );
    assert_eq!(graph.outgoing("q1").count(), 2);
}

#[test]
fn test_unreadable_response_value_loads_as_absent() {
    let response: NodeResponse = serde_json::from_value(json!({
        "assignmentId": "a1",
        "nodeId": "q1",
        "value": {"files": "not-a-list", "extra": 1},
        "updatedAt": "2026-05-04T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(response.value, None);
    assert!(!response.is_answered());

    let grid: NodeResponse = serde_json::from_value(json!({
        "assignmentId": "a1",
        "nodeId": "grid",
        "value": {"row-1": "col-2"},
        "updatedAt": "2026-05-04T10:00:00Z"
    }))
    .unwrap();
    assert!(matches!(grid.value, Some(ResponseValue::Record(_))));
}

#[test]
fn test_file_uploads_survive_loose_upload_times() {
    let missing: NodeResponse = serde_json::from_value(json!({
        "assignmentId": "a1",
        "nodeId": "docs",
        "value": {"files": [{"id": "f1", "name": "paystub.pdf"}]},
        "updatedAt": "2026-03-01T12:00:00Z"
    }))
    .unwrap();
    let files = missing.value.as_ref().unwrap().file_list();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "paystub.pdf");
    assert_eq!(files[0].uploaded_at, None);
    assert!(missing.is_answered());

    let resaved = serde_json::to_value(&missing).unwrap();
    assert_eq!(resaved["value"], json!({"files": [{"id": "f1", "name": "paystub.pdf"}]}));

    let dated: NodeResponse = serde_json::from_value(json!({
        "assignmentId": "a1",
        "nodeId": "docs",
        "value": {"files": [
            {"id": "f1", "name": "paystub.pdf", "uploadedAt": "2026-03-01"},
            {"id": "f2", "name": "w2.pdf", "uploadedAt": "yesterday"}
        ]},
        "updatedAt": "2026-03-01T12:00:00Z"
    }))
    .unwrap();
    let files = dated.value.as_ref().unwrap().file_list();
    assert_eq!(files[0].uploaded_at, Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()));
    assert_eq!(files[1].uploaded_at, None);
    assert_eq!(files[1].id, "f2");
}

#[test]
fn test_published_versions_are_never_edited() {
    let graph: Graph = serde_json::from_value(stored_graph()).unwrap();
    let mut template = Template::new(
        "tpl-1",
        "Real estate",
        TemplateKind::Custom,
        CreatedBy::Attorney,
        TemplateVersion::draft(1, graph.clone()),
        at(9),
    );

    assert_eq!(template.apply_graph_edit(graph.clone(), at(10)), GraphEdit::InPlace { version: 1 });
    assert_eq!(template.publish_active(Publisher::Attorney, None, at(11)), Some(2));
    let published = template.version(2).unwrap().clone();
    assert_eq!(published.published_at(), Some(at(11)));

    let edit = template.apply_graph_edit(Graph::new(), at(12));
    assert_eq!(edit, GraphEdit::Bumped { from: 2, to: 3 });
    assert_eq!(template.version(2), Some(&published));
    assert_eq!(template.active_version(), 3);
    assert_eq!(template.versions().len(), 3);
    assert_eq!(template.updated_at, at(12));
}

#[test]
fn test_template_round_trips_through_document_shape() {
    let template = Template::new(
        "tpl-1",
        "Real estate",
        TemplateKind::Intake,
        CreatedBy::System,
        TemplateVersion::published(1, Graph::new(), Publisher::System, at(9), Some("seed".to_owned())),
        at(9),
    )
    .as_default();
    let json = serde_json::to_value(&template).unwrap();
    assert_eq!(json["activeVersion"], json!(1));
    assert_eq!(json["isDefault"], json!(true));
    assert_eq!(json["versions"][0]["publishedBy"], json!("system"));
    assert!(json.get("archived").is_none());

    let back: Template = serde_json::from_value(json).unwrap();
    assert_eq!(back, template);
}
