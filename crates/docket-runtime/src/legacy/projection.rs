//! Projection of graph responses onto the legacy answer shapes

use std::collections::BTreeMap;

use docket_graph::{Graph, NodeResponse, ResponseValue, ResponsesByNode};
use serde::{Deserialize, Serialize};

/// Legacy field value: text, checkbox list, or grid record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text or single choice
    Text(String),
    /// Checkbox selections or file names
    List(Vec<String>),
    /// Grid answers keyed by row id
    Record(BTreeMap<String, String>),
}

impl FieldValue {
    /// Text value
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The text, when this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether a list value contains `item`
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        match self {
            Self::List(items) => items.iter().any(|i| i == item),
            _ => false,
        }
    }
}

/// Flat legacy answer map keyed by field id
pub type Answers = BTreeMap<String, FieldValue>;

/// Uploaded file names keyed by field id
pub type Uploads = BTreeMap<String, Vec<String>>;

/// "Can't answer right now" marker on a legacy field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagEntry {
    /// Always `true` for projected skips
    pub flagged: bool,
    /// Skip reason
    pub note: String,
    /// Moved to the audit trail
    pub resolved: bool,
}

/// Flags keyed by field id
pub type Flags = BTreeMap<String, FlagEntry>;

/// Legacy intake state rebuilt from an assignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeState {
    /// Answers
    pub answers: Answers,
    /// Uploaded file names
    pub uploads: Uploads,
    /// Skipped fields
    pub flags: Flags,
}

fn map_value(value: &ResponseValue) -> FieldValue {
    match value {
        ResponseValue::Text(text) => FieldValue::Text(text.clone()),
        ResponseValue::List(items) => FieldValue::List(items.clone()),
        ResponseValue::Bool(true) => FieldValue::text("Yes"),
        ResponseValue::Bool(false) => FieldValue::text("No"),
        ResponseValue::Number(n) => FieldValue::Text(n.to_string()),
        ResponseValue::Files(payload) => {
            FieldValue::List(payload.files.iter().map(|f| f.name.clone()).collect())
        }
        ResponseValue::Record(entries) => FieldValue::Record(
            entries
                .iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
    }
}

/// Project responses onto the legacy answer map.
///
/// Only nodes with a `legacy_field_id` contribute. A skipped node projects
/// to empty text so that legacy predicates see it as answered-but-blank.
#[must_use]
pub fn build_legacy_answers_from_responses(graph: &Graph, responses: &ResponsesByNode<'_>) -> Answers {
    let mut answers = Answers::new();
    for node in &graph.nodes {
        let Some(field_id) = node.legacy_field_id.as_deref() else {
            continue;
        };
        let Some(response) = responses.get(node.id.as_str()) else {
            continue;
        };
        let projected = if response.skipped.is_some() {
            Some(FieldValue::Text(String::new()))
        } else {
            response.value.as_ref().map(map_value)
        };
        if let Some(value) = projected {
            answers.insert(field_id.to_owned(), value);
        }
    }
    answers
}

/// Rebuild the legacy intake state of an assignment.
///
/// `responses` should belong to a single assignment; later entries for the
/// same node win. File payloads go to `uploads` (only when at least one name
/// is present) and skips go to `flags`.
#[must_use]
pub fn build_intake_state_from_assignment(graph: &Graph, responses: &[NodeResponse]) -> IntakeState {
    let by_node = docket_graph::index_responses(responses);
    let mut state = IntakeState::default();
    for node in &graph.nodes {
        let Some(field_id) = node.legacy_field_id.as_deref() else {
            continue;
        };
        let Some(response) = by_node.get(node.id.as_str()) else {
            continue;
        };
        if let Some(skip) = &response.skipped {
            state.flags.insert(
                field_id.to_owned(),
                FlagEntry {
                    flagged: true,
                    note: skip.reason.clone(),
                    resolved: false,
                },
            );
            continue;
        }
        match &response.value {
            None => {}
            Some(ResponseValue::Files(payload)) => {
                let names: Vec<String> = payload
                    .files
                    .iter()
                    .filter(|f| !f.name.is_empty())
                    .map(|f| f.name.clone())
                    .collect();
                if !names.is_empty() {
                    state.uploads.insert(field_id.to_owned(), names);
                }
            }
            Some(value) => {
                state.answers.insert(field_id.to_owned(), map_value(value));
            }
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use docket_graph::{index_responses, Node, NodeKind, ResponseFile, SkipActor, SkipRecord};
    use pretty_assertions::assert_eq;

    fn graph() -> Graph {
        Graph::from_parts(
            vec![
                Node::new(NodeKind::Question, "n-married").with_legacy_field("household", "married"),
                Node::new(NodeKind::Question, "n-income").with_legacy_field("income", "monthly_income"),
                Node::new(NodeKind::DocRequest, "n-docs").with_legacy_field("docs", "paystubs"),
                Node::new(NodeKind::Question, "n-grid").with_legacy_field("debts", "debt_grid"),
                Node::new(NodeKind::Question, "n-unmapped"),
            ],
            Vec::new(),
        )
    }

    fn responses() -> Vec<NodeResponse> {
        let at = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
        let grid: BTreeMap<String, String> = [("card".to_owned(), "yes".to_owned()), ("loan".to_owned(), "  ".to_owned())]
            .into_iter()
            .collect();
        vec![
            NodeResponse::answered("a1", "n-married", ResponseValue::Bool(true), at),
            NodeResponse::answered("a1", "n-income", ResponseValue::Number(2500.5), at),
            NodeResponse::answered(
                "a1",
                "n-docs",
                ResponseValue::files(vec![ResponseFile::new("f1", "stub.pdf", at)]),
                at,
            ),
            NodeResponse::answered("a1", "n-grid", ResponseValue::Record(grid), at),
            NodeResponse::answered("a1", "n-unmapped", ResponseValue::text("ignored"), at),
        ]
    }

    #[test]
    fn test_answers_projection() {
        let responses = responses();
        let answers = build_legacy_answers_from_responses(&graph(), &index_responses(&responses));
        assert_eq!(answers["married"], FieldValue::text("Yes"));
        assert_eq!(answers["monthly_income"], FieldValue::text("2500.5"));
        assert_eq!(answers["paystubs"], FieldValue::List(vec!["stub.pdf".into()]));
        let FieldValue::Record(grid) = &answers["debt_grid"] else {
            panic!("expected record");
        };
        assert_eq!(grid.len(), 1);
        assert_eq!(answers.len(), 4);
    }

    #[test]
    fn test_skip_projects_to_empty_text() {
        let at = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
        let skipped = vec![NodeResponse::skipped(
            "a1",
            "n-married",
            SkipRecord {
                reason: "ask spouse".into(),
                by: SkipActor::Client,
                at,
            },
            at,
        )];
        let answers = build_legacy_answers_from_responses(&graph(), &index_responses(&skipped));
        assert_eq!(answers["married"], FieldValue::text(""));

        let state = build_intake_state_from_assignment(&graph(), &skipped);
        assert!(state.answers.is_empty());
        assert_eq!(
            state.flags["married"],
            FlagEntry {
                flagged: true,
                note: "ask spouse".into(),
                resolved: false
            }
        );
    }

    #[test]
    fn test_intake_state_splits_uploads() {
        let state = build_intake_state_from_assignment(&graph(), &responses());
        assert_eq!(state.uploads["paystubs"], vec!["stub.pdf".to_owned()]);
        assert!(!state.answers.contains_key("paystubs"));
        assert_eq!(state.answers["married"], FieldValue::text("Yes"));
        assert!(state.flags.is_empty());
    }

    #[test]
    fn test_empty_file_list_is_not_an_upload() {
        let at = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
        let empty = vec![NodeResponse::answered("a1", "n-docs", ResponseValue::files(Vec::new()), at)];
        let state = build_intake_state_from_assignment(&graph(), &empty);
        assert!(state.uploads.is_empty());
        assert!(state.answers.is_empty());
    }
}
