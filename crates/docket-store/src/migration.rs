//! Schema migration and load-time normalization.
//!
//! A v1 document is a flat list of templates whose questions are plain text,
//! textarea or file fields. It is kept verbatim under `archivedV1`; its
//! well-formed templates are rebuilt as linear graphs next to the seeds.

use std::collections::HashSet;

use docket_graph::{
    CreatedBy, Edge, FileRules, Graph, InputType, Node, NodeKind, Publisher, Template,
    TemplateKind, TemplateVersion, Timestamp,
};
use docket_runtime::LegacyCatalog;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::StoreResult;
use crate::seeds::{guided_intake_template, is_hydrated_intake, seed_state, INTAKE_TEMPLATE_ID};
use crate::services::StoreServices;
use crate::state::QuestionnaireState;

const MIGRATION_NOTES: &str = "Migrated from v1";

#[derive(Debug, Deserialize)]
struct V1Document {
    #[serde(default)]
    templates: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct V1Template {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    questions: Vec<V1Question>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum V1QuestionKind {
    Text,
    Textarea,
    File,
}

#[derive(Debug, Deserialize)]
struct V1Question {
    id: String,
    kind: V1QuestionKind,
    #[serde(alias = "prompt")]
    label: String,
    #[serde(default)]
    required: bool,
}

impl V1Question {
    fn to_node(&self, section_id: &str) -> Node {
        let (kind, input_type) = match self.kind {
            V1QuestionKind::Text => (NodeKind::Question, InputType::Text),
            V1QuestionKind::Textarea => (NodeKind::Question, InputType::Textarea),
            V1QuestionKind::File => (NodeKind::DocRequest, InputType::FileUpload),
        };
        let mut node = Node::new(kind, format!("node-{}", self.id))
            .with_title(self.label.trim())
            .with_input_type(Some(input_type))
            .with_required(self.required)
            .with_section(section_id);
        if kind == NodeKind::DocRequest {
            node.file_rules = Some(FileRules {
                min_files: self.required.then_some(1),
                ..FileRules::default()
            });
        }
        node
    }
}

/// Linear graph for a v1 template: start, one section, its questions, end
fn v1_graph(template: &V1Template) -> Graph {
    let section_id = "sec-main";
    let mut nodes = vec![
        Node::new(NodeKind::Start, "start"),
        Node::new(NodeKind::Section, section_id).with_title(template.title.trim()),
    ];
    nodes.extend(template.questions.iter().map(|q| q.to_node(section_id)));
    nodes.push(Node::new(NodeKind::End, "end"));

    let edges = nodes
        .windows(2)
        .map(|pair| Edge::always(&pair[0].id, &pair[1].id))
        .collect();
    Graph::from_parts(nodes, edges)
}

/// Templates recoverable from a v1 document. Entries that do not parse, or
/// have a blank id or title, are skipped; ids already taken get a `v1-` prefix.
fn convert_v1_templates(legacy: &Value, taken: &HashSet<String>, now: Timestamp) -> Vec<Template> {
    let Ok(document) = V1Document::deserialize(legacy) else {
        return Vec::new();
    };
    let mut taken = taken.clone();
    let mut converted = Vec::new();
    for entry in &document.templates {
        let Ok(v1) = V1Template::deserialize(entry) else {
            continue;
        };
        if v1.id.trim().is_empty() || v1.title.trim().is_empty() {
            continue;
        }
        let mut id = v1.id.trim().to_owned();
        while taken.contains(&id) {
            id = format!("v1-{id}");
        }
        taken.insert(id.clone());

        let version = TemplateVersion::published(
            1,
            v1_graph(&v1),
            Publisher::System,
            now,
            Some(MIGRATION_NOTES.to_owned()),
        );
        let template = Template::new(
            id,
            v1.title.trim(),
            TemplateKind::Custom,
            CreatedBy::Attorney,
            version,
            now,
        );
        converted.push(match v1.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => template.with_description(description),
            _ => template,
        });
    }
    converted
}

/// Rebuild the document from whatever the v1 document holds, on top of the
/// seeds when `seed` is set
#[must_use]
pub fn migrate_from_v1(
    catalog: &dyn LegacyCatalog,
    legacy: Option<Value>,
    seed: bool,
    now: Timestamp,
) -> QuestionnaireState {
    let mut state = if seed {
        seed_state(catalog, now)
    } else {
        QuestionnaireState::default()
    };
    if let Some(legacy) = legacy {
        let taken: HashSet<String> = state.templates.iter().map(|t| t.id.clone()).collect();
        let converted = convert_v1_templates(&legacy, &taken, now);
        info!("Migrated {} v1 template(s)", converted.len());
        state.templates.extend(converted);
        state.archived_v1 = Some(legacy);
    }
    state
}

/// Parse the stored v1 document; unreadable content counts as absent
#[must_use]
pub fn parse_legacy_document(raw: Option<&str>) -> Option<Value> {
    let raw = raw?;
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Ignoring unreadable v1 document: {}", err);
            None
        }
    }
}

impl QuestionnaireState {
    /// Replace an intake template that no longer mirrors the catalog.
    ///
    /// Its assignments and their responses are dropped and a fresh intake
    /// assignment is issued. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Only if the freshly installed intake template cannot be found, which
    /// does not happen in practice.
    pub fn rehydrate_intake(
        &mut self,
        services: &StoreServices,
        catalog: &dyn LegacyCatalog,
    ) -> StoreResult<bool> {
        let hydrated = self
            .template(INTAKE_TEMPLATE_ID)
            .is_some_and(|t| is_hydrated_intake(t, catalog));
        if hydrated {
            return Ok(false);
        }

        info!("Re-seeding intake template from the legacy catalog");
        self.templates.retain(|t| t.id != INTAKE_TEMPLATE_ID);
        self.templates
            .insert(0, guided_intake_template(catalog, services.now()));

        let replaced: HashSet<String> = self
            .assignments
            .iter()
            .filter(|a| a.template_id == INTAKE_TEMPLATE_ID)
            .map(|a| a.id.clone())
            .collect();
        self.assignments.retain(|a| !replaced.contains(&a.id));
        self.responses.retain(|r| !replaced.contains(&r.assignment_id));
        self.assign_template(services, INTAKE_TEMPLATE_ID, None, None)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use docket_runtime::{validate_graph, EmptyCatalog};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_v1_templates_become_linear_graphs() {
        let legacy = json!({
            "schemaVersion": 1,
            "templates": [
                {
                    "id": "tpl-1",
                    "title": "Old intake",
                    "questions": [
                        {"id": "name", "kind": "text", "label": "Name", "required": true},
                        {"id": "w2", "kind": "file", "prompt": "W-2"}
                    ]
                },
                {"id": "broken", "questions": "nope"},
                {"id": "", "title": "No id", "questions": []}
            ]
        });
        let state = migrate_from_v1(&EmptyCatalog, Some(legacy.clone()), true, now());

        assert_eq!(state.archived_v1, Some(legacy));
        let migrated = state.template("tpl-1").unwrap();
        assert_eq!(migrated.created_by, CreatedBy::Attorney);
        let graph = migrated.active_graph().unwrap();
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["start", "sec-main", "node-name", "node-w2", "end"]);
        assert_eq!(graph.node("node-w2").unwrap().kind, NodeKind::DocRequest);
        assert!(validate_graph(graph).is_valid());
        assert_eq!(state.templates.len(), 4);
    }

    #[test]
    fn test_colliding_ids_are_prefixed() {
        let legacy = json!({"templates": [
            {"id": INTAKE_TEMPLATE_ID, "title": "Clash", "questions": []}
        ]});
        let state = migrate_from_v1(&EmptyCatalog, Some(legacy), true, now());
        assert_eq!(state.template("v1-intake-default").map(|t| t.title.as_str()), Some("Clash"));
    }

    #[test]
    fn test_unreadable_legacy_document() {
        assert_eq!(parse_legacy_document(Some("{not json")), None);
        assert_eq!(parse_legacy_document(None), None);
    }
}
