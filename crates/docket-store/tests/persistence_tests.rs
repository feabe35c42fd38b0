use std::sync::Arc;

use docket_graph::ResponseValue;
use docket_store::{
    scoped_key, FileStore, KeyValueStore, MemoryStore, QuestionnaireStore, RecordingTelemetry,
    StoreConfig, TelemetryEvent, INTAKE_ASSIGNMENT_ID, INTAKE_TEMPLATE_ID, SCHEMA_VERSION,
};
use docket_test_utils::{household_catalog, test_services, test_services_with};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const DOC_KEY: &str = "gbi:questionnaires:v3";
const LEGACY_KEY: &str = "gbi:questionnaires:v1";

fn store_over(backend: MemoryStore) -> QuestionnaireStore<MemoryStore> {
    QuestionnaireStore::new(backend)
        .with_services(test_services())
        .with_catalog(Arc::new(household_catalog()))
}

fn stored(store: &QuestionnaireStore<MemoryStore>) -> Value {
    let raw = store.backend().get(DOC_KEY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn test_legacy_document_is_archived_on_migration() {
    let backend = MemoryStore::new();
    let legacy = json!({
        "schemaVersion": 1,
        "templates": [{
            "id": "old-1",
            "title": "Old checklist",
            "questions": [{"id": "why", "kind": "textarea", "label": "Why file now?"}]
        }],
        "assignments": []
    });
    backend.set(LEGACY_KEY, &legacy.to_string()).unwrap();

    let recorder = Arc::new(RecordingTelemetry::new());
    let store = store_over(backend).with_services(test_services_with(recorder.clone()));
    let state = store.load().unwrap();

    assert_eq!(state.archived_v1, Some(legacy));
    assert!(state.template("old-1").is_some());
    assert_eq!(stored(&store)["schemaVersion"], json!(SCHEMA_VERSION));
    assert_eq!(
        recorder.events(),
        vec![TelemetryEvent::StateMigrated {
            archived_legacy: true,
            templates: 4
        }]
    );
}

#[test]
fn test_outdated_and_corrupt_documents_migrate() {
    for raw in ["{broken", r#"{"schemaVersion": 2, "templates": []}"#, r#"{"schemaVersion": 3, "templates": []}"#] {
        let backend = MemoryStore::new();
        backend.set(DOC_KEY, raw).unwrap();
        let store = store_over(backend);
        let state = store.load().unwrap();
        assert_eq!(state.templates.len(), 3, "{raw}");
        assert_eq!(stored(&store)["templates"].as_array().map(Vec::len), Some(3));
    }
}

#[test]
fn test_reload_is_idempotent() {
    let store = store_over(MemoryStore::new());
    let first = store.load().unwrap();
    let after_first = stored(&store);
    let second = store.load().unwrap();
    assert_eq!(first, second);
    assert_eq!(stored(&store), after_first);
}

#[test]
fn test_stale_intake_is_reseeded() {
    let store = store_over(MemoryStore::new());
    store
        .update(|state, services| {
            state.record_answer(services, INTAKE_ASSIGNMENT_ID, "node-filing_type", ResponseValue::text("single"))
        })
        .unwrap();

    let mut doc = stored(&store);
    doc["templates"][0]["versions"][0]["graph"] = json!({"nodes": [], "edges": []});
    store.backend().set(DOC_KEY, &doc.to_string()).unwrap();

    let state = store.load().unwrap();
    assert_eq!(state.templates[0].id, INTAKE_TEMPLATE_ID);
    assert!(docket_store::is_hydrated_intake(&state.templates[0], &household_catalog()));
    assert!(state.assignment(INTAKE_ASSIGNMENT_ID).is_none());
    let intake_assignments: Vec<_> = state
        .assignments
        .iter()
        .filter(|a| a.template_id == INTAKE_TEMPLATE_ID)
        .collect();
    assert_eq!(intake_assignments.len(), 1);
    assert!(state.responses.is_empty());
}

#[test]
fn test_copy_titles_cleaned_on_load() {
    let store = store_over(MemoryStore::new());
    store
        .update(|state, services| {
            let original = state.create_template(services, "Demo Intake", None)?;
            let copy = state.duplicate_template(services, &original.id)?;
            let template = state.templates.iter_mut().find(|t| t.id == copy.id).unwrap();
            template.title = "Copy of Demo Intake".to_owned();
            Ok(())
        })
        .unwrap();

    let state = store.load().unwrap();
    let titles: Vec<&str> = state.templates.iter().map(|t| t.title.as_str()).collect();
    assert!(titles.contains(&"Demo Intake"));
    assert!(titles.contains(&"Demo Intake (2)"));
    assert!(!titles.iter().any(|t| t.starts_with("Copy of")));
    assert_eq!(stored(&store)["templates"][0]["title"], json!("Demo Intake (2)"));
}

#[test]
fn test_without_seeding_only_legacy_templates_load() {
    let backend = MemoryStore::new();
    backend
        .set(LEGACY_KEY, r#"{"templates": [{"id": "t", "title": "Only", "questions": []}]}"#)
        .unwrap();
    let store = store_over(backend).with_config(StoreConfig::new().with_seed_on_empty(false));
    let state = store.load().unwrap();
    let ids: Vec<&str> = state.templates.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["t"]);
    assert!(state.assignments.is_empty());
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new().with_scope("firm-42");
    let store = QuestionnaireStore::new(FileStore::new(dir.path()))
        .with_config(config)
        .with_services(test_services());

    let created = store
        .update(|state, services| state.create_template(services, "Ch7 Intake", None))
        .unwrap();
    assert!(store
        .backend()
        .get(&scoped_key("firm-42", "questionnaires:v3"))
        .unwrap()
        .is_some());

    let reopened = QuestionnaireStore::new(FileStore::new(dir.path()))
        .with_config(StoreConfig::new().with_scope("firm-42"))
        .with_services(test_services());
    let state = reopened.load().unwrap();
    assert_eq!(state.templates[0].id, created.id);
    assert_eq!(state.templates[0].title, "Ch7 Intake");
}

#[test]
fn test_reset_discards_local_changes() {
    let store = store_over(MemoryStore::new());
    store
        .update(|state, services| state.create_template(services, "Scratch", None))
        .unwrap();
    let fresh = store.reset().unwrap();
    assert_eq!(fresh.templates.len(), 3);
    assert_eq!(store.load().unwrap(), fresh);
}
