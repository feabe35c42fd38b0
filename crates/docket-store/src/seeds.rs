//! Shipped templates and assignments.
//!
//! The guided intake template mirrors the legacy catalog one node per field,
//! so legacy answers and graph responses stay interchangeable.

use chrono::Duration;
use docket_graph::{
    Assignment, ChoiceOption, CreatedBy, Edge, EdgeCondition, FileRules, FilingLabel, Graph,
    InputType, Node, NodeKind, Publisher, Template, TemplateKind, TemplateVersion, Timestamp,
};
use docket_runtime::{LegacyCatalog, LegacyField, LegacyFieldKind};

use crate::state::QuestionnaireState;

/// Id of the default intake template
pub const INTAKE_TEMPLATE_ID: &str = "intake-default";
/// Id of the seeded follow-up template
pub const FOLLOWUP_TEMPLATE_ID: &str = "template-ch7-followup";
/// Id of the seeded document clarification template
pub const CLARIFICATION_TEMPLATE_ID: &str = "template-doc-clarification";
/// Id of the seeded intake assignment
pub const INTAKE_ASSIGNMENT_ID: &str = "assign-intake-1";
/// Id of the seeded follow-up assignment
pub const FOLLOWUP_ASSIGNMENT_ID: &str = "assign-followup-1";

const INTAKE_TITLE: &str = "Guided Bankruptcy Intake";
const SEED_NOTES: &str = "Initial intake graph seed";
const UPLOAD_MIME: [&str; 4] = ["application/pdf", "image/jpeg", "image/png", "image/heic"];
const MAX_UPLOAD_MB: f64 = 25.0;

/// Node-id-safe form of a legacy id
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect()
}

/// Filing labels a legacy step feeds
fn step_labels(step_id: &str) -> Vec<FilingLabel> {
    use FilingLabel::{
        Assets, DebtsSecured, DebtsUnsecured, Documents, Exemptions, Expenses, IdentityHousehold,
        Income, LegalActions, Other, ScheduleAB, ScheduleD, ScheduleEF, ScheduleIJ, Sofa,
    };
    match step_id {
        "filing" | "identity" | "contact" | "spouse" => vec![IdentityHousehold],
        "urgency" => vec![LegalActions, Sofa],
        "real_estate" => vec![Assets, ScheduleAB, ScheduleD],
        "bank_accounts" | "security_deposits" | "financial_assets" => vec![Assets, ScheduleAB],
        "household_property" | "valuables" => vec![Assets, ScheduleAB, Exemptions],
        "vehicles" => vec![Assets, ScheduleAB, ScheduleD, Exemptions],
        "other_secured" => vec![DebtsSecured, ScheduleD],
        "priority_debts" | "unsecured" => vec![DebtsUnsecured, ScheduleEF],
        "leases" => vec![Sofa],
        "income" => vec![Income, ScheduleIJ],
        "expenses" => vec![Expenses, ScheduleIJ],
        "income_history" => vec![Income, Sofa],
        "documents" => vec![Documents],
        "recent_activity" => vec![Sofa, LegalActions],
        _ => vec![Other],
    }
}

fn input_type_for(kind: LegacyFieldKind) -> InputType {
    match kind {
        LegacyFieldKind::Text => InputType::Text,
        LegacyFieldKind::Textarea => InputType::Textarea,
        LegacyFieldKind::Email => InputType::Email,
        LegacyFieldKind::Date => InputType::Date,
        LegacyFieldKind::Radio | LegacyFieldKind::Select => InputType::SingleSelect,
        LegacyFieldKind::Checkbox => InputType::MultiSelect,
        LegacyFieldKind::Grid => InputType::Grid,
        LegacyFieldKind::File => InputType::FileUpload,
    }
}

#[allow(clippy::cast_precision_loss)]
fn field_node(field: &LegacyField, step_id: &str, section: &Node, si: usize, fi: usize) -> Node {
    let is_file = field.kind == LegacyFieldKind::File;
    let kind = if is_file { NodeKind::DocRequest } else { NodeKind::Question };
    let mut labels = step_labels(step_id);
    if is_file && !labels.contains(&FilingLabel::Documents) {
        labels.push(FilingLabel::Documents);
    }

    let mut node = Node::new(kind, format!("node-{}", sanitize(&field.id)))
        .with_title(field.label.replace('*', "").trim())
        .with_labels(labels)
        .with_input_type(Some(input_type_for(field.kind)))
        .with_required(field.required)
        .with_blocks_workflow(field.required)
        .with_section(section.id.clone())
        .with_legacy_field(step_id, field.id.clone())
        .with_options(
            field
                .options
                .iter()
                .map(|option| ChoiceOption::new(option.value.clone(), option.label.clone())),
        )
        .with_ui(
            220.0 + (si * 460) as f64 + (fi / 8 * 250) as f64,
            210.0 + (fi % 8 * 130) as f64,
        );
    node.help_text.clone_from(&field.helper);
    node.why_we_ask.clone_from(&field.why_we_ask);
    node.placeholder.clone_from(&field.placeholder);
    node.rows.clone_from(&field.rows);
    node.columns.clone_from(&field.columns);
    if is_file {
        node.file_rules = Some(FileRules {
            min_files: field.required.then_some(1),
            allowed_mime: UPLOAD_MIME.iter().map(|m| (*m).to_owned()).collect(),
            max_size_mb: Some(MAX_UPLOAD_MB),
        });
    }
    node
}

/// Graph of the guided intake: start, then one section per catalog step
/// followed by its fields, then end, chained by `always` edges
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_guided_intake_graph(catalog: &dyn LegacyCatalog) -> Graph {
    let mut nodes = vec![Node::new(NodeKind::Start, "start")
        .with_client_visible(false)
        .with_ui(40.0, 110.0)];

    for (si, step) in catalog.steps().iter().enumerate() {
        let mut section = Node::new(NodeKind::Section, format!("sec-{}", sanitize(&step.id)))
            .with_title(step.title.clone())
            .with_labels(step_labels(&step.id))
            .with_legacy_step(step.id.clone())
            .with_ui(220.0 + (si * 460) as f64, 80.0);
        section.help_text.clone_from(&step.description);

        let fields: Vec<Node> = step
            .fields
            .iter()
            .enumerate()
            .map(|(fi, field)| field_node(field, &step.id, &section, si, fi))
            .collect();
        nodes.push(section);
        nodes.extend(fields);
    }

    let end_x = nodes.iter().filter_map(|n| n.ui).map(|ui| ui.x).fold(40.0, f64::max) + 300.0;
    nodes.push(Node::new(NodeKind::End, "end").with_ui(end_x, 110.0));

    let edges = nodes
        .windows(2)
        .map(|pair| Edge::always(&pair[0].id, &pair[1].id))
        .collect();
    Graph::from_parts(nodes, edges)
}

/// The default intake template, published as v1
#[must_use]
pub fn guided_intake_template(catalog: &dyn LegacyCatalog, now: Timestamp) -> Template {
    let version = TemplateVersion::published(
        1,
        build_guided_intake_graph(catalog),
        Publisher::System,
        now,
        Some(SEED_NOTES.to_owned()),
    );
    Template::new(
        INTAKE_TEMPLATE_ID,
        INTAKE_TITLE,
        TemplateKind::Intake,
        CreatedBy::System,
        version,
        now,
    )
    .with_description("System intake assignment with filing-critical questions and branching.")
    .as_default()
}

fn system_template(id: &str, title: &str, description: &str, graph: Graph, now: Timestamp) -> Template {
    let version = TemplateVersion::published(1, graph, Publisher::System, now, None);
    Template::new(id, title, TemplateKind::Custom, CreatedBy::System, version, now)
        .with_description(description)
}

fn followup_graph() -> Graph {
    use docket_graph::FilingLabel::{Assets, Exemptions, ScheduleAB};
    Graph::from_parts(
        vec![
            Node::new(NodeKind::Start, "s").with_ui(40.0, 80.0),
            Node::new(NodeKind::Question, "q1")
                .with_title("Have any assets changed in the last 30 days?")
                .with_input_type(Some(InputType::YesNo))
                .with_labels([Assets, ScheduleAB])
                .with_required(true)
                .with_blocks_workflow(true)
                .with_ui(240.0, 80.0),
            Node::new(NodeKind::Question, "q2")
                .with_title("Describe the change and estimated value impact.")
                .with_input_type(Some(InputType::Textarea))
                .with_labels([Assets, Exemptions])
                .with_required(true)
                .with_blocks_workflow(true)
                .with_ui(460.0, 20.0),
            Node::new(NodeKind::End, "end").with_ui(680.0, 80.0),
        ],
        vec![
            Edge::new("e1", "s", "q1", EdgeCondition::Always),
            Edge::new("e2", "q1", "q2", EdgeCondition::Yes),
            Edge::new("e3", "q1", "end", EdgeCondition::No),
            Edge::new("e4", "q2", "end", EdgeCondition::Always),
        ],
    )
}

fn clarification_graph() -> Graph {
    let mut upload = Node::new(NodeKind::DocRequest, "doc")
        .with_title("Upload replacement document file")
        .with_labels([FilingLabel::Documents])
        .with_input_type(Some(InputType::FileUpload))
        .with_required(true)
        .with_blocks_workflow(true)
        .with_ui(260.0, 90.0);
    upload.file_rules = Some(FileRules {
        min_files: Some(1),
        ..FileRules::default()
    });
    Graph::from_parts(
        vec![
            Node::new(NodeKind::Start, "s").with_ui(40.0, 90.0),
            upload,
            Node::new(NodeKind::Question, "note")
                .with_title("If unavailable, explain what you can provide instead.")
                .with_input_type(Some(InputType::Textarea))
                .with_labels([FilingLabel::Documents, FilingLabel::Other])
                .with_required(true)
                .with_blocks_workflow(true)
                .with_ui(500.0, 90.0),
            Node::new(NodeKind::End, "e").with_ui(720.0, 90.0),
        ],
        vec![
            Edge::new("a", "s", "doc", EdgeCondition::Always),
            Edge::new("b", "doc", "note", EdgeCondition::Always),
            Edge::new("c", "note", "e", EdgeCondition::Always),
        ],
    )
}

/// All shipped templates, intake first
#[must_use]
pub fn seed_templates(catalog: &dyn LegacyCatalog, now: Timestamp) -> Vec<Template> {
    vec![
        guided_intake_template(catalog, now),
        system_template(
            FOLLOWUP_TEMPLATE_ID,
            "Ch7 Follow-up",
            "Attorney follow-up questionnaire for remaining filing blockers.",
            followup_graph(),
            now,
        ),
        system_template(
            CLARIFICATION_TEMPLATE_ID,
            "Document Clarification",
            "Structured clarification flow for insufficient uploads.",
            clarification_graph(),
            now,
        ),
    ]
}

/// Assignment of a template's active version under a fixed id
#[must_use]
pub fn seed_assignment(id: &str, template: &Template, now: Timestamp) -> Assignment {
    Assignment::new(id, &template.id, template.active_version(), &template.title, now)
}

/// Seed assignments for the intake and follow-up templates present in
/// `templates`; the follow-up is due three days after `now`
#[must_use]
pub fn seed_assignments(templates: &[Template], now: Timestamp) -> Vec<Assignment> {
    let find = |id: &str| templates.iter().find(|t| t.id == id);
    let mut assignments = Vec::new();
    if let Some(intake) = find(INTAKE_TEMPLATE_ID) {
        assignments.push(seed_assignment(INTAKE_ASSIGNMENT_ID, intake, now));
    }
    if let Some(followup) = find(FOLLOWUP_TEMPLATE_ID) {
        let due = (now + Duration::days(3)).format("%Y-%m-%d").to_string();
        assignments.push(seed_assignment(FOLLOWUP_ASSIGNMENT_ID, followup, now).with_due_at(due));
    }
    assignments
}

/// A fresh document holding only the seeds
#[must_use]
pub fn seed_state(catalog: &dyn LegacyCatalog, now: Timestamp) -> QuestionnaireState {
    let templates = seed_templates(catalog, now);
    let assignments = seed_assignments(&templates, now);
    QuestionnaireState {
        templates,
        assignments,
        ..QuestionnaireState::default()
    }
}

/// Whether the intake template's active graph still mirrors every catalog
/// step and field
#[must_use]
pub fn is_hydrated_intake(template: &Template, catalog: &dyn LegacyCatalog) -> bool {
    let Some(graph) = template.active_graph() else {
        return false;
    };
    let mapped: Vec<&str> = graph
        .nodes
        .iter()
        .filter_map(|n| n.legacy_field_id.as_deref())
        .collect();
    let field_count: usize = catalog.steps().iter().map(|s| s.fields.len()).sum();
    let section_count = graph.nodes_of_kind(NodeKind::Section).count();

    let all_fields_present = catalog
        .steps()
        .iter()
        .flat_map(|s| s.fields.iter())
        .all(|f| mapped.contains(&f.id.as_str()));
    all_fields_present && mapped.len() >= field_count && section_count >= catalog.steps().len()
}
