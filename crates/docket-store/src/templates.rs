//! Template lifecycle: create, duplicate, edit, publish, archive, delete

use std::collections::HashSet;

use docket_graph::{
    CreatedBy, Edge, FilingLabel, Graph, GraphEdit, InputType, Node, NodeKind, Publisher, Template,
    TemplateKind, TemplateVersion,
};
use docket_runtime::GraphValidator;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::ordering::normalize_graph_ordering;
use crate::services::StoreServices;
use crate::state::QuestionnaireState;
use crate::telemetry::TelemetryEvent;
use crate::titles::{next_unique_title, strip_auto_copy_artifacts};

const DEFAULT_DESCRIPTION: &str = "Custom questionnaire";

/// What [`QuestionnaireState::remove_template`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRemoval {
    /// Nothing referenced it; removed from the document
    Deleted,
    /// Assignments reference it; archived instead
    Archived,
    /// A default template; left as is
    Retained,
}

/// Starter graph for a new template: start, one section holding one
/// question, end, linked by `always` edges
#[must_use]
pub fn default_graph(services: &StoreServices, title: &str) -> Graph {
    let start = Node::new(NodeKind::Start, services.next_id("start"))
        .with_client_visible(false)
        .with_ui(80.0, 160.0);
    let section = Node::new(NodeKind::Section, services.next_id("section"))
        .with_title(title)
        .with_labels([FilingLabel::Other])
        .with_ui(300.0, 140.0);
    let question = Node::new(NodeKind::Question, services.next_id("question"))
        .with_title("New question")
        .with_input_type(Some(InputType::Text))
        .with_required(true)
        .with_section(section.id.clone())
        .with_ui(520.0, 140.0);
    let end = Node::new(NodeKind::End, services.next_id("end")).with_ui(740.0, 160.0);

    let edges = vec![
        Edge::always(&start.id, &section.id),
        Edge::always(&section.id, &question.id),
        Edge::always(&question.id, &end.id),
    ];
    Graph::from_parts(vec![start, section, question, end], edges)
}

impl QuestionnaireState {
    fn template_or_err(&self, id: &str) -> StoreResult<&Template> {
        self.template(id)
            .ok_or_else(|| StoreError::TemplateNotFound(id.to_owned()))
    }

    fn template_mut_or_err(&mut self, id: &str) -> StoreResult<&mut Template> {
        self.template_mut(id)
            .ok_or_else(|| StoreError::TemplateNotFound(id.to_owned()))
    }

    /// Templates not archived, newest first
    pub fn active_templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter().filter(|t| !t.archived)
    }

    /// Create an attorney template with an unpublished starter graph.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyTitle`] when `title` is blank.
    pub fn create_template(
        &mut self,
        services: &StoreServices,
        title: &str,
        description: Option<&str>,
    ) -> StoreResult<Template> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION);

        let now = services.now();
        let graph = default_graph(services, title);
        let template = Template::new(
            services.next_id("qtpl"),
            title,
            TemplateKind::Custom,
            CreatedBy::Attorney,
            TemplateVersion::draft(1, graph),
            now,
        )
        .with_description(description);

        self.templates.insert(0, template.clone());
        services.emit(TelemetryEvent::TemplateCreated {
            template_id: template.id.clone(),
        });
        Ok(template)
    }

    /// Deep-copy a template, history included, under a fresh id and a
    /// title unique among existing templates.
    ///
    /// # Errors
    ///
    /// [`StoreError::TemplateNotFound`] when `id` is unknown.
    pub fn duplicate_template(&mut self, services: &StoreServices, id: &str) -> StoreResult<Template> {
        let source = self.template_or_err(id)?;
        let taken: HashSet<String> = self.templates.iter().map(|t| t.title.clone()).collect();
        let title = next_unique_title(&strip_auto_copy_artifacts(&source.title), &taken);

        let now = services.now();
        let mut copy = source.clone();
        copy.id = services.next_id("qtpl");
        copy.title = title;
        copy.is_default = false;
        copy.kind = TemplateKind::Custom;
        copy.created_by = CreatedBy::Attorney;
        copy.created_at = now;
        copy.updated_at = now;
        copy.archived = false;

        self.templates.insert(0, copy.clone());
        services.emit(TelemetryEvent::TemplateCreated {
            template_id: copy.id.clone(),
        });
        Ok(copy)
    }

    /// The template to open in the editor: attorney templates as they are,
    /// system or default templates as a fresh duplicate.
    ///
    /// # Errors
    ///
    /// [`StoreError::TemplateNotFound`] when `id` is unknown.
    pub fn clone_template_for_edit(
        &mut self,
        services: &StoreServices,
        id: &str,
    ) -> StoreResult<Template> {
        let source = self.template_or_err(id)?;
        if source.is_system_owned() {
            self.duplicate_template(services, id)
        } else {
            Ok(source.clone())
        }
    }

    /// Hide a template from listings. Default templates stay visible;
    /// returns whether the template was archived.
    ///
    /// # Errors
    ///
    /// [`StoreError::TemplateNotFound`] when `id` is unknown.
    pub fn archive_template(&mut self, services: &StoreServices, id: &str) -> StoreResult<bool> {
        let template = self.template_mut_or_err(id)?;
        if template.is_default {
            return Ok(false);
        }
        template.archived = true;
        template.updated_at = services.now();
        Ok(true)
    }

    /// Delete a template no assignment references, otherwise archive it.
    ///
    /// # Errors
    ///
    /// [`StoreError::TemplateNotFound`] when `id` is unknown.
    pub fn remove_template(
        &mut self,
        services: &StoreServices,
        id: &str,
    ) -> StoreResult<TemplateRemoval> {
        if self.template_or_err(id)?.is_default {
            return Ok(TemplateRemoval::Retained);
        }
        if self.assignments.iter().any(|a| a.template_id == id) {
            self.archive_template(services, id)?;
            return Ok(TemplateRemoval::Archived);
        }
        self.templates.retain(|t| t.id != id);
        Ok(TemplateRemoval::Deleted)
    }

    /// Replace the active graph. Ordering keys are normalized first; a
    /// published active version is never touched, a new draft is appended
    /// instead.
    ///
    /// # Errors
    ///
    /// [`StoreError::TemplateNotFound`] when `id` is unknown.
    pub fn update_template_graph(
        &mut self,
        services: &StoreServices,
        id: &str,
        mut graph: Graph,
    ) -> StoreResult<GraphEdit> {
        normalize_graph_ordering(&mut graph);
        let now = services.now();
        let template = self.template_mut_or_err(id)?;
        let edit = template.apply_graph_edit(graph, now);
        match edit {
            GraphEdit::Bumped { from, to } => {
                debug!("Template {} v{} is published, editing new draft v{}", id, from, to);
            }
            GraphEdit::Unresolved { active } => {
                warn!("Template {} points at missing v{}, edit dropped", id, active);
            }
            GraphEdit::InPlace { .. } => {}
        }
        Ok(edit)
    }

    /// Point a template at an existing version
    ///
    /// # Errors
    ///
    /// [`StoreError::TemplateNotFound`] or [`StoreError::VersionNotFound`].
    pub fn activate_template_version(
        &mut self,
        services: &StoreServices,
        id: &str,
        version: u32,
    ) -> StoreResult<()> {
        let now = services.now();
        let template = self.template_mut_or_err(id)?;
        if !template.activate(version) {
            return Err(StoreError::VersionNotFound {
                template_id: id.to_owned(),
                version,
            });
        }
        template.updated_at = now;
        Ok(())
    }

    /// Validate the active graph and append it as a published version.
    /// `by` defaults to the attorney. Returns the new version number.
    ///
    /// # Errors
    ///
    /// - [`StoreError::TemplateNotFound`] when `id` is unknown
    /// - [`StoreError::VersionNotFound`] when the active pointer dangles
    /// - [`StoreError::InvalidGraph`] when the validator reports errors
    pub fn publish_template_version(
        &mut self,
        services: &StoreServices,
        validator: &GraphValidator,
        id: &str,
        by: Option<Publisher>,
        notes: Option<&str>,
    ) -> StoreResult<u32> {
        let template = self.template_or_err(id)?;
        let active = template.active_version();
        let graph = template.active_graph().ok_or_else(|| StoreError::VersionNotFound {
            template_id: id.to_owned(),
            version: active,
        })?;
        let report = validator.validate(graph);
        if !report.is_valid() {
            return Err(StoreError::InvalidGraph(report));
        }

        let now = services.now();
        let notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_owned);
        let template = self.template_mut_or_err(id)?;
        let version = template
            .publish_active(by.unwrap_or(Publisher::Attorney), notes, now)
            .ok_or_else(|| StoreError::VersionNotFound {
                template_id: id.to_owned(),
                version: active,
            })?;

        info!("Published template {} v{}", id, version);
        services.emit(TelemetryEvent::TemplatePublished {
            template_id: id.to_owned(),
            version,
        });
        Ok(version)
    }
}
