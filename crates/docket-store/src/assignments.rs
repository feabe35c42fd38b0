//! Assignment lifecycle and stage recording

use docket_graph::{Assignment, AssignmentStage, LegacyAssignmentStatus};
use docket_runtime::{
    compute_coverage_state, derive_assignment_progress, validate_stage_transition,
    AssignmentProgress, CoverageState, LegacyCatalog,
};

use crate::error::{StoreError, StoreResult};
use crate::services::StoreServices;
use crate::state::QuestionnaireState;
use crate::telemetry::TelemetryEvent;

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl QuestionnaireState {
    fn assignment_or_err(&self, id: &str) -> StoreResult<&Assignment> {
        self.assignment(id)
            .ok_or_else(|| StoreError::AssignmentNotFound(id.to_owned()))
    }

    /// Assignments not archived, newest first
    pub fn active_assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(|a| !a.archived)
    }

    /// Issue the template's active version. The title defaults to the
    /// template title; blank overrides and due dates are ignored.
    ///
    /// # Errors
    ///
    /// [`StoreError::TemplateNotFound`] when `template_id` is unknown.
    pub fn assign_template(
        &mut self,
        services: &StoreServices,
        template_id: &str,
        title: Option<&str>,
        due_at: Option<&str>,
    ) -> StoreResult<Assignment> {
        let template = self
            .template(template_id)
            .ok_or_else(|| StoreError::TemplateNotFound(template_id.to_owned()))?;
        let title = trimmed(title).unwrap_or(&template.title).to_owned();

        let mut assignment = Assignment::new(
            services.next_id("assign"),
            template_id,
            template.active_version(),
            title,
            services.now(),
        );
        if let Some(due_at) = trimmed(due_at) {
            assignment = assignment.with_due_at(due_at);
        }

        self.assignments.insert(0, assignment.clone());
        services.emit(TelemetryEvent::AssignmentCreated {
            assignment_id: assignment.id.clone(),
            template_id: assignment.template_id.clone(),
            template_version: assignment.template_version,
        });
        Ok(assignment)
    }

    /// Record a new stage. Staying put is a no-op; moving backwards is
    /// refused. Returns the previous stage.
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] or [`StoreError::StageDowngrade`].
    pub fn set_assignment_stage(
        &mut self,
        services: &StoreServices,
        id: &str,
        stage: AssignmentStage,
    ) -> StoreResult<AssignmentStage> {
        let assignment = self
            .assignment_mut(id)
            .ok_or_else(|| StoreError::AssignmentNotFound(id.to_owned()))?;
        let from = assignment.stage();
        validate_stage_transition(from, stage)?;
        if from != stage {
            assignment.computed_stage = Some(stage);
            services.emit(TelemetryEvent::StageChanged {
                assignment_id: id.to_owned(),
                from,
                to: stage,
            });
        }
        Ok(from)
    }

    /// Apply a status from the older three-state model. Statuses that map
    /// below the recorded stage leave it unchanged.
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `id` is unknown.
    pub fn update_assignment_status(
        &mut self,
        services: &StoreServices,
        id: &str,
        status: LegacyAssignmentStatus,
    ) -> StoreResult<AssignmentStage> {
        let current = self.assignment_or_err(id)?.stage();
        let target = status.to_stage().max(current);
        self.set_assignment_stage(services, id, target)?;
        Ok(target)
    }

    /// Hide an assignment from listings
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `id` is unknown.
    pub fn archive_assignment(&mut self, id: &str) -> StoreResult<()> {
        let assignment = self
            .assignment_mut(id)
            .ok_or_else(|| StoreError::AssignmentNotFound(id.to_owned()))?;
        assignment.archived = true;
        Ok(())
    }

    /// Progress of one assignment against its pinned version
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `id` is unknown.
    pub fn assignment_progress(
        &self,
        id: &str,
        catalog: &dyn LegacyCatalog,
    ) -> StoreResult<AssignmentProgress> {
        let assignment = self.assignment_or_err(id)?;
        Ok(derive_assignment_progress(
            assignment,
            self.template_for(assignment),
            &self.responses,
            catalog,
        ))
    }

    /// Filing-label coverage of one assignment
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `id` is unknown.
    pub fn assignment_coverage(
        &self,
        id: &str,
        catalog: &dyn LegacyCatalog,
    ) -> StoreResult<Vec<CoverageState>> {
        let assignment = self.assignment_or_err(id)?;
        Ok(compute_coverage_state(
            self.template_for(assignment),
            Some(assignment),
            &self.responses,
            catalog,
        ))
    }

    /// Derive progress and record the derived stage when it moved forward
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `id` is unknown.
    pub fn refresh_assignment_stage(
        &mut self,
        services: &StoreServices,
        id: &str,
        catalog: &dyn LegacyCatalog,
    ) -> StoreResult<AssignmentProgress> {
        let progress = self.assignment_progress(id, catalog)?;
        self.set_assignment_stage(services, id, progress.stage)?;
        Ok(progress)
    }
}
