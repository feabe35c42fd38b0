//! Response persistence: last writer wins per (assignment, node)

use docket_graph::{
    move_file_between_values, remove_files_by_id, with_appended_files, NodeResponse, ResponseFile,
    ResponseValue, SkipActor, SkipRecord,
};

use crate::error::{StoreError, StoreResult};
use crate::services::StoreServices;
use crate::state::QuestionnaireState;

impl QuestionnaireState {
    fn require_assignment(&self, id: &str) -> StoreResult<()> {
        if self.assignment(id).is_some() {
            Ok(())
        } else {
            Err(StoreError::AssignmentNotFound(id.to_owned()))
        }
    }

    fn response_position(&self, assignment_id: &str, node_id: &str) -> Option<usize> {
        self.responses
            .iter()
            .position(|r| r.assignment_id == assignment_id && r.node_id == node_id)
    }

    /// Stored response for one node
    #[must_use]
    pub fn response(&self, assignment_id: &str, node_id: &str) -> Option<&NodeResponse> {
        self.response_position(assignment_id, node_id)
            .map(|index| &self.responses[index])
    }

    /// Responses of one assignment
    pub fn responses_for_assignment<'a>(
        &'a self,
        assignment_id: &'a str,
    ) -> impl Iterator<Item = &'a NodeResponse> {
        self.responses
            .iter()
            .filter(move |r| r.assignment_id == assignment_id)
    }

    /// Insert or replace the response for its (assignment, node) key
    pub fn upsert_response(&mut self, response: NodeResponse) {
        match self.response_position(&response.assignment_id, &response.node_id) {
            Some(index) => self.responses[index] = response,
            None => self.responses.push(response),
        }
    }

    /// Record an answer, clearing any skip
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `assignment_id` is unknown.
    pub fn record_answer(
        &mut self,
        services: &StoreServices,
        assignment_id: &str,
        node_id: &str,
        value: ResponseValue,
    ) -> StoreResult<()> {
        self.require_assignment(assignment_id)?;
        self.upsert_response(NodeResponse::answered(
            assignment_id,
            node_id,
            value,
            services.now(),
        ));
        Ok(())
    }

    /// Mark a node skipped, dropping any value
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `assignment_id` is unknown.
    pub fn skip_node(
        &mut self,
        services: &StoreServices,
        assignment_id: &str,
        node_id: &str,
        reason: &str,
        by: SkipActor,
    ) -> StoreResult<()> {
        self.require_assignment(assignment_id)?;
        let now = services.now();
        let skip = SkipRecord {
            reason: reason.trim().to_owned(),
            by,
            at: now,
        };
        self.upsert_response(NodeResponse::skipped(assignment_id, node_id, skip, now));
        Ok(())
    }

    /// Drop every response of an assignment; returns how many were removed
    pub fn clear_assignment_responses(&mut self, assignment_id: &str) -> usize {
        let before = self.responses.len();
        self.responses.retain(|r| r.assignment_id != assignment_id);
        before - self.responses.len()
    }

    fn take_value(&mut self, assignment_id: &str, node_id: &str) -> Option<ResponseValue> {
        self.response_position(assignment_id, node_id)
            .and_then(|index| self.responses[index].value.take())
    }

    fn put_value(
        &mut self,
        services: &StoreServices,
        assignment_id: &str,
        node_id: &str,
        value: Option<ResponseValue>,
    ) {
        let now = services.now();
        match (self.response_position(assignment_id, node_id), value) {
            (Some(index), value) => {
                let response = &mut self.responses[index];
                if value.is_some() {
                    response.skipped = None;
                }
                response.value = value;
                response.updated_at = now;
            }
            (None, Some(value)) => {
                self.responses
                    .push(NodeResponse::answered(assignment_id, node_id, value, now));
            }
            (None, None) => {}
        }
    }

    /// Append uploaded files to a node's value, ignoring ids already present
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `assignment_id` is unknown.
    pub fn attach_files(
        &mut self,
        services: &StoreServices,
        assignment_id: &str,
        node_id: &str,
        files: &[ResponseFile],
    ) -> StoreResult<()> {
        self.require_assignment(assignment_id)?;
        let current = self.take_value(assignment_id, node_id);
        let value = with_appended_files(current.as_ref(), files);
        self.put_value(services, assignment_id, node_id, Some(value));
        Ok(())
    }

    /// Remove files from a node's value by id
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `assignment_id` is unknown.
    pub fn remove_files(
        &mut self,
        services: &StoreServices,
        assignment_id: &str,
        node_id: &str,
        file_ids: &[&str],
    ) -> StoreResult<()> {
        self.require_assignment(assignment_id)?;
        let current = self.take_value(assignment_id, node_id);
        let value = remove_files_by_id(current, file_ids);
        self.put_value(services, assignment_id, node_id, value);
        Ok(())
    }

    /// Move one file between two nodes of the same assignment. Returns
    /// whether the source held the file.
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`] when `assignment_id` is unknown.
    pub fn move_file(
        &mut self,
        services: &StoreServices,
        assignment_id: &str,
        from_node: &str,
        to_node: &str,
        file_id: &str,
    ) -> StoreResult<bool> {
        self.require_assignment(assignment_id)?;
        if from_node == to_node {
            return Ok(false);
        }
        let from = self.response(assignment_id, from_node).and_then(|r| r.value.clone());
        let to = self.response(assignment_id, to_node).and_then(|r| r.value.clone());
        let outcome = move_file_between_values(from, to, file_id);
        if outcome.moved.is_none() {
            return Ok(false);
        }
        self.put_value(services, assignment_id, from_node, outcome.from);
        self.put_value(services, assignment_id, to_node, outcome.to);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use docket_graph::{FixedClock, SequentialIds, Timestamp};
    use pretty_assertions::assert_eq;

    use crate::telemetry::NoopTelemetry;

    fn at() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
    }

    fn fixture() -> (QuestionnaireState, StoreServices, String) {
        let services = StoreServices::new(
            Arc::new(FixedClock::new(at())),
            Arc::new(SequentialIds::new()),
            Arc::new(NoopTelemetry),
        );
        let mut state = QuestionnaireState::default();
        let template = state.create_template(&services, "Demo", None).unwrap();
        let assignment = state.assign_template(&services, &template.id, None, None).unwrap();
        (state, services, assignment.id)
    }

    #[test]
    fn test_upsert_keeps_last_write() {
        let (mut state, svc, id) = fixture();
        state.record_answer(&svc, &id, "q1", ResponseValue::text("first")).unwrap();
        state.record_answer(&svc, &id, "q1", ResponseValue::text("second")).unwrap();
        assert_eq!(state.responses_for_assignment(&id).count(), 1);
        assert_eq!(
            state.response(&id, "q1").and_then(|r| r.value.clone()),
            Some(ResponseValue::text("second"))
        );
    }

    #[test]
    fn test_skip_replaces_value() {
        let (mut state, svc, id) = fixture();
        state.record_answer(&svc, &id, "q1", ResponseValue::text("x")).unwrap();
        state.skip_node(&svc, &id, "q1", " not applicable ", SkipActor::Client).unwrap();
        let response = state.response(&id, "q1").unwrap();
        assert!(response.value.is_none());
        assert_eq!(response.skipped.as_ref().map(|s| s.reason.as_str()), Some("not applicable"));
        assert!(response.is_answered());
    }

    #[test]
    fn test_file_moves_between_nodes() {
        let (mut state, svc, id) = fixture();
        let file = ResponseFile::new("f1", "paystub.pdf", at());
        state.attach_files(&svc, &id, "doc-a", &[file.clone(), file.clone()]).unwrap();
        assert_eq!(
            state.response(&id, "doc-a").and_then(|r| r.value.as_ref()).map(|v| v.file_list().len()),
            Some(1)
        );

        assert!(state.move_file(&svc, &id, "doc-a", "doc-b", "f1").unwrap());
        assert!(state.response(&id, "doc-a").unwrap().value.is_none());
        assert_eq!(
            state.response(&id, "doc-b").and_then(|r| r.value.clone()),
            Some(ResponseValue::files(vec![file]))
        );
        assert!(!state.move_file(&svc, &id, "doc-a", "doc-b", "f1").unwrap());
    }

    #[test]
    fn test_clear_and_unknown_assignment() {
        let (mut state, svc, id) = fixture();
        state.record_answer(&svc, &id, "q1", ResponseValue::Bool(true)).unwrap();
        state.record_answer(&svc, &id, "q2", ResponseValue::Bool(false)).unwrap();
        assert_eq!(state.clear_assignment_responses(&id), 2);
        let err = state
            .record_answer(&svc, "missing", "q1", ResponseValue::Bool(true))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
