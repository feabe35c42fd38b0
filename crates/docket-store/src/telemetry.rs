//! Telemetry events and sinks.
//!
//! Sinks are fire-and-forget: emitting never fails and never blocks the
//! mutation that produced the event.

use std::fmt;
use std::sync::Arc;

use docket_graph::AssignmentStage;
use parking_lot::Mutex;
use serde::Serialize;

/// Something worth recording happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A template was created or duplicated
    TemplateCreated {
        /// New template
        template_id: String,
    },
    /// A template version was published
    TemplatePublished {
        /// Template
        template_id: String,
        /// Published version
        version: u32,
    },
    /// An assignment was issued
    AssignmentCreated {
        /// New assignment
        assignment_id: String,
        /// Template issued
        template_id: String,
        /// Pinned version
        template_version: u32,
    },
    /// An assignment moved to a new stage
    StageChanged {
        /// Assignment
        assignment_id: String,
        /// Previous stage
        from: AssignmentStage,
        /// New stage
        to: AssignmentStage,
    },
    /// The persisted document was rebuilt by migration
    StateMigrated {
        /// Whether a legacy v1 document was archived
        archived_legacy: bool,
        /// Templates after migration
        templates: usize,
    },
}

impl TelemetryEvent {
    /// Stable event name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TemplateCreated { .. } => "template_created",
            Self::TemplatePublished { .. } => "template_published",
            Self::AssignmentCreated { .. } => "assignment_created",
            Self::StageChanged { .. } => "stage_changed",
            Self::StateMigrated { .. } => "state_migrated",
        }
    }
}

/// Receiver of telemetry events
pub trait TelemetrySink: Send + Sync {
    /// Record an event
    fn emit(&self, event: &TelemetryEvent);
}

/// Logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn emit(&self, event: &TelemetryEvent) {
        tracing::info!(event = event.name(), detail = ?event, "telemetry");
    }
}

/// Counts events with the `metrics` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsTelemetry;

impl TelemetrySink for MetricsTelemetry {
    fn emit(&self, event: &TelemetryEvent) {
        metrics::counter!("docket_events_total", "event" => event.name()).increment(1);
        if let TelemetryEvent::StageChanged { to, .. } = event {
            metrics::counter!("docket_stage_changes_total", "stage" => to.as_str()).increment(1);
        }
    }
}

/// Forwards every event to each inner sink in turn
#[derive(Clone, Default)]
pub struct FanoutTelemetry {
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl FanoutTelemetry {
    /// Fan out to `sinks`
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn TelemetrySink>>) -> Self {
        Self { sinks }
    }
}

impl TelemetrySink for FanoutTelemetry {
    fn emit(&self, event: &TelemetryEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

impl fmt::Debug for FanoutTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutTelemetry")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn emit(&self, _event: &TelemetryEvent) {}
}

/// Keeps events in memory; useful for audits and tests
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    #[must_use]
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn emit(&self, event: &TelemetryEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stage_change() -> TelemetryEvent {
        TelemetryEvent::StageChanged {
            assignment_id: "assign-1".to_owned(),
            from: AssignmentStage::Assigned,
            to: AssignmentStage::InProgress,
        }
    }

    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_value(stage_change()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "stage_changed",
                "assignment_id": "assign-1",
                "from": "assigned",
                "to": "in_progress"
            })
        );
        assert_eq!(stage_change().name(), "stage_changed");
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let first = Arc::new(RecordingTelemetry::new());
        let second = Arc::new(RecordingTelemetry::new());
        let fanout = FanoutTelemetry::new(vec![
            first.clone(),
            Arc::new(MetricsTelemetry),
            Arc::new(TracingTelemetry),
            second.clone(),
        ]);
        fanout.emit(&stage_change());
        assert_eq!(first.events(), vec![stage_change()]);
        assert_eq!(second.events(), vec![stage_change()]);
    }
}
