//! Injected id, clock and telemetry services

use std::fmt;
use std::sync::Arc;

use docket_graph::{Clock, IdGenerator, SystemClock, Timestamp, UlidIds};

use crate::telemetry::{TelemetryEvent, TelemetrySink, TracingTelemetry};

/// Services every mutating operation draws on
#[derive(Clone)]
pub struct StoreServices {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl StoreServices {
    /// Build from parts
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            clock,
            ids,
            telemetry,
        }
    }

    /// Wall clock, ULID ids, tracing telemetry
    #[must_use]
    pub fn system() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(UlidIds),
            Arc::new(TracingTelemetry),
        )
    }

    /// Replace the telemetry sink
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Current time
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Fresh id with `prefix`
    #[must_use]
    pub fn next_id(&self, prefix: &str) -> String {
        self.ids.next_id(prefix)
    }

    /// Fire-and-forget telemetry
    pub fn emit(&self, event: TelemetryEvent) {
        self.telemetry.emit(&event);
    }
}

impl Default for StoreServices {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for StoreServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreServices").finish_non_exhaustive()
    }
}
