//! Docket Store - questionnaire orchestration and persistence
//!
//! Everything that mutates questionnaire state goes through
//! [`QuestionnaireState`] methods and [`QuestionnaireStore`]:
//! - Template lifecycle with copy-on-write versioning
//! - Validated publishing
//! - Assignments pinned to a version, with forward-only stages
//! - Responses, last writer wins per (assignment, node)
//! - Ordering and title normalization
//! - Schema migration, seeds and the intake re-seed on load
//!
//! Persistence is a whole-document read / transform / write cycle over a
//! [`KeyValueStore`].
//!
//! # Example
//!
//! ```rust
//! use docket_store::{MemoryStore, QuestionnaireStore};
//!
//! let store = QuestionnaireStore::new(MemoryStore::new());
//! let created = store
//!     .update(|state, services| state.create_template(services, "Ch13 Intake", None))
//!     .unwrap();
//! assert_eq!(created.title, "Ch13 Intake");
//! ```

pub mod assignments;
pub mod config;
pub mod error;
pub mod kv;
pub mod migration;
pub mod ordering;
pub mod responses;
pub mod seeds;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod templates;
pub mod titles;

pub use config::{StoreConfig, DEFAULT_DOCUMENT_KEY, DEFAULT_LEGACY_KEY};
pub use error::{StoreError, StoreResult};
pub use kv::{scoped_key, FileStore, KeyValueStore, MemoryStore};
pub use migration::{migrate_from_v1, parse_legacy_document};
pub use ordering::normalize_graph_ordering;
pub use seeds::{
    build_guided_intake_graph, is_hydrated_intake, seed_state, CLARIFICATION_TEMPLATE_ID,
    FOLLOWUP_ASSIGNMENT_ID, FOLLOWUP_TEMPLATE_ID, INTAKE_ASSIGNMENT_ID, INTAKE_TEMPLATE_ID,
};
pub use services::StoreServices;
pub use state::{read_document, QuestionnaireState, StaleDocument, SCHEMA_VERSION};
pub use store::QuestionnaireStore;
pub use telemetry::{
    FanoutTelemetry, MetricsTelemetry, NoopTelemetry, RecordingTelemetry, TelemetryEvent, TelemetrySink,
    TracingTelemetry,
};
pub use templates::{default_graph, TemplateRemoval};
pub use titles::{next_unique_title, normalize_titles, strip_auto_copy_artifacts};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the store
    pub use crate::{
        KeyValueStore, MemoryStore, QuestionnaireState, QuestionnaireStore, StoreConfig,
        StoreError, StoreResult, StoreServices,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
