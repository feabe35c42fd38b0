//! Bridge to the flat, pre-graph intake form.
//!
//! The legacy intake is a list of steps, each holding fields gated by
//! `show_if` predicates over a flat answer map. Graph nodes mirror those
//! fields through `legacy_step_id` / `legacy_field_id`. This module holds the
//! read-only catalog contract and the two projections from graph responses to
//! the legacy shapes. Nothing outside this module depends on the legacy
//! vocabulary except the visibility gate.

pub mod catalog;
pub mod projection;

pub use catalog::{
    EmptyCatalog, LegacyCatalog, LegacyField, LegacyFieldKind, LegacyOption, LegacyStep,
    ShowIf, StaticCatalog,
};
pub use projection::{
    build_intake_state_from_assignment, build_legacy_answers_from_responses, Answers,
    FieldValue, FlagEntry, Flags, IntakeState, Uploads,
};
