//! The persisted questionnaire document

use std::fmt;

use docket_graph::{Assignment, NodeResponse, Template};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current document schema version
pub const SCHEMA_VERSION: u32 = 3;

/// Everything the store persists, as one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireState {
    /// Always [`SCHEMA_VERSION`] once loaded
    pub schema_version: u32,
    /// Templates, newest first
    pub templates: Vec<Template>,
    /// Assignments, newest first
    pub assignments: Vec<Assignment>,
    /// Responses, one per (assignment, node)
    pub responses: Vec<NodeResponse>,
    /// Legacy v1 document kept verbatim after migration
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "archivedV1")]
    pub archived_v1: Option<Value>,
}

impl Default for QuestionnaireState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            templates: Vec::new(),
            assignments: Vec::new(),
            responses: Vec::new(),
            archived_v1: None,
        }
    }
}

impl QuestionnaireState {
    /// Look up a template
    #[must_use]
    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub(crate) fn template_mut(&mut self, id: &str) -> Option<&mut Template> {
        self.templates.iter_mut().find(|t| t.id == id)
    }

    /// Look up an assignment
    #[must_use]
    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub(crate) fn assignment_mut(&mut self, id: &str) -> Option<&mut Assignment> {
        self.assignments.iter_mut().find(|a| a.id == id)
    }

    /// Template an assignment was issued from
    #[must_use]
    pub fn template_for(&self, assignment: &Assignment) -> Option<&Template> {
        self.template(&assignment.template_id)
    }
}

/// Why a persisted document could not be used as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleDocument {
    /// Nothing stored
    Missing,
    /// Not parseable as a document
    Corrupt(String),
    /// Written by another schema version
    VersionMismatch(Option<u64>),
    /// No readable templates
    NoTemplates,
}

impl fmt::Display for StaleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("no document stored"),
            Self::Corrupt(reason) => write!(f, "corrupt document: {reason}"),
            Self::VersionMismatch(Some(v)) => write!(f, "schema version {v} is not {SCHEMA_VERSION}"),
            Self::VersionMismatch(None) => f.write_str("schema version missing"),
            Self::NoTemplates => f.write_str("document has no readable templates"),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    schema_version: Option<Value>,
    #[serde(default)]
    templates: Value,
    #[serde(default)]
    assignments: Value,
    #[serde(default)]
    responses: Value,
    #[serde(default, rename = "archivedV1")]
    archived_v1: Option<Value>,
}

/// Keep the entries of a JSON array that parse as `T`; anything else is empty
fn parse_entries<T: for<'de> Deserialize<'de>>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse a stored document, dropping malformed entries individually.
///
/// # Errors
///
/// Returns the reason the document must be migrated instead.
pub fn read_document(raw: Option<&str>) -> Result<QuestionnaireState, StaleDocument> {
    let raw = raw.ok_or(StaleDocument::Missing)?;
    let doc: RawDocument =
        serde_json::from_str(raw).map_err(|err| StaleDocument::Corrupt(err.to_string()))?;
    let version = doc.schema_version.as_ref().and_then(Value::as_u64);
    if version != Some(u64::from(SCHEMA_VERSION)) {
        return Err(StaleDocument::VersionMismatch(version));
    }
    let templates: Vec<Template> = parse_entries(doc.templates);
    if templates.is_empty() {
        return Err(StaleDocument::NoTemplates);
    }
    Ok(QuestionnaireState {
        schema_version: SCHEMA_VERSION,
        templates,
        assignments: parse_entries(doc.assignments),
        responses: parse_entries(doc.responses),
        archived_v1: doc.archived_v1,
    })
}
