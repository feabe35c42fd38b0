//! Legacy form catalog

use std::fmt;
use std::sync::Arc;

use docket_graph::ChoiceOption;

use super::projection::Answers;

/// Visibility predicate over the legacy answer map
pub type ShowIf = Arc<dyn Fn(&Answers) -> bool + Send + Sync>;

/// Input widget of a legacy field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyFieldKind {
    /// Single-line text
    Text,
    /// Multi-line text
    Textarea,
    /// Email
    Email,
    /// Date
    Date,
    /// Radio buttons
    Radio,
    /// Checkbox group
    Checkbox,
    /// Dropdown
    Select,
    /// Row x column grid
    Grid,
    /// File upload
    File,
}

/// Choice of a radio, checkbox or select field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyOption {
    /// Stored value
    pub value: String,
    /// Display text
    pub label: String,
}

impl LegacyOption {
    /// Build an option
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// One field of a legacy step
#[derive(Clone)]
pub struct LegacyField {
    /// Field id, used as the answer key
    pub id: String,
    /// Widget
    pub kind: LegacyFieldKind,
    /// Question text
    pub label: String,
    /// Must be answered
    pub required: bool,
    /// Helper text
    pub helper: Option<String>,
    /// Placeholder
    pub placeholder: Option<String>,
    /// Why-we-ask text
    pub why_we_ask: Option<String>,
    /// Choices
    pub options: Vec<LegacyOption>,
    /// Grid rows
    pub rows: Vec<ChoiceOption>,
    /// Grid columns
    pub columns: Vec<ChoiceOption>,
    show_if: Option<ShowIf>,
}

impl LegacyField {
    /// Field shown unconditionally
    pub fn new(id: impl Into<String>, kind: LegacyFieldKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            required: false,
            helper: None,
            placeholder: None,
            why_we_ask: None,
            options: Vec::new(),
            rows: Vec::new(),
            columns: Vec::new(),
            show_if: None,
        }
    }

    /// Mark required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the choices
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: impl IntoIterator<Item = LegacyOption>) -> Self {
        self.options = options.into_iter().collect();
        self
    }

    /// Set the helper text
    #[inline]
    #[must_use]
    pub fn with_helper(mut self, helper: impl Into<String>) -> Self {
        self.helper = Some(helper.into());
        self
    }

    /// Gate the field on a predicate
    #[inline]
    #[must_use]
    pub fn with_show_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Answers) -> bool + Send + Sync + 'static,
    {
        self.show_if = Some(Arc::new(predicate));
        self
    }

    /// Whether the field is shown for `answers`
    #[must_use]
    pub fn is_shown(&self, answers: &Answers) -> bool {
        self.show_if.as_ref().map_or(true, |predicate| predicate(answers))
    }
}

impl fmt::Debug for LegacyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyField")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("required", &self.required)
            .field("gated", &self.show_if.is_some())
            .finish_non_exhaustive()
    }
}

/// One step (page) of the legacy intake
#[derive(Clone)]
pub struct LegacyStep {
    /// Step id
    pub id: String,
    /// Step title
    pub title: String,
    /// Step description
    pub description: Option<String>,
    /// Fields, in display order
    pub fields: Vec<LegacyField>,
    show_if: Option<ShowIf>,
}

impl LegacyStep {
    /// Step shown unconditionally
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            fields: Vec::new(),
            show_if: None,
        }
    }

    /// Set the description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: LegacyField) -> Self {
        self.fields.push(field);
        self
    }

    /// Gate the step on a predicate
    #[inline]
    #[must_use]
    pub fn with_show_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Answers) -> bool + Send + Sync + 'static,
    {
        self.show_if = Some(Arc::new(predicate));
        self
    }

    /// Look up a field
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&LegacyField> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Whether the step is shown for `answers`
    #[must_use]
    pub fn is_shown(&self, answers: &Answers) -> bool {
        self.show_if.as_ref().map_or(true, |predicate| predicate(answers))
    }
}

impl fmt::Debug for LegacyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyStep")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("gated", &self.show_if.is_some())
            .finish_non_exhaustive()
    }
}

/// Read-only lookup into the legacy intake definition
pub trait LegacyCatalog: Send + Sync {
    /// Steps in display order
    fn steps(&self) -> &[LegacyStep];

    /// Look up a step
    fn step(&self, id: &str) -> Option<&LegacyStep> {
        self.steps().iter().find(|step| step.id == id)
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    steps: Vec<LegacyStep>,
}

impl StaticCatalog {
    /// Catalog over `steps`
    #[must_use]
    pub fn new(steps: Vec<LegacyStep>) -> Self {
        Self { steps }
    }
}

impl LegacyCatalog for StaticCatalog {
    fn steps(&self) -> &[LegacyStep] {
        &self.steps
    }
}

/// Catalog with no steps; gates nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl LegacyCatalog for EmptyCatalog {
    fn steps(&self) -> &[LegacyStep] {
        &[]
    }
}
