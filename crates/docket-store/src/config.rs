//! Store configuration

use serde::{Deserialize, Serialize};

/// Key of the current questionnaire document
pub const DEFAULT_DOCUMENT_KEY: &str = "questionnaires:v3";

/// Key of the pre-graph questionnaire document
pub const DEFAULT_LEGACY_KEY: &str = "questionnaires:v1";

/// Configuration of a [`crate::QuestionnaireStore`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Scope prefixed to every key (firm or client workspace)
    pub scope: String,
    /// Key of the current document
    pub document_key: String,
    /// Key of the legacy v1 document read during migration
    pub legacy_key: String,
    /// Install seed templates and assignments when migrating
    pub seed_on_empty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            scope: "gbi".to_owned(),
            document_key: DEFAULT_DOCUMENT_KEY.to_owned(),
            legacy_key: DEFAULT_LEGACY_KEY.to_owned(),
            seed_on_empty: true,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key scope
    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the document key
    #[inline]
    #[must_use]
    pub fn with_document_key(mut self, key: impl Into<String>) -> Self {
        self.document_key = key.into();
        self
    }

    /// Set the legacy document key
    #[inline]
    #[must_use]
    pub fn with_legacy_key(mut self, key: impl Into<String>) -> Self {
        self.legacy_key = key.into();
        self
    }

    /// Enable or disable seeding
    #[inline]
    #[must_use]
    pub fn with_seed_on_empty(mut self, seed: bool) -> Self {
        self.seed_on_empty = seed;
        self
    }
}
