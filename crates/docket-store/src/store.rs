//! Whole-document store: read, transform, write

use std::fmt;
use std::sync::Arc;

use docket_runtime::{EmptyCatalog, LegacyCatalog};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::kv::{scoped_key, KeyValueStore};
use crate::migration::{migrate_from_v1, parse_legacy_document};
use crate::seeds::seed_state;
use crate::services::StoreServices;
use crate::state::{read_document, QuestionnaireState};
use crate::telemetry::TelemetryEvent;
use crate::titles::normalize_titles;

/// Questionnaire document store over a key-value backend
pub struct QuestionnaireStore<K> {
    backend: K,
    config: StoreConfig,
    services: StoreServices,
    catalog: Arc<dyn LegacyCatalog>,
}

impl<K: KeyValueStore> QuestionnaireStore<K> {
    /// Store with the default configuration, system services and no
    /// legacy catalog
    pub fn new(backend: K) -> Self {
        Self {
            backend,
            config: StoreConfig::default(),
            services: StoreServices::system(),
            catalog: Arc::new(EmptyCatalog),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the id, clock and telemetry services
    #[must_use]
    pub fn with_services(mut self, services: StoreServices) -> Self {
        self.services = services;
        self
    }

    /// Use `catalog` for visibility gating and intake seeding
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn LegacyCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Services in use
    pub fn services(&self) -> &StoreServices {
        &self.services
    }

    /// Legacy catalog in use
    pub fn catalog(&self) -> &dyn LegacyCatalog {
        self.catalog.as_ref()
    }

    /// Backend
    pub fn backend(&self) -> &K {
        &self.backend
    }

    fn document_key(&self) -> String {
        scoped_key(&self.config.scope, &self.config.document_key)
    }

    fn legacy_key(&self) -> String {
        scoped_key(&self.config.scope, &self.config.legacy_key)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.backend.get(key).unwrap_or_else(|err| {
            warn!("Failed to read {}: {}", key, err);
            None
        })
    }

    fn save_logged(&self, state: &QuestionnaireState) {
        if let Err(err) = self.save(state) {
            warn!("Failed to persist questionnaire state: {}", err);
        }
    }

    /// Load the document, migrating or normalizing it as needed.
    ///
    /// A missing, unreadable, outdated or template-less document is rebuilt
    /// from the seeds and the legacy v1 document. A current document gets
    /// the intake template re-seeded when it drifted from the catalog and
    /// copy artifacts stripped from titles. The result is written back only
    /// when it differs from what was stored. Persistence failures are
    /// logged, never returned.
    ///
    /// # Errors
    ///
    /// Propagates failures of the intake re-seed.
    pub fn load(&self) -> StoreResult<QuestionnaireState> {
        let raw = self.read(&self.document_key());
        let mut state = match read_document(raw.as_deref()) {
            Ok(state) => state,
            Err(stale) => {
                info!("Migrating questionnaire state: {}", stale);
                let legacy = parse_legacy_document(self.read(&self.legacy_key()).as_deref());
                let state = migrate_from_v1(
                    self.catalog(),
                    legacy,
                    self.config.seed_on_empty,
                    self.services.now(),
                );
                self.services.emit(TelemetryEvent::StateMigrated {
                    archived_legacy: state.archived_v1.is_some(),
                    templates: state.templates.len(),
                });
                self.save_logged(&state);
                return Ok(state);
            }
        };

        let rehydrated = self.config.seed_on_empty
            && state.rehydrate_intake(&self.services, self.catalog())?;
        let retitled = normalize_titles(&mut state.templates, &mut state.assignments);
        if rehydrated || retitled {
            debug!("Normalized questionnaire state on load");
            self.save_logged(&state);
        }
        Ok(state)
    }

    /// The stored document as it is, without migration or normalization;
    /// `None` when it would have to be migrated
    pub fn read_stored(&self) -> Option<QuestionnaireState> {
        read_document(self.read(&self.document_key()).as_deref()).ok()
    }

    /// Write the whole document
    ///
    /// # Errors
    ///
    /// Serialization or backend failures.
    pub fn save(&self, state: &QuestionnaireState) -> StoreResult<()> {
        let json = serde_json::to_string(state)?;
        self.backend.set(&self.document_key(), &json)
    }

    /// Replace the document with a fresh seed state
    ///
    /// # Errors
    ///
    /// Serialization or backend failures.
    pub fn reset(&self) -> StoreResult<QuestionnaireState> {
        let state = seed_state(self.catalog(), self.services.now());
        self.save(&state)?;
        Ok(state)
    }

    /// Load, apply `mutate`, and save the result when it succeeds
    ///
    /// # Errors
    ///
    /// Whatever `mutate` returns, or a failure to save.
    pub fn update<T, F>(&self, mutate: F) -> StoreResult<T>
    where
        F: FnOnce(&mut QuestionnaireState, &StoreServices) -> StoreResult<T>,
    {
        let mut state = self.load()?;
        let out = mutate(&mut state, &self.services)?;
        self.save(&state)?;
        Ok(out)
    }
}

impl<K> fmt::Debug for QuestionnaireStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuestionnaireStore")
            .field("config", &self.config)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}
