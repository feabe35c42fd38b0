//! Id generation
//!
//! Ids are plain strings on the wire so that documents written by older
//! clients (`tpl-...`, `assign-...`, `node-...`) stay readable. New ids carry
//! a kind prefix followed by either a ULID or a counter.

use std::sync::atomic::{AtomicU64, Ordering};

use ulid::Ulid;

/// Mints unique ids for templates, assignments, nodes and edges
pub trait IdGenerator: Send + Sync {
    /// Next id, prefixed with `prefix` (e.g. `tpl`, `node`)
    fn next_id(&self, prefix: &str) -> String;
}

/// Random, time-sortable ids backed by ULID
#[derive(Debug, Default, Clone, Copy)]
pub struct UlidIds;

impl IdGenerator for UlidIds {
    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", Ulid::new().to_string().to_lowercase())
    }
}

/// Deterministic counter ids (`prefix-1`, `prefix-2`, ...)
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Start counting from 1
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n}")
    }
}
