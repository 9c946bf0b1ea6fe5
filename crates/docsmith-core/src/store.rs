//! In-memory document store
//!
//! `DocumentStore` owns the mapping of template id to record, the active
//! template and the unsaved-changes flag. Every transition is a plain
//! synchronous map replacement and cannot fail; durability is layered on
//! top by `Workspace` through the persistence bridge.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = DocumentStore::new();
//! store.set_active_template("dbdd".into());
//! store.update_record("dbdd".into(), record);
//! assert!(store.has_unsaved_changes());
//! store.mark_saved();
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::DocumentRecord;
use crate::template::TemplateId;

/// Produces the record shown for a template that has nothing stored yet
///
/// Factories must be total: every field the template's exporter reads has
/// to be present in the returned record.
pub trait RecordFactory {
    fn default_record(&self, id: &TemplateId) -> DocumentRecord;
}

impl<F> RecordFactory for F
where
    F: Fn(&TemplateId) -> DocumentRecord,
{
    fn default_record(&self, id: &TemplateId) -> DocumentRecord {
        self(id)
    }
}

/// Aggregate state of the store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStoreState {
    /// Records of templates that have been edited or saved
    #[serde(default)]
    pub records: BTreeMap<TemplateId, DocumentRecord>,
    /// Currently active template
    #[serde(default)]
    pub active_template: TemplateId,
    /// Whether the active template changed since the last save or switch
    #[serde(default)]
    pub has_unsaved_changes: bool,
}

/// Owner of `DocumentStoreState` and its only legal transitions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStore {
    state: DocumentStoreState,
}

impl DocumentStore {
    /// Create an empty store with the default template active
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from a rehydrated state
    pub fn from_state(state: DocumentStoreState) -> Self {
        Self { state }
    }

    /// Snapshot access for persistence
    pub fn state(&self) -> &DocumentStoreState {
        &self.state
    }

    pub fn into_state(self) -> DocumentStoreState {
        self.state
    }

    // ==================== Transitions ====================

    /// Switch the active template and clear the unsaved flag
    pub fn set_active_template(&mut self, id: TemplateId) {
        self.state.active_template = id;
        self.state.has_unsaved_changes = false;
    }

    /// Replace the record for `id` wholesale and flag unsaved changes
    pub fn update_record(&mut self, id: TemplateId, record: DocumentRecord) {
        self.state.records.insert(id, record);
        self.state.has_unsaved_changes = true;
    }

    /// Clear the unsaved flag after a successful save or export
    pub fn mark_saved(&mut self) {
        self.state.has_unsaved_changes = false;
    }

    /// Drop the record for `id`, if any
    ///
    /// Returns whether a record was removed. The flag is cleared either way.
    pub fn reset_template(&mut self, id: &TemplateId) -> bool {
        let removed = self.state.records.remove(id).is_some();
        self.state.has_unsaved_changes = false;
        removed
    }

    /// Forget every record and return to the default template
    pub fn reset_all(&mut self) {
        self.state = DocumentStoreState::default();
    }

    // ==================== Reads ====================

    pub fn active_template(&self) -> &TemplateId {
        &self.state.active_template
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.state.has_unsaved_changes
    }

    /// Record of the active template, or its default
    pub fn current_record(&self, factory: &impl RecordFactory) -> Cow<'_, DocumentRecord> {
        self.record_for(&self.state.active_template, factory)
    }

    /// Record for any template, or its default. Never inserts.
    pub fn record_for(
        &self,
        id: &TemplateId,
        factory: &impl RecordFactory,
    ) -> Cow<'_, DocumentRecord> {
        match self.state.records.get(id) {
            Some(record) => Cow::Borrowed(record),
            None => Cow::Owned(factory.default_record(id)),
        }
    }

    /// Stored record for `id`, without falling back to a default
    pub fn stored_record(&self, id: &TemplateId) -> Option<&DocumentRecord> {
        self.state.records.get(id)
    }

    /// Templates that currently have a stored record
    pub fn saved_template_ids(&self) -> Vec<&TemplateId> {
        self.state.records.keys().collect()
    }

    pub fn is_saved(&self, id: &TemplateId) -> bool {
        self.state.records.contains_key(id)
    }
}
