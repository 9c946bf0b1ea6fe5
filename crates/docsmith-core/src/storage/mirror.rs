//! Persistence bridge
//!
//! Keeps a durable mirror of the document store in a `KeyValueStore` and
//! seeds the store from it at startup. The in-memory store stays the source
//! of truth: nothing here can fail a store transition, and a missing or
//! damaged mirror degrades to the default state.
//!
//! Layout: a single root key (`MIRROR_KEY`) holding
//! `{ "records": {..}, "activeTemplate": "..", "hasUnsavedChanges": false }`.
//! A schema change that old readers cannot understand must bump the
//! version suffix of the key.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::backend::KeyValueStore;
use super::error::{StorageError, StorageResult, MEMORY_ONLY_HINT};
use crate::record::DocumentRecord;
use crate::store::DocumentStoreState;
use crate::template::TemplateId;

/// Root key of the mirror
pub const MIRROR_KEY: &str = "docsmith-state:v1";

/// Every key owned by this application starts with this prefix
pub const NAMESPACE_PREFIX: &str = "docsmith";

/// Scratch key used by the availability probe
pub const PROBE_KEY: &str = "__docsmith_probe__";

const PROBE_VALUE: &[u8] = b"probe";

/// Outcome of a mirror write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistResult {
    Success,
    Failure {
        reason: String,
        /// What the user can do about it
        hint: Option<&'static str>,
    },
}

impl PersistResult {
    pub fn failure(reason: impl Into<String>) -> Self {
        PersistResult::Failure {
            reason: reason.into(),
            hint: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PersistResult::Success)
    }

    /// The first failure of the two, or success
    pub fn and(self, other: PersistResult) -> PersistResult {
        match self {
            PersistResult::Success => other,
            failure => failure,
        }
    }

    fn from_storage(result: StorageResult<()>) -> Self {
        match result {
            Ok(()) => PersistResult::Success,
            Err(e) => PersistResult::Failure {
                reason: e.to_string(),
                hint: e.recovery_suggestion(),
            },
        }
    }
}

/// Result of probing the backing store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable {
        reason: String,
        hint: Option<&'static str>,
    },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// On-disk shape of the mirror
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct MirrorSnapshot {
    records: BTreeMap<TemplateId, DocumentRecord>,
    #[serde(default)]
    active_template: Option<TemplateId>,
    #[serde(default)]
    has_unsaved_changes: bool,
}

impl MirrorSnapshot {
    fn from_state(state: &DocumentStoreState) -> Self {
        Self {
            records: state.records.clone(),
            active_template: Some(state.active_template.clone()),
            has_unsaved_changes: state.has_unsaved_changes,
        }
    }

    fn into_state(self) -> DocumentStoreState {
        let active_template = self
            .active_template
            .filter(|id| !id.as_str().trim().is_empty())
            .unwrap_or_default();
        DocumentStoreState {
            records: self.records,
            active_template,
            has_unsaved_changes: self.has_unsaved_changes,
        }
    }
}

/// Replicates store state into a backing store
#[derive(Clone)]
pub struct PersistenceBridge {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for PersistenceBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceBridge").finish_non_exhaustive()
    }
}

impl PersistenceBridge {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Load the mirror, falling back to the default state on any problem
    pub fn rehydrate(&self) -> DocumentStoreState {
        let bytes = match self.backend.get(MIRROR_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("No mirror found, starting fresh");
                return DocumentStoreState::default();
            }
            Err(e) => {
                warn!("Storage unavailable during rehydrate: {}", e);
                return DocumentStoreState::default();
            }
        };

        match serde_json::from_slice::<MirrorSnapshot>(&bytes) {
            Ok(snapshot) => {
                let state = snapshot.into_state();
                info!("Rehydrated {} template record(s)", state.records.len());
                state
            }
            Err(e) => {
                warn!("Discarding malformed mirror: {}", e);
                DocumentStoreState::default()
            }
        }
    }

    /// Write the whole state to the mirror
    pub fn persist(&self, state: &DocumentStoreState) -> PersistResult {
        let result = self.write_snapshot(&MirrorSnapshot::from_state(state));
        log_result("persist", &result);
        result
    }

    /// Remove one template's entry from the mirror, leaving the rest intact
    ///
    /// A missing or unreadable mirror has nothing to delete and counts as
    /// success.
    pub fn delete_template_from_mirror(&self, id: &TemplateId) -> PersistResult {
        let bytes = match self.backend.get(MIRROR_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return PersistResult::Success,
            Err(e) => {
                let result = PersistResult::from_storage(Err(e));
                log_result("delete template", &result);
                return result;
            }
        };

        let Ok(mut snapshot) = serde_json::from_slice::<MirrorSnapshot>(&bytes) else {
            debug!("Mirror unreadable, nothing to delete for {}", id);
            return PersistResult::Success;
        };

        if snapshot.records.remove(id).is_none() {
            return PersistResult::Success;
        }
        snapshot.has_unsaved_changes = false;

        let result = self.write_snapshot(&snapshot);
        log_result("delete template", &result);
        result
    }

    /// Remove every key in this application's namespace
    pub fn clear_mirror(&self) -> PersistResult {
        let result = self.clear_namespace();
        log_result("clear mirror", &result);
        result
    }

    /// Probe the backing store with a write, read and delete
    pub fn check_availability(&self) -> Availability {
        let probe = || -> StorageResult<bool> {
            self.backend.set(PROBE_KEY, PROBE_VALUE)?;
            let read_back = self.backend.get(PROBE_KEY)?;
            self.backend.remove(PROBE_KEY)?;
            Ok(read_back.as_deref() == Some(PROBE_VALUE))
        };

        match probe() {
            Ok(true) => Availability::Available,
            Ok(false) => Availability::Unavailable {
                reason: "probe value was not retained".to_string(),
                hint: Some(MEMORY_ONLY_HINT),
            },
            Err(e) => Availability::Unavailable {
                reason: e.to_string(),
                hint: e.recovery_suggestion(),
            },
        }
    }

    fn write_snapshot(&self, snapshot: &MirrorSnapshot) -> PersistResult {
        let written = serde_json::to_vec(snapshot)
            .map_err(StorageError::from)
            .and_then(|encoded| self.backend.set(MIRROR_KEY, &encoded));
        PersistResult::from_storage(written)
    }

    fn clear_namespace(&self) -> PersistResult {
        let mut cleared = self.backend.remove(MIRROR_KEY);
        if cleared.is_ok() {
            cleared = self.backend.keys(NAMESPACE_PREFIX).and_then(|keys| {
                keys.iter().try_for_each(|key| self.backend.remove(key))
            });
        }
        PersistResult::from_storage(cleared)
    }
}

fn log_result(operation: &str, result: &PersistResult) {
    match result {
        PersistResult::Success => debug!("Mirror {} succeeded", operation),
        PersistResult::Failure { reason, .. } => warn!("Mirror {} failed: {}", operation, reason),
    }
}
