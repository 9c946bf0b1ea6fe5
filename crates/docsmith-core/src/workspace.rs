//! Document store plus durable mirror
//!
//! The `Workspace` owns a `DocumentStore` and keeps the persistence bridge
//! in step with it: every transition is applied in memory first and then
//! replicated. A failed write never undoes the transition; it only flips
//! the storage status the caller shows to the user.
//!
//! ## Usage
//!
//! ```ignore
//! let mut workspace = Workspace::open(&config)?;
//! workspace.set_active_template("hld".into());
//! workspace.edit(&FieldEdit::SetText {
//!     field: "systemName".into(),
//!     value: "Billing".into(),
//! })?;
//! let outcome = workspace.export_current(&config.exports_dir())?;
//! ```

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::edit::{self, EditError, FieldEdit};
use crate::record::DocumentRecord;
use crate::schema::{self, Export, ExportError, TemplateDefaults};
use crate::status::{StatusReport, StorageStatus};
use crate::storage::{
    FileStore, KeyValueStore, MirrorWriter, PersistResult, PersistenceBridge,
};
use crate::store::{DocumentStore, DocumentStoreState};
use crate::template::TemplateId;

/// Result of writing the active document to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub template: TemplateId,
    pub path: PathBuf,
    pub bytes: usize,
    /// Mirror write that recorded the save
    pub persist: PersistResult,
}

/// Store, mirror and default factory wired together
pub struct Workspace {
    store: DocumentStore,
    bridge: PersistenceBridge,
    defaults: TemplateDefaults,
    storage: StorageStatus,
    writer: Option<MirrorWriter>,
}

impl Workspace {
    /// Open the workspace backed by the mirror under the data directory
    ///
    /// On first run (no usable mirror) the configured default template is
    /// made active. An unusable mirror directory leaves the workspace
    /// working in memory; [`Workspace::check_storage`] reports it.
    pub fn open(config: &Config) -> Result<Self> {
        let mirror_dir = config.mirror_dir();
        if let Err(e) = std::fs::create_dir_all(&mirror_dir) {
            warn!("Cannot create mirror directory {:?}: {}", mirror_dir, e);
        }

        let mut workspace =
            Self::open_with_backend(Arc::new(FileStore::new(mirror_dir)), TemplateDefaults::today());

        if workspace.store.state() == &DocumentStoreState::default()
            && workspace.store.active_template() != &config.default_template
        {
            debug!("Fresh workspace, activating {}", config.default_template);
            workspace
                .store
                .set_active_template(config.default_template.clone());
        }

        Ok(workspace)
    }

    /// Open against any backing store; never fails
    pub fn open_with_backend(backend: Arc<dyn KeyValueStore>, defaults: TemplateDefaults) -> Self {
        let bridge = PersistenceBridge::new(backend);
        let store = DocumentStore::from_state(bridge.rehydrate());
        info!(
            "Workspace opened: active={}, saved={}",
            store.active_template(),
            store.saved_template_ids().len()
        );

        Self {
            store,
            bridge,
            defaults,
            storage: StorageStatus::Checking,
            writer: None,
        }
    }

    /// Route mirror writes through a debounced background writer
    ///
    /// Mutations then return the outcome of the latest completed write;
    /// call [`Workspace::close`] to deliver the final snapshot.
    pub fn with_writer(mut self, writer: MirrorWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Flush and stop the background writer, if any
    pub async fn close(mut self) -> Option<PersistResult> {
        let result = match self.writer.take() {
            Some(writer) => writer.shutdown().await,
            None => None,
        };
        if let Some(result) = &result {
            self.observe(result);
        }
        result
    }

    // ==================== Reads ====================

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn bridge(&self) -> &PersistenceBridge {
        &self.bridge
    }

    pub fn defaults(&self) -> &TemplateDefaults {
        &self.defaults
    }

    pub fn active_template(&self) -> &TemplateId {
        self.store.active_template()
    }

    /// Record shown for the active template
    pub fn current_record(&self) -> Cow<'_, DocumentRecord> {
        self.store.current_record(&self.defaults)
    }

    /// Record shown for any template
    pub fn record_for(&self, id: &TemplateId) -> Cow<'_, DocumentRecord> {
        self.store.record_for(id, &self.defaults)
    }

    pub fn storage_status(&self) -> &StorageStatus {
        &self.storage
    }

    /// Probe the backing store and remember the outcome
    pub fn check_storage(&mut self) -> &StorageStatus {
        self.storage = self.bridge.check_availability().into();
        if let StorageStatus::Unavailable { reason, .. } = &self.storage {
            warn!("Storage unavailable: {}", reason);
        }
        &self.storage
    }

    pub fn status(&self) -> StatusReport {
        StatusReport::new(&self.store, self.storage.clone())
    }

    // ==================== Transitions ====================

    pub fn set_active_template(&mut self, id: TemplateId) -> PersistResult {
        debug!("Activating template {}", id);
        self.store.set_active_template(id);
        self.sync()
    }

    /// Replace a template's record wholesale
    pub fn update_record(&mut self, id: TemplateId, record: DocumentRecord) -> PersistResult {
        self.store.update_record(id, record);
        self.sync()
    }

    /// Apply a field edit to the active template's record
    ///
    /// A rejected edit leaves the store untouched.
    pub fn edit(&mut self, field_edit: &FieldEdit) -> Result<PersistResult, EditError> {
        let id = self.store.active_template().clone();
        let next = edit::apply(&self.current_record(), field_edit, id.kind())?;
        debug!("Edited {}.{}", id, field_edit.field());
        Ok(self.update_record(id, next))
    }

    pub fn mark_saved(&mut self) -> PersistResult {
        self.store.mark_saved();
        self.sync()
    }

    /// Drop one template's record here and in the mirror
    ///
    /// The post-reset state is replicated even when the targeted delete
    /// fails, so neither a queued snapshot nor the stale mirror can bring
    /// the record back once storage recovers.
    pub fn reset_template(&mut self, id: &TemplateId) -> PersistResult {
        let removed = self.store.reset_template(id);
        debug!("Reset template {} (had record: {})", id, removed);

        let deleted = self.bridge.delete_template_from_mirror(id);
        let synced = self.sync();
        let result = deleted.and(synced);
        self.observe(&result);
        result
    }

    /// Drop every record and clear the mirror namespace
    pub fn reset_all(&mut self) -> PersistResult {
        self.store.reset_all();
        info!("Reset all templates");

        let cleared = self.bridge.clear_mirror();
        let result = match &self.writer {
            // A snapshot still queued must not bring the records back
            Some(writer) => {
                writer.submit(self.store.state().clone());
                cleared
            }
            None if cleared.is_success() => cleared,
            // Overwrite what could not be removed
            None => cleared.and(self.bridge.persist(self.store.state())),
        };
        self.observe(&result);
        result
    }

    // ==================== Export ====================

    /// Render the active template without touching the disk
    pub fn render_current(&self) -> Result<Export, ExportError> {
        schema::export(self.store.active_template(), &self.current_record())
    }

    /// Render the active template into `dir` and mark it saved
    pub fn export_current(&mut self, dir: &Path) -> Result<ExportOutcome> {
        let template = self.store.active_template().clone();
        let export = self
            .render_current()
            .with_context(|| format!("Failed to render template '{}'", template))?;

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory: {:?}", dir))?;
        let path = dir.join(&export.file_name);
        std::fs::write(&path, &export.markdown)
            .with_context(|| format!("Failed to write export: {:?}", path))?;
        info!("Exported {} to {:?}", template, path);

        let persist = self.mark_saved();
        Ok(ExportOutcome {
            template,
            path,
            bytes: export.markdown.len(),
            persist,
        })
    }

    // ==================== Internals ====================

    /// Replicate the current state to the mirror
    fn sync(&mut self) -> PersistResult {
        let result = match &self.writer {
            Some(writer) => {
                writer.submit(self.store.state().clone());
                writer.last_result().unwrap_or(PersistResult::Success)
            }
            None => self.bridge.persist(self.store.state()),
        };
        self.observe(&result);
        result
    }

    fn observe(&mut self, result: &PersistResult) {
        self.storage = match result {
            PersistResult::Success => StorageStatus::Available,
            PersistResult::Failure { reason, hint } => StorageStatus::Unavailable {
                reason: reason.clone(),
                hint: *hint,
            },
        };
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("store", &self.store)
            .field("storage", &self.storage)
            .field("debounced", &self.writer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::DataStatus;
    use crate::storage::{MemoryStore, MIRROR_KEY};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    fn defaults() -> TemplateDefaults {
        TemplateDefaults::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn memory_workspace() -> (Arc<MemoryStore>, Workspace) {
        let backend = Arc::new(MemoryStore::new());
        let workspace = Workspace::open_with_backend(backend.clone(), defaults());
        (backend, workspace)
    }

    fn set_text(field: &str, value: &str) -> FieldEdit {
        FieldEdit::SetText {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_fresh_workspace_defaults() {
        let (_, workspace) = memory_workspace();
        assert_eq!(workspace.active_template().as_str(), "prd");
        assert_eq!(workspace.storage_status(), &StorageStatus::Checking);
        assert_eq!(
            workspace.current_record().as_value()["writeDate"],
            json!("2024-06-01")
        );
    }

    #[test]
    fn test_edits_survive_reopen() {
        let (backend, mut workspace) = memory_workspace();
        workspace.set_active_template("dbdd".into());
        let result = workspace.edit(&set_text("systemName", "Orders")).unwrap();
        assert!(result.is_success());

        let reopened = Workspace::open_with_backend(backend, defaults());
        assert_eq!(reopened.active_template().as_str(), "dbdd");
        assert_eq!(
            reopened.current_record().as_value()["systemName"],
            json!("Orders")
        );
        assert!(reopened.store().has_unsaved_changes());
    }

    #[test]
    fn test_rejected_edit_leaves_store_untouched() {
        let (_, mut workspace) = memory_workspace();
        assert!(workspace.edit(&set_text("bogus", "x")).is_err());
        assert!(workspace.store().saved_template_ids().is_empty());
        assert!(!workspace.store().has_unsaved_changes());
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let (backend, mut workspace) = memory_workspace();
        backend.set_available(false);

        let result = workspace.edit(&set_text("documentName", "Checkout")).unwrap();

        assert!(!result.is_success());
        assert!(matches!(
            workspace.storage_status(),
            StorageStatus::Unavailable { .. }
        ));
        assert_eq!(
            workspace.current_record().as_value()["documentName"],
            json!("Checkout")
        );

        backend.set_available(true);
        assert!(workspace.mark_saved().is_success());
        assert!(workspace.storage_status().is_available());
    }

    #[test]
    fn test_check_storage() {
        let (backend, mut workspace) = memory_workspace();
        assert!(workspace.check_storage().is_available());

        backend.set_available(false);
        assert!(!workspace.check_storage().is_available());
        assert_eq!(
            workspace.status().storage.label(),
            "Storage unavailable"
        );
    }

    #[test]
    fn test_reset_template_removes_from_mirror() {
        let (backend, mut workspace) = memory_workspace();
        workspace.update_record("hld".into(), DocumentRecord::from(json!({ "x": "1" })));
        workspace.update_record("prd".into(), DocumentRecord::from(json!({ "y": "2" })));

        assert!(workspace.reset_template(&"hld".into()).is_success());

        let reopened = Workspace::open_with_backend(backend, defaults());
        let saved: Vec<&str> = reopened
            .store()
            .saved_template_ids()
            .into_iter()
            .map(TemplateId::as_str)
            .collect();
        assert_eq!(saved, vec!["prd"]);
        assert_eq!(
            reopened.record_for(&"hld".into()).as_value()["systemName"],
            json!("")
        );
    }

    #[test]
    fn test_reset_all_clears_mirror() {
        let (backend, mut workspace) = memory_workspace();
        workspace.set_active_template("srs".into());
        workspace.edit(&set_text("moduleName", "intake")).unwrap();

        assert!(workspace.reset_all().is_success());
        assert!(backend.raw(MIRROR_KEY).is_none());

        let reopened = Workspace::open_with_backend(backend, defaults());
        assert_eq!(reopened.store().state(), &DocumentStoreState::default());
    }

    #[test]
    fn test_failed_reset_all_is_repaired_without_writer() {
        let (backend, mut workspace) = memory_workspace();
        workspace.edit(&set_text("documentName", "Checkout")).unwrap();

        backend.set_available(false);
        let result = workspace.reset_all();
        assert!(!result.is_success());
        assert!(workspace.store().saved_template_ids().is_empty());
        assert!(matches!(
            workspace.storage_status(),
            StorageStatus::Unavailable { hint: Some(_), .. }
        ));

        // Any later write replaces the stale mirror
        backend.set_available(true);
        assert!(workspace.mark_saved().is_success());
        let reopened = Workspace::open_with_backend(backend, defaults());
        assert!(reopened.store().saved_template_ids().is_empty());
    }

    #[test]
    fn test_open_with_unusable_mirror_dir_works_in_memory() {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        std::fs::write(config.mirror_dir(), "not a directory").unwrap();

        let mut workspace = Workspace::open(&config).unwrap();
        match workspace.check_storage() {
            StorageStatus::Unavailable { hint, .. } => {
                assert!(hint.unwrap().contains("data_dir"));
            }
            other => panic!("expected unavailable storage, got {:?}", other),
        }

        let result = workspace.edit(&set_text("documentName", "Offline")).unwrap();
        assert!(!result.is_success());
        assert_eq!(
            workspace.current_record().as_value()["documentName"],
            json!("Offline")
        );
        assert!(workspace.store().has_unsaved_changes());
    }

    #[test]
    fn test_status_follows_flag_lifecycle() {
        let (_, mut workspace) = memory_workspace();
        assert_eq!(workspace.status().data_status, DataStatus::NotSaved);

        workspace.edit(&set_text("status", "Review")).unwrap();
        assert_eq!(workspace.status().data_status, DataStatus::UnsavedChanges);

        workspace.mark_saved();
        assert_eq!(workspace.status().data_status, DataStatus::Saved);

        workspace.set_active_template("hld".into());
        assert_eq!(workspace.status().data_status, DataStatus::NotSaved);
    }

    #[test]
    fn test_export_current_writes_file_and_marks_saved() {
        let dir = tempdir().unwrap();
        let (_, mut workspace) = memory_workspace();
        workspace.set_active_template("lld".into());
        workspace.edit(&set_text("moduleName", "payments")).unwrap();

        let outcome = workspace.export_current(dir.path()).unwrap();

        assert_eq!(outcome.path, dir.path().join("lld-payments-v1.0.md"));
        let written = std::fs::read_to_string(&outcome.path).unwrap();
        assert_eq!(written.len(), outcome.bytes);
        assert!(written.contains("Module: payments"));
        assert!(outcome.persist.is_success());
        assert!(!workspace.store().has_unsaved_changes());
    }

    #[test]
    fn test_export_unknown_template_fails() {
        let dir = tempdir().unwrap();
        let (_, mut workspace) = memory_workspace();
        workspace.set_active_template("brd".into());

        let err = workspace.export_current(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("no exporter"));
    }

    #[test]
    fn test_open_with_config_uses_default_template() {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            default_template: "srs".into(),
            ..Config::default()
        };

        let mut workspace = Workspace::open(&config).unwrap();
        assert_eq!(workspace.active_template().as_str(), "srs");
        workspace.edit(&set_text("moduleName", "intake")).unwrap();
        workspace.set_active_template("prd".into());

        // A stored mirror wins over the configured default
        let workspace = Workspace::open(&config).unwrap();
        assert_eq!(workspace.active_template().as_str(), "prd");
        assert!(config.mirror_dir().is_dir());
    }

    #[tokio::test]
    async fn test_debounced_writer_delivers_on_close() {
        let (backend, workspace) = memory_workspace();
        let writer = MirrorWriter::spawn(workspace.bridge().clone(), Duration::from_secs(60));
        let mut workspace = workspace.with_writer(writer);

        workspace.set_active_template("hld".into());
        workspace.edit(&set_text("systemName", "Billing")).unwrap();
        // Debounce has not elapsed yet
        assert!(backend.raw(MIRROR_KEY).is_none());

        let result = workspace.close().await;
        assert_eq!(result, Some(PersistResult::Success));

        let reopened = Workspace::open_with_backend(backend, defaults());
        assert_eq!(
            reopened.record_for(&"hld".into()).as_value()["systemName"],
            json!("Billing")
        );
    }

    #[tokio::test]
    async fn test_debounced_reset_all_is_not_resurrected() {
        let (backend, workspace) = memory_workspace();
        let writer = MirrorWriter::spawn(workspace.bridge().clone(), Duration::from_secs(60));
        let mut workspace = workspace.with_writer(writer);

        workspace.edit(&set_text("documentName", "Checkout")).unwrap();
        workspace.reset_all();
        workspace.close().await;

        let reopened = Workspace::open_with_backend(backend, defaults());
        assert!(reopened.store().saved_template_ids().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reset_template_is_not_resurrected_by_writer() {
        let (backend, workspace) = memory_workspace();
        let writer = MirrorWriter::spawn(workspace.bridge().clone(), Duration::from_secs(60));
        let mut workspace = workspace.with_writer(writer);

        workspace.set_active_template("hld".into());
        workspace.edit(&set_text("systemName", "Billing")).unwrap();

        backend.set_available(false);
        assert!(!workspace.reset_template(&"hld".into()).is_success());
        assert!(workspace.store().saved_template_ids().is_empty());

        backend.set_available(true);
        assert_eq!(workspace.close().await, Some(PersistResult::Success));

        let reopened = Workspace::open_with_backend(backend, defaults());
        assert!(reopened.store().saved_template_ids().is_empty());
        assert_eq!(
            reopened.record_for(&"hld".into()).as_value()["systemName"],
            json!("")
        );
    }

    #[tokio::test]
    async fn test_failed_reset_all_is_not_resurrected_by_writer() {
        let (backend, workspace) = memory_workspace();
        let writer = MirrorWriter::spawn(workspace.bridge().clone(), Duration::from_secs(60));
        let mut workspace = workspace.with_writer(writer);

        workspace.set_active_template("hld".into());
        workspace.edit(&set_text("systemName", "Billing")).unwrap();

        backend.set_available(false);
        assert!(!workspace.reset_all().is_success());

        backend.set_available(true);
        workspace.close().await;

        let reopened = Workspace::open_with_backend(backend, defaults());
        assert!(reopened.store().saved_template_ids().is_empty());
        assert_eq!(reopened.active_template().as_str(), "prd");
    }
}
