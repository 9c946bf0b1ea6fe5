//! Status signals derived from the store and the backing store probe

use serde::Serialize;

use crate::storage::Availability;
use crate::store::DocumentStore;
use crate::template::TemplateId;

/// What the active template's data looks like to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataStatus {
    /// Edited since the last save or template switch
    UnsavedChanges,
    /// A record is stored and nothing changed since
    Saved,
    /// Nothing stored; the template shows its defaults
    NotSaved,
}

impl DataStatus {
    /// Unsaved edits win over a stored record
    pub fn derive(has_unsaved_changes: bool, is_saved: bool) -> Self {
        if has_unsaved_changes {
            DataStatus::UnsavedChanges
        } else if is_saved {
            DataStatus::Saved
        } else {
            DataStatus::NotSaved
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DataStatus::UnsavedChanges => "Unsaved changes",
            DataStatus::Saved => "Saved",
            DataStatus::NotSaved => "Not saved",
        }
    }
}

/// Backing store health as last observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum StorageStatus {
    Available,
    Unavailable {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<&'static str>,
    },
    /// No probe has completed yet
    Checking,
}

impl StorageStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, StorageStatus::Available)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageStatus::Available => "Storage available",
            StorageStatus::Unavailable { .. } => "Storage unavailable",
            StorageStatus::Checking => "Checking storage",
        }
    }
}

impl From<Availability> for StorageStatus {
    fn from(availability: Availability) -> Self {
        match availability {
            Availability::Available => StorageStatus::Available,
            Availability::Unavailable { reason, hint } => {
                StorageStatus::Unavailable { reason, hint }
            }
        }
    }
}

/// Everything a status indicator needs in one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub active_template: TemplateId,
    pub has_unsaved_changes: bool,
    pub is_saved: bool,
    pub data_status: DataStatus,
    pub storage: StorageStatus,
}

impl StatusReport {
    pub fn new(store: &DocumentStore, storage: StorageStatus) -> Self {
        let active_template = store.active_template().clone();
        let has_unsaved_changes = store.has_unsaved_changes();
        let is_saved = store.is_saved(&active_template);
        Self {
            data_status: DataStatus::derive(has_unsaved_changes, is_saved),
            active_template,
            has_unsaved_changes,
            is_saved,
            storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DocumentRecord;

    #[test]
    fn test_data_status_precedence() {
        assert_eq!(DataStatus::derive(true, true), DataStatus::UnsavedChanges);
        assert_eq!(DataStatus::derive(true, false), DataStatus::UnsavedChanges);
        assert_eq!(DataStatus::derive(false, true), DataStatus::Saved);
        assert_eq!(DataStatus::derive(false, false), DataStatus::NotSaved);
    }

    #[test]
    fn test_report_follows_store() {
        let mut store = DocumentStore::new();
        let report = StatusReport::new(&store, StorageStatus::Checking);
        assert_eq!(report.active_template.as_str(), "prd");
        assert_eq!(report.data_status, DataStatus::NotSaved);

        store.update_record("prd".into(), DocumentRecord::empty());
        let report = StatusReport::new(&store, StorageStatus::Available);
        assert!(report.has_unsaved_changes);
        assert!(report.is_saved);
        assert_eq!(report.data_status, DataStatus::UnsavedChanges);

        store.mark_saved();
        assert_eq!(
            StatusReport::new(&store, StorageStatus::Available).data_status,
            DataStatus::Saved
        );
    }

    #[test]
    fn test_storage_status_from_availability() {
        let status = StorageStatus::from(Availability::Unavailable {
            reason: "read-only".to_string(),
            hint: Some("Point data_dir elsewhere."),
        });
        assert!(!status.is_available());
        assert_eq!(status.label(), "Storage unavailable");

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "unavailable");
        assert_eq!(json["hint"], "Point data_dir elsewhere.");
        assert!(StorageStatus::from(Availability::Available).is_available());
    }

    #[test]
    fn test_report_serializes_for_json_output() {
        let report = StatusReport::new(&DocumentStore::new(), StorageStatus::Available);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["data_status"], "not-saved");
        assert_eq!(json["storage"]["state"], "available");
        assert_eq!(json["active_template"], "prd");
    }
}
